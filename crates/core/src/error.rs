use thiserror::Error;

use crate::archive::ArchiveError;
use crate::frontmatter::FrontmatterError;
use crate::store::DocumentId;

/// Source location information for error reporting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    /// Line number (1-indexed)
    pub line: usize,
    /// Column number (1-indexed)
    pub column: usize,
}

impl SourceLocation {
    /// Create a new source location
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// Location from a serde_yaml error, shifted by the lines preceding the header body.
    pub(crate) fn from_yaml(err: &serde_yaml::Error, line_offset: usize) -> Option<Self> {
        err.location()
            .map(|loc| Self::new(loc.line() + line_offset, loc.column()))
    }
}

impl std::fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Errors surfaced by scribe operations.
#[derive(Debug, Error)]
pub enum ScribeError {
    /// The document store has nothing under the requested identifier.
    #[error("Document not found: {id}")]
    DocumentNotFound {
        /// Identifier that was looked up.
        id: DocumentId,
    },
    /// Frontmatter header could not be read.
    #[error(transparent)]
    Frontmatter(#[from] FrontmatterError),
    /// Archive could not be built.
    #[error(transparent)]
    Archive(#[from] ArchiveError),
}

impl ScribeError {
    /// Create a not-found error for a document id
    pub fn not_found(id: DocumentId) -> Self {
        Self::DocumentNotFound { id }
    }
}
