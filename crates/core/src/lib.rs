#![deny(missing_docs)]
//! scribe core: article metadata, the YAML frontmatter codec, archive packaging and
//! the store interfaces they plug into.

/// Archive packaging.
pub mod archive;
/// Conversion between documents and header-prefixed text.
pub mod codec;
/// Codec and packager options.
pub mod config;
/// Core error types.
pub mod error;
/// YAML frontmatter extraction and header writing.
pub mod frontmatter;
/// Import/export through a document store.
pub mod import;
/// Metadata and document types.
pub mod metadata;
/// Slug generation utilities.
pub mod slug;
/// Document store and category interfaces.
pub mod store;

pub use archive::{Archive, ArchiveEntry, ArchiveError, pack, pack_parallel, sanitize_name};
pub use codec::{compose, compose_document, decompose, normalize};
pub use config::{CollisionPolicy, ComposeOptions, DecomposeOptions, NamingPolicy, PackOptions};
pub use error::{ScribeError, SourceLocation};
pub use frontmatter::{FrontmatterError, FrontmatterExtraction, extract_frontmatter};
pub use import::{export_document, import_document};
pub use metadata::{Document, Metadata};
pub use slug::{Slugger, slugify};
pub use store::{
    Category, CategoryId, CategoryResolver, DocumentId, DocumentStore, MemoryStore, NewDocument,
};
