//! Bundling many documents into one named-entry archive.

use std::collections::HashMap;

use rayon::prelude::*;
use thiserror::Error;

use crate::codec::compose_document;
use crate::config::{CollisionPolicy, NamingPolicy, PackOptions};
use crate::metadata::Document;
use crate::slug::{FALLBACK_SLUG, Slugger};

/// Characters treated as path separators in entry names.
pub const PATH_SEPARATORS: [char; 2] = ['/', '\\'];

/// Errors raised while packing.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// Two documents produced the same entry name under [`CollisionPolicy::Reject`].
    #[error("Duplicate archive entry name: {name}")]
    Collision {
        /// The contested entry name.
        name: String,
    },
}

/// A single named file inside an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Path-safe entry name.
    pub name: String,
    /// UTF-8 encoded document text.
    pub content: Vec<u8>,
}

/// Name → content container with unique names, kept in build order.
///
/// Replacing an existing name keeps the entry at its original position.
#[derive(Debug, Clone, Default)]
pub struct Archive {
    entries: Vec<ArchiveEntry>,
    index: HashMap<String, usize>,
    collisions: Vec<String>,
}

impl Archive {
    /// An empty archive.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces an entry, returning the previous content under that name.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        content: impl Into<Vec<u8>>,
    ) -> Option<Vec<u8>> {
        let name = name.into();
        let content = content.into();
        if let Some(&slot) = self.index.get(&name) {
            return Some(std::mem::replace(&mut self.entries[slot].content, content));
        }
        self.index.insert(name.clone(), self.entries.len());
        self.entries.push(ArchiveEntry { name, content });
        None
    }

    /// Content stored under `name`.
    pub fn get(&self, name: &str) -> Option<&[u8]> {
        self.index
            .get(name)
            .map(|&slot| self.entries[slot].content.as_slice())
    }

    /// Returns true if an entry with this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the archive holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry names in build order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.name.as_str())
    }

    /// Entries in build order.
    pub fn entries(&self) -> &[ArchiveEntry] {
        &self.entries
    }

    /// Names that more than one document mapped to, once per extra occurrence.
    pub fn collisions(&self) -> &[String] {
        &self.collisions
    }

    /// Consumes the archive, yielding its entries in build order.
    pub fn into_entries(self) -> Vec<ArchiveEntry> {
        self.entries
    }
}

/// Replaces every path separator in `name` with `replacement`.
pub fn sanitize_name(name: &str, replacement: char) -> String {
    name.chars()
        .map(|ch| {
            if PATH_SEPARATORS.contains(&ch) {
                replacement
            } else {
                ch
            }
        })
        .collect()
}

/// Entry name stem for a document: the naming field with separators replaced.
pub fn entry_stem(document: &Document, options: &PackOptions) -> String {
    let metadata = &document.metadata;
    let field = match options.naming {
        NamingPolicy::ByTitle => &metadata.title,
        NamingPolicy::BySlug => &metadata.slug,
    };
    let field = field.trim();
    let field = if field.is_empty() {
        // Title may be blank; the slug always has something.
        if metadata.slug.is_empty() {
            FALLBACK_SLUG
        } else {
            metadata.slug.as_str()
        }
    } else {
        field
    };
    sanitize_name(field, options.separator_replacement)
}

/// Packs documents into an archive, composing each one per `options.compose`.
///
/// Documents are added in input order. Name collisions are resolved by
/// `options.collisions`.
pub fn pack<'a, I>(documents: I, options: &PackOptions) -> Result<Archive, ArchiveError>
where
    I: IntoIterator<Item = &'a Document>,
{
    let mut builder = Builder::new(options);
    for document in documents {
        let stem = entry_stem(document, options);
        builder.add(stem, compose_document(document, options.compose))?;
    }
    Ok(builder.finish())
}

/// [`pack`], with composition spread over the rayon pool.
///
/// Names are still assigned on a single thread in input order, so the result is the
/// same as the sequential version.
pub fn pack_parallel(
    documents: &[Document],
    options: &PackOptions,
) -> Result<Archive, ArchiveError> {
    let composed: Vec<(String, String)> = documents
        .par_iter()
        .map(|document| {
            (
                entry_stem(document, options),
                compose_document(document, options.compose),
            )
        })
        .collect();

    let mut builder = Builder::new(options);
    for (stem, text) in composed {
        builder.add(stem, text)?;
    }
    Ok(builder.finish())
}

struct Builder<'o> {
    options: &'o PackOptions,
    archive: Archive,
    names: Slugger,
}

impl<'o> Builder<'o> {
    fn new(options: &'o PackOptions) -> Self {
        Self {
            options,
            archive: Archive::new(),
            names: Slugger::new(),
        }
    }

    fn add(&mut self, stem: String, text: String) -> Result<(), ArchiveError> {
        let extension = self.options.extension.as_str();
        let mut name = format!("{stem}{extension}");

        if self.archive.contains(&name) {
            match self.options.collisions {
                CollisionPolicy::Overwrite => {
                    log::warn!("Archive entry '{name}' overwritten by a later document");
                    self.archive.collisions.push(name.clone());
                }
                CollisionPolicy::Suffix => {
                    let renamed = self.next_free(&stem, extension);
                    log::warn!("Archive entry '{name}' already taken; stored as '{renamed}'");
                    self.archive.collisions.push(name);
                    name = renamed;
                }
                CollisionPolicy::Reject => return Err(ArchiveError::Collision { name }),
            }
        } else {
            self.names.reserve(&stem);
        }

        log::debug!("Adding archive entry '{name}' ({} bytes)", text.len());
        self.archive.insert(name, text.into_bytes());
        Ok(())
    }

    fn next_free(&mut self, stem: &str, extension: &str) -> String {
        loop {
            let candidate = self.names.unique_with(stem, extension);
            if !self.archive.contains(&candidate) {
                return candidate;
            }
        }
    }

    fn finish(self) -> Archive {
        self.archive
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ComposeOptions;
    use crate::metadata::Metadata;
    use chrono::{DateTime, Utc};

    fn doc(title: &str, body: &str) -> Document {
        let now: DateTime<Utc> = DateTime::parse_from_rfc3339("2024-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        Document::new(Metadata::new(title, now), body)
    }

    fn text(archive: &Archive, name: &str) -> String {
        String::from_utf8(archive.get(name).expect("entry exists").to_vec()).unwrap()
    }

    fn body_only() -> PackOptions {
        PackOptions {
            compose: ComposeOptions {
                include_header: false,
                include_title_heading: false,
            },
            ..PackOptions::default()
        }
    }

    #[test]
    fn names_by_title_with_extension() {
        let docs = [doc("First", "one"), doc("Second", "two")];
        let archive = pack(&docs, &body_only()).unwrap();
        let names: Vec<&str> = archive.names().collect();
        assert_eq!(names, ["First.md", "Second.md"]);
        assert_eq!(text(&archive, "First.md"), "one");
        assert!(archive.collisions().is_empty());
    }

    #[test]
    fn names_by_slug() {
        let options = PackOptions {
            naming: NamingPolicy::BySlug,
            ..body_only()
        };
        let archive = pack(&[doc("Hello World", "x")], &options).unwrap();
        assert!(archive.contains("hello-world.md"));
    }

    #[test]
    fn separators_are_replaced() {
        assert_eq!(sanitize_name("a/b\\c", '-'), "a-b-c");
        let archive = pack(&[doc("2024/01 notes", "x")], &body_only()).unwrap();
        assert!(archive.contains("2024-01 notes.md"));
    }

    #[test]
    fn colliding_titles_overwrite_and_are_reported() {
        let docs = [doc("A/B", "first"), doc("A-B", "second")];
        let archive = pack(&docs, &body_only()).unwrap();
        assert_eq!(archive.len(), 1);
        assert_eq!(text(&archive, "A-B.md"), "second");
        assert_eq!(archive.collisions(), ["A-B.md"]);
    }

    #[test]
    fn suffix_policy_keeps_both() {
        let options = PackOptions {
            collisions: CollisionPolicy::Suffix,
            ..body_only()
        };
        let docs = [
            doc("A/B", "first"),
            doc("A-B", "second"),
            doc("A B", "third"),
            doc("A-B", "fourth"),
        ];
        let archive = pack(&docs, &options).unwrap();
        let names: Vec<&str> = archive.names().collect();
        assert_eq!(names, ["A-B.md", "A-B-1.md", "A B.md", "A-B-2.md"]);
        assert_eq!(text(&archive, "A-B-1.md"), "second");
    }

    #[test]
    fn suffix_policy_skips_names_already_taken() {
        let options = PackOptions {
            collisions: CollisionPolicy::Suffix,
            ..body_only()
        };
        let docs = [doc("A-1", "x"), doc("A", "y"), doc("A", "z")];
        let archive = pack(&docs, &options).unwrap();
        let names: Vec<&str> = archive.names().collect();
        assert_eq!(names, ["A-1.md", "A.md", "A-2.md"]);
    }

    #[test]
    fn reject_policy_fails() {
        let options = PackOptions {
            collisions: CollisionPolicy::Reject,
            ..body_only()
        };
        let err = pack(&[doc("Same", "a"), doc("Same", "b")], &options).unwrap_err();
        assert!(matches!(err, ArchiveError::Collision { ref name } if name == "Same.md"));
    }

    #[test]
    fn blank_title_falls_back_to_slug() {
        let mut untitled = doc("", "x");
        untitled.metadata.slug = "draft-7".into();
        let archive = pack(&[untitled], &body_only()).unwrap();
        assert!(archive.contains("draft-7.md"));
    }

    #[test]
    fn entries_are_composed_with_header_by_default() {
        let archive = pack(&[doc("Post", "Body")], &PackOptions::default()).unwrap();
        let content = text(&archive, "Post.md");
        assert!(content.starts_with("---\n"));
        assert!(content.contains("title: Post\n"));
        assert!(content.ends_with("---\n\nBody"));
    }

    #[test]
    fn parallel_matches_sequential() {
        let docs: Vec<Document> = (0..40)
            .map(|i| doc(&format!("Post {}", i % 7), &format!("body {i}")))
            .collect();
        let options = PackOptions {
            collisions: CollisionPolicy::Suffix,
            ..PackOptions::default()
        };
        let sequential = pack(&docs, &options).unwrap();
        let parallel = pack_parallel(&docs, &options).unwrap();
        assert_eq!(sequential.entries(), parallel.entries());
        assert_eq!(sequential.collisions(), parallel.collisions());
    }

    #[test]
    fn insert_replaces_in_place() {
        let mut archive = Archive::new();
        assert_eq!(archive.insert("a", "1"), None);
        archive.insert("b", "2");
        assert_eq!(archive.insert("a", "3"), Some(b"1".to_vec()));
        let names: Vec<&str> = archive.names().collect();
        assert_eq!(names, ["a", "b"]);
        assert_eq!(archive.get("a"), Some(&b"3"[..]));
    }
}
