//! Interfaces to the document store and category bookkeeping, plus an in-memory
//! implementation of both.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::metadata::{CATEGORY, Document};

/// Identifier of a stored document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DocumentId(pub u64);

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CategoryId(pub u64);

/// Normalized record handed to the store on import.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewDocument {
    /// Article title.
    pub title: String,
    /// Article slug.
    pub slug: String,
    /// Raw markdown body.
    pub body: String,
    /// Creation time.
    pub created: DateTime<Utc>,
    /// Modification time.
    pub modified: DateTime<Utc>,
    /// Category the article is filed under.
    pub category_id: CategoryId,
}

/// Where documents live.
pub trait DocumentStore {
    /// A previously stored document, if any.
    fn fetch(&self, id: DocumentId) -> Option<Document>;

    /// Names of all existing categories.
    fn category_names(&self) -> Vec<String>;

    /// Stores a new document and returns its identifier.
    fn insert(&mut self, record: NewDocument) -> DocumentId;
}

/// Category lookup with usage counting.
pub trait CategoryResolver {
    /// Returns the category named `name`, creating it if needed. Either way its usage
    /// count goes up by one.
    fn resolve_or_create(&mut self, name: &str) -> CategoryId;

    /// Returns the default category and records one more use of it.
    fn use_default(&mut self) -> CategoryId;
}

/// A category with its usage count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Identifier.
    pub id: CategoryId,
    /// Display name.
    pub name: String,
    /// Number of documents filed under it.
    pub count: u64,
}

/// Name of the category created by [`MemoryStore::new`].
pub const DEFAULT_CATEGORY: &str = "Uncategorized";

/// In-memory store and category resolver.
#[derive(Debug)]
pub struct MemoryStore {
    documents: Vec<(DocumentId, Document, CategoryId)>,
    categories: Vec<Category>,
    by_name: HashMap<String, usize>,
    default_category: CategoryId,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// A store with a single, unused default category.
    pub fn new() -> Self {
        let mut store = Self {
            documents: Vec::new(),
            categories: Vec::new(),
            by_name: HashMap::new(),
            default_category: CategoryId(0),
        };
        store.default_category = store.create_category(DEFAULT_CATEGORY);
        store
    }

    /// Looks up a category by id.
    pub fn category(&self, id: CategoryId) -> Option<&Category> {
        self.categories.iter().find(|category| category.id == id)
    }

    /// Looks up a category by name.
    pub fn category_by_name(&self, name: &str) -> Option<&Category> {
        self.by_name.get(name).map(|&slot| &self.categories[slot])
    }

    /// Category a stored document was filed under.
    pub fn category_of(&self, id: DocumentId) -> Option<CategoryId> {
        self.documents
            .iter()
            .find(|(doc_id, ..)| *doc_id == id)
            .map(|(_, _, category)| *category)
    }

    /// Number of stored documents.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Returns true if nothing has been stored.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    fn create_category(&mut self, name: &str) -> CategoryId {
        let id = CategoryId(self.categories.len() as u64 + 1);
        self.by_name.insert(name.to_string(), self.categories.len());
        self.categories.push(Category {
            id,
            name: name.to_string(),
            count: 0,
        });
        id
    }

    fn bump(&mut self, id: CategoryId) {
        if let Some(category) = self.categories.iter_mut().find(|c| c.id == id) {
            category.count += 1;
        }
    }
}

impl DocumentStore for MemoryStore {
    /// The stored document, with its category name in the `category` field.
    fn fetch(&self, id: DocumentId) -> Option<Document> {
        let (_, document, category_id) = self
            .documents
            .iter()
            .find(|(doc_id, ..)| *doc_id == id)?;
        let mut document = document.clone();
        if let Some(category) = self.category(*category_id) {
            document
                .metadata
                .extra
                .insert(CATEGORY.into(), JsonValue::String(category.name.clone()));
        }
        Some(document)
    }

    fn category_names(&self) -> Vec<String> {
        self.categories.iter().map(|c| c.name.clone()).collect()
    }

    fn insert(&mut self, record: NewDocument) -> DocumentId {
        let id = DocumentId(self.documents.len() as u64 + 1);
        let mut metadata = crate::metadata::Metadata::new(record.title, record.created);
        metadata.slug = record.slug;
        metadata.modified = record.modified;
        self.documents
            .push((id, Document::new(metadata, record.body), record.category_id));
        id
    }
}

impl CategoryResolver for MemoryStore {
    fn resolve_or_create(&mut self, name: &str) -> CategoryId {
        let id = match self.by_name.get(name) {
            Some(&slot) => self.categories[slot].id,
            None => {
                log::debug!("Creating category '{name}'");
                self.create_category(name)
            }
        };
        self.bump(id);
        id
    }

    fn use_default(&mut self) -> CategoryId {
        let id = self.default_category;
        self.bump(id);
        id
    }
}
