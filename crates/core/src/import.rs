//! Moving documents in and out of a store as text.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value as JsonValue};

use crate::codec::{compose_document, decompose};
use crate::config::{ComposeOptions, DecomposeOptions};
use crate::error::ScribeError;
use crate::store::{CategoryResolver, DocumentId, DocumentStore, NewDocument};

/// Reads `text` (with or without a header), files it and stores it.
///
/// The category is `category` when given, else the one named in the header
/// (`category` or `categories`), else the default. `supplied` fields take precedence
/// over the header. The category is resolved after the text parses, so a rejected
/// import never touches category counts.
pub fn import_document<S>(
    store: &mut S,
    text: &str,
    supplied: Option<&Map<String, JsonValue>>,
    category: Option<&str>,
    now: DateTime<Utc>,
) -> Result<DocumentId, ScribeError>
where
    S: DocumentStore + CategoryResolver,
{
    let document = decompose(text, supplied, DecomposeOptions::default(), now)?;

    let named = category
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .or_else(|| document.metadata.category());
    let category_id = match named {
        Some(name) => store.resolve_or_create(name),
        None => store.use_default(),
    };

    let metadata = document.metadata;
    let id = store.insert(NewDocument {
        title: metadata.title,
        slug: metadata.slug,
        body: document.body,
        created: metadata.created,
        modified: metadata.modified,
        category_id,
    });
    log::debug!("Imported document {id}");
    Ok(id)
}

/// Export text for a stored document.
pub fn export_document<S>(
    store: &S,
    id: DocumentId,
    options: ComposeOptions,
) -> Result<String, ScribeError>
where
    S: DocumentStore + ?Sized,
{
    let document = store.fetch(id).ok_or(ScribeError::not_found(id))?;
    Ok(compose_document(&document, options))
}
