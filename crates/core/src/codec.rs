//! Conversion between [`Document`] values and export text with a YAML header.
//!
//! The header stores `created` as `date` and `modified` as `updated`; both spellings
//! are accepted when reading.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value as JsonValue};

use crate::config::{ComposeOptions, DecomposeOptions};
use crate::frontmatter::{FENCE, FrontmatterError, extract_frontmatter, write_header};
use crate::metadata::{
    CREATED, Document, MODIFIED, Metadata, SLUG, TITLE, format_timestamp, parse_timestamp,
};
use crate::slug::slugify;

/// Header key holding the creation time.
pub const HEADER_DATE: &str = "date";
/// Header key holding the modification time.
pub const HEADER_UPDATED: &str = "updated";

/// Renders metadata and body as export text.
///
/// With a header the layout is: fence, YAML header, fence, blank line, optional
/// `# title` line, body. The result is trimmed on both ends.
pub fn compose(metadata: &Metadata, body: &str, options: ComposeOptions) -> String {
    let mut out = String::new();

    if options.include_header {
        out.push_str(FENCE);
        out.push('\n');
        out.push_str(&write_header(&header_fields(metadata)));
        out.push_str(FENCE);
        out.push_str("\n\n");
    }

    if options.include_title_heading && !metadata.title.is_empty() {
        out.push_str("# ");
        out.push_str(&metadata.title);
        out.push_str("\n\n");
    }

    out.push_str(body.trim());
    out.trim().to_string()
}

/// [`compose`] for a whole document.
pub fn compose_document(document: &Document, options: ComposeOptions) -> String {
    compose(&document.metadata, &document.body, options)
}

/// Header object for `metadata`: `date`, `updated`, `title`, `slug`, then extra fields.
pub fn header_fields(metadata: &Metadata) -> Map<String, JsonValue> {
    let mut fields = Map::new();
    fields.insert(
        HEADER_DATE.into(),
        JsonValue::String(format_timestamp(&metadata.created)),
    );
    fields.insert(
        HEADER_UPDATED.into(),
        JsonValue::String(format_timestamp(&metadata.modified)),
    );
    fields.insert(TITLE.into(), JsonValue::String(metadata.title.clone()));
    fields.insert(SLUG.into(), JsonValue::String(metadata.slug.clone()));

    for (key, value) in &metadata.extra {
        if fields.contains_key(key) || key == CREATED || key == MODIFIED {
            log::debug!("Extra field '{key}' shadows a reserved header key; dropped");
            continue;
        }
        fields.insert(key.clone(), value.clone());
    }
    fields
}

/// Reads export text back into a document.
///
/// Header fields are overlaid with `supplied` (caller-provided fields win), then
/// normalized with `now` as the default time.
pub fn decompose(
    text: &str,
    supplied: Option<&Map<String, JsonValue>>,
    options: DecomposeOptions,
    now: DateTime<Utc>,
) -> Result<Document, FrontmatterError> {
    let extraction = extract_frontmatter(text)?;
    let mut fields = extraction.fields;
    if let Some(supplied) = supplied {
        for (key, value) in supplied {
            fields.insert(key.clone(), value.clone());
        }
    }

    let mut body = text[extraction.body_start..].trim();
    if let Some((heading, rest)) = leading_title_heading(body) {
        let title = fields.get(TITLE).and_then(JsonValue::as_str);
        match title {
            Some(title) if options.strip_title_heading && title == heading => body = rest,
            None if options.title_from_heading => {
                fields.insert(TITLE.into(), JsonValue::String(heading.to_string()));
                if options.strip_title_heading {
                    body = rest;
                }
            }
            _ => {}
        }
    }

    Ok(Document::new(normalize(fields, now), body.trim()))
}

/// Builds [`Metadata`] from loose fields.
///
/// `created` (or `date`) defaults to `now` and `modified` (or `updated`) to `created`.
/// A missing slug is derived from the title. Unrecognized fields are kept unchanged
/// in [`Metadata::extra`].
pub fn normalize(mut fields: Map<String, JsonValue>, now: DateTime<Utc>) -> Metadata {
    let created = take_timestamp(&mut fields, CREATED, HEADER_DATE).unwrap_or(now);
    let modified = take_timestamp(&mut fields, MODIFIED, HEADER_UPDATED).unwrap_or(created);

    let title = fields.remove(TITLE).map(text_of).unwrap_or_default();
    let slug = fields
        .remove(SLUG)
        .map(text_of)
        .filter(|slug| !slug.is_empty())
        .unwrap_or_else(|| slugify(&title));

    Metadata {
        title,
        slug,
        created,
        modified,
        extra: fields,
    }
}

fn take_timestamp(
    fields: &mut Map<String, JsonValue>,
    key: &str,
    alias: &str,
) -> Option<DateTime<Utc>> {
    let primary = fields.remove(key);
    let secondary = fields.remove(alias);
    let (name, value) = match (primary, secondary) {
        (Some(value), _) => (key, value),
        (None, Some(value)) => (alias, value),
        (None, None) => return None,
    };
    if value.is_null() {
        return None;
    }
    let parsed = parse_timestamp(&value);
    if parsed.is_none() {
        log::warn!("Ignoring unreadable timestamp in '{name}': {value}");
    }
    parsed
}

fn text_of(value: JsonValue) -> String {
    match value {
        JsonValue::String(text) => text,
        JsonValue::Null => String::new(),
        other => other.to_string(),
    }
}

/// Splits off a first-line `# heading`, returning its text and the remaining body.
fn leading_title_heading(body: &str) -> Option<(&str, &str)> {
    let (line, rest) = body.split_once('\n').unwrap_or((body, ""));
    let heading = line.trim_end().strip_prefix("# ")?.trim();
    if heading.is_empty() {
        return None;
    }
    Some((heading, rest))
}
