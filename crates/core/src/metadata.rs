//! Article metadata and the document value it travels with.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// Reserved field: article title.
pub const TITLE: &str = "title";
/// Reserved field: filesystem/URL-safe identifier.
pub const SLUG: &str = "slug";
/// Reserved field: creation time.
pub const CREATED: &str = "created";
/// Reserved field: last modification time.
pub const MODIFIED: &str = "modified";
/// Extra field naming the article's category.
pub const CATEGORY: &str = "category";
/// Extra field listing categories; the first one is used.
pub const CATEGORIES: &str = "categories";

/// Structured metadata of an article.
///
/// `created` and `modified` are always present; sources that lack them get defaults
/// during normalization. Every field that is not reserved lives in `extra`, in the order
/// it was first seen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    /// Article title, possibly empty.
    pub title: String,
    /// Filesystem/URL-safe identifier.
    pub slug: String,
    /// Creation time.
    pub created: DateTime<Utc>,
    /// Last modification time.
    pub modified: DateTime<Utc>,
    /// Caller-defined fields (categories, tags, ...), carried opaquely.
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

impl Metadata {
    /// Metadata with the given title, a derived slug and both timestamps set to `now`.
    pub fn new(title: impl Into<String>, now: DateTime<Utc>) -> Self {
        let title = title.into();
        Self {
            slug: crate::slug::slugify(&title),
            title,
            created: now,
            modified: now,
            extra: Map::new(),
        }
    }

    /// Builder-style setter for an extra field.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Looks up a caller-defined field.
    pub fn field(&self, key: &str) -> Option<&JsonValue> {
        self.extra.get(key)
    }

    /// Category named in the extra fields: `category`, else the first of `categories`.
    /// Blank names are ignored.
    pub fn category(&self) -> Option<&str> {
        let named = match self.field(CATEGORY) {
            Some(JsonValue::String(name)) => Some(name.as_str()),
            _ => match self.field(CATEGORIES) {
                Some(JsonValue::String(name)) => Some(name.as_str()),
                Some(JsonValue::Array(names)) => names.first().and_then(JsonValue::as_str),
                _ => None,
            },
        };
        named.map(str::trim).filter(|name| !name.is_empty())
    }
}

/// A markdown body together with its metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Structured metadata.
    pub metadata: Metadata,
    /// Raw markdown source, never pre-rendered.
    pub body: String,
}

impl Document {
    /// Pairs metadata with a body.
    pub fn new(metadata: Metadata, body: impl Into<String>) -> Self {
        Self {
            metadata,
            body: body.into(),
        }
    }
}

/// Formats a timestamp the way headers store it (RFC 3339, `Z` suffix, sub-seconds
/// only when present).
pub fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Reads a timestamp from a header value.
///
/// Accepts RFC 3339 strings, `YYYY-MM-DD HH:MM[:SS]`, bare dates (midnight UTC) and
/// integers holding milliseconds since the Unix epoch.
pub fn parse_timestamp(value: &JsonValue) -> Option<DateTime<Utc>> {
    match value {
        JsonValue::String(text) => parse_timestamp_str(text.trim()),
        JsonValue::Number(number) => number
            .as_i64()
            .and_then(|millis| Utc.timestamp_millis_opt(millis).single()),
        _ => None,
    }
}

fn parse_timestamp_str(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(at) = DateTime::parse_from_rfc3339(text) {
        return Some(at.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
