//! YAML frontmatter: locating and parsing the `---` header of a document, and
//! writing a header object back out as a block.

use serde_json::{Map, Value as JsonValue};
use thiserror::Error;

use crate::error::SourceLocation;

/// Marker line that opens and closes a header block.
pub const FENCE: &str = "---";

/// Result returned after extracting frontmatter from a Markdown document.
#[derive(Debug)]
pub struct FrontmatterExtraction {
    /// Parsed frontmatter fields, in header order.
    pub fields: Map<String, JsonValue>,
    /// Byte offset inside the original document where Markdown content begins.
    pub body_start: usize,
}

impl FrontmatterExtraction {
    fn empty() -> Self {
        Self {
            fields: Map::new(),
            body_start: 0,
        }
    }

    /// Returns true when the document carried no header fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Errors emitted while parsing or extracting frontmatter.
#[derive(Debug, Error)]
pub enum FrontmatterError {
    /// Unclosed YAML fence (e.g., missing terminating `---`).
    #[error("Unterminated YAML frontmatter block: expected closing '---'")]
    Unterminated,
    /// YAML failed to parse.
    #[error("Frontmatter parse error{}: {message}", at(.location))]
    Parse {
        /// Parser message
        message: String,
        /// Position in the original document, when known
        location: Option<SourceLocation>,
    },
    /// Top-level YAML node was not a mapping.
    #[error("Frontmatter must be a YAML mapping at the top level")]
    InvalidRootType,
}

/// Extracts YAML frontmatter from an input document.
pub fn extract_frontmatter(input: &str) -> Result<FrontmatterExtraction, FrontmatterError> {
    match find_yaml_block(input)? {
        Some(block) => {
            let line_offset = input[..block.start].matches('\n').count();
            let fields = parse_yaml_block(&block.text, line_offset)?;
            Ok(FrontmatterExtraction {
                fields,
                body_start: block.body_start,
            })
        }
        None => Ok(FrontmatterExtraction::empty()),
    }
}

fn at(location: &Option<SourceLocation>) -> String {
    location
        .as_ref()
        .map(|l| format!(" at {l}"))
        .unwrap_or_default()
}

fn parse_yaml_block(
    block: &str,
    line_offset: usize,
) -> Result<Map<String, JsonValue>, FrontmatterError> {
    if block.trim().is_empty() {
        return Ok(Map::new());
    }

    let yaml_value: serde_yaml::Value =
        serde_yaml::from_str(block).map_err(|err| FrontmatterError::Parse {
            message: err.to_string(),
            location: SourceLocation::from_yaml(&err, line_offset),
        })?;
    let json_value = serde_json::to_value(yaml_value).map_err(|err| FrontmatterError::Parse {
        message: err.to_string(),
        location: None,
    })?;

    match json_value {
        JsonValue::Null => Ok(Map::new()),
        JsonValue::Object(fields) => Ok(fields),
        _ => Err(FrontmatterError::InvalidRootType),
    }
}

struct YamlBlock {
    text: String,
    /// Byte offset of the first header line.
    start: usize,
    body_start: usize,
}

fn find_yaml_block(input: &str) -> Result<Option<YamlBlock>, FrontmatterError> {
    let (without_bom, bom_len) = strip_bom(input);
    let mut cursor = 0usize;

    loop {
        let Some((line, next_cursor)) = next_line(without_bom, cursor) else {
            return Ok(None);
        };
        if line.trim().is_empty() {
            cursor = next_cursor;
            continue;
        }
        if !is_yaml_fence(line) {
            return Ok(None);
        }

        let block_start = next_cursor;
        let mut scan_cursor = next_cursor;
        loop {
            match next_line(without_bom, scan_cursor) {
                Some((block_line, next_line_cursor)) => {
                    if is_yaml_fence(block_line) {
                        let raw_block = &without_bom[block_start..scan_cursor];
                        let trimmed = raw_block.trim_end_matches(['\r', '\n']);
                        return Ok(Some(YamlBlock {
                            text: trimmed.to_string(),
                            start: bom_len + block_start,
                            body_start: bom_len + next_line_cursor,
                        }));
                    }
                    scan_cursor = next_line_cursor;
                }
                None => return Err(FrontmatterError::Unterminated),
            }
        }
    }
}

fn strip_bom(input: &str) -> (&str, usize) {
    if let Some(stripped) = input.strip_prefix('\u{feff}') {
        (stripped, '\u{feff}'.len_utf8())
    } else {
        (input, 0)
    }
}

fn next_line(input: &str, start: usize) -> Option<(&str, usize)> {
    if start >= input.len() {
        return None;
    }

    let bytes = &input.as_bytes()[start..];
    if let Some(pos) = bytes.iter().position(|b| *b == b'\n') {
        let line_end = start + pos;
        Some((&input[start..line_end], line_end + 1))
    } else {
        Some((&input[start..], input.len()))
    }
}

fn is_yaml_fence(line: &str) -> bool {
    line.trim_end_matches('\r') == FENCE
}

/// Serializes a header object as block-style YAML, one top-level field per entry.
///
/// Sequences and nested mappings are indented two spaces below their key. Every entry
/// must read back as YAML; a field that would not (nesting past the parser's recursion
/// limit, for one) is left out of the block with a warning so the rest of the header
/// stays readable.
pub fn write_header(fields: &Map<String, JsonValue>) -> String {
    let mut out = String::new();
    for (key, value) in fields {
        match header_entry(key, value) {
            Ok(entry) => out.push_str(&entry),
            Err(err) => log::warn!("Skipping header field '{key}': {err}"),
        }
    }
    out
}

fn header_entry(key: &str, value: &JsonValue) -> Result<String, serde_yaml::Error> {
    let mut entry = String::new();
    write_entry(&mut entry, key, value, 0)?;
    serde_yaml::from_str::<JsonValue>(&entry)?;
    Ok(entry)
}

fn write_entry(
    out: &mut String,
    key: &str,
    value: &JsonValue,
    indent: usize,
) -> Result<(), serde_yaml::Error> {
    let key = scalar(&JsonValue::String(key.to_string()))?;
    push_indent(out, indent);
    out.push_str(&key);
    match value {
        JsonValue::Array(items) if !items.is_empty() => {
            out.push_str(":\n");
            for item in items {
                write_item(out, item, indent + 2)?;
            }
        }
        JsonValue::Object(fields) if !fields.is_empty() => {
            out.push_str(":\n");
            for (k, v) in fields {
                write_entry(out, k, v, indent + 2)?;
            }
        }
        _ => {
            out.push_str(": ");
            out.push_str(&scalar(value)?);
            out.push('\n');
        }
    }
    Ok(())
}

fn write_item(out: &mut String, item: &JsonValue, indent: usize) -> Result<(), serde_yaml::Error> {
    let mut nested = String::new();
    match item {
        JsonValue::Array(items) if !items.is_empty() => {
            for sub in items {
                write_item(&mut nested, sub, indent + 2)?;
            }
        }
        JsonValue::Object(fields) if !fields.is_empty() => {
            for (k, v) in fields {
                write_entry(&mut nested, k, v, indent + 2)?;
            }
        }
        _ => {
            push_indent(out, indent);
            out.push_str("- ");
            out.push_str(&scalar(item)?);
            out.push('\n');
            return Ok(());
        }
    }

    // The nested block's first line starts at indent + 2; the dash takes that slot.
    push_indent(out, indent);
    out.push_str("- ");
    out.push_str(&nested[indent + 2..]);
    Ok(())
}

fn push_indent(out: &mut String, indent: usize) {
    out.extend(std::iter::repeat_n(' ', indent));
}

/// Single-line YAML scalar for a leaf value.
fn scalar(value: &JsonValue) -> Result<String, serde_yaml::Error> {
    match value {
        JsonValue::Array(_) => Ok("[]".to_string()),
        JsonValue::Object(_) => Ok("{}".to_string()),
        _ => {
            let rendered = serde_yaml::to_string(value)?;
            let rendered = rendered.trim_end();
            if rendered.contains('\n') {
                // Block scalars can't sit at an arbitrary indent; JSON strings are valid YAML.
                serde_json::to_string(value)
                    .map_err(<serde_yaml::Error as serde::ser::Error>::custom)
            } else {
                Ok(rendered.to_string())
            }
        }
    }
}
