//! Option structs for the codec and the packager.
//!
//! All options deserialize with per-field defaults, so a partial YAML or JSON
//! document only needs to name what it changes.

use serde::{Deserialize, Serialize};

/// How a document is turned into export text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ComposeOptions {
    /// Emit the `---` YAML header block.
    pub include_header: bool,
    /// Emit a `# title` line above the body.
    pub include_title_heading: bool,
}

impl Default for ComposeOptions {
    fn default() -> Self {
        Self {
            include_header: true,
            include_title_heading: false,
        }
    }
}

/// How export text is read back into a document.
///
/// Both switches are off by default, so the body comes back exactly as written
/// (apart from trimming). Turn them on to undo [`ComposeOptions::include_title_heading`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DecomposeOptions {
    /// Use a leading `# heading` as the title when the header has none.
    pub title_from_heading: bool,
    /// Drop a leading `# heading` that repeats the title.
    pub strip_title_heading: bool,
}

impl DecomposeOptions {
    /// Reads back text composed with [`ComposeOptions::include_title_heading`]: the
    /// leading heading supplies or repeats the title and is removed from the body.
    pub fn title_heading() -> Self {
        Self {
            title_from_heading: true,
            strip_title_heading: true,
        }
    }
}

/// Which metadata field names an archive entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NamingPolicy {
    /// Name entries after the document title.
    #[default]
    ByTitle,
    /// Name entries after the document slug.
    BySlug,
}

/// What happens when two documents sanitize to the same entry name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CollisionPolicy {
    /// The later document replaces the earlier one; the name is recorded as a collision.
    #[default]
    Overwrite,
    /// The later document gets a `-1`, `-2`, ... suffix before the extension.
    Suffix,
    /// Packing fails with [`crate::archive::ArchiveError::Collision`].
    Reject,
}

/// Options for [`crate::archive::pack`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PackOptions {
    /// Field used to name entries.
    pub naming: NamingPolicy,
    /// Collision handling.
    pub collisions: CollisionPolicy,
    /// Extension appended to every entry name.
    pub extension: String,
    /// Character substituted for path separators in names.
    pub separator_replacement: char,
    /// How each document is composed before it is stored.
    pub compose: ComposeOptions,
}

impl Default for PackOptions {
    fn default() -> Self {
        Self {
            naming: NamingPolicy::default(),
            collisions: CollisionPolicy::default(),
            extension: ".md".to_string(),
            separator_replacement: '-',
            compose: ComposeOptions::default(),
        }
    }
}

impl PackOptions {
    /// Loads options from a YAML (or JSON) document.
    pub fn from_yaml_str(input: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let options = PackOptions::default();
        assert_eq!(options.naming, NamingPolicy::ByTitle);
        assert_eq!(options.collisions, CollisionPolicy::Overwrite);
        assert_eq!(options.extension, ".md");
        assert!(options.compose.include_header);
        assert!(!options.compose.include_title_heading);
    }

    #[test]
    fn decompose_keeps_body_unless_asked() {
        let options = DecomposeOptions::default();
        assert!(!options.title_from_heading);
        assert!(!options.strip_title_heading);
        let opted_in = DecomposeOptions::title_heading();
        assert!(opted_in.title_from_heading && opted_in.strip_title_heading);
    }

    #[test]
    fn partial_yaml_keeps_other_defaults() {
        let options =
            PackOptions::from_yaml_str("naming: by-slug\ncompose:\n  includeTitleHeading: true\n")
                .unwrap();
        assert_eq!(options.naming, NamingPolicy::BySlug);
        assert_eq!(options.extension, ".md");
        assert!(options.compose.include_header);
        assert!(options.compose.include_title_heading);
    }

    #[test]
    fn json_is_accepted_too() {
        let options = PackOptions::from_yaml_str(r#"{"collisions": "suffix", "extension": ".txt"}"#)
            .unwrap();
        assert_eq!(options.collisions, CollisionPolicy::Suffix);
        assert_eq!(options.extension, ".txt");
    }
}
