use std::collections::HashMap;

/// Slug used when the source text has nothing sluggable in it.
pub const FALLBACK_SLUG: &str = "untitled";

/// Turns arbitrary text into a filesystem- and URL-safe identifier.
///
/// Letters and digits are kept (lowercased), every run of anything else becomes a
/// single `-`, and leading/trailing hyphens are dropped.
///
/// # Examples
///
/// ```
/// use scribe_core::slug::slugify;
///
/// assert_eq!(slugify("Hello, World!"), "hello-world");
/// assert_eq!(slugify("A/B  c"), "a-b-c");
/// ```
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_hyphen = false;

    for ch in text.chars() {
        if ch.is_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.extend(ch.to_lowercase());
        } else if ch == '\'' || ch == '\u{2019}' {
            // apostrophes vanish: "don't" -> "dont"
        } else {
            pending_hyphen = true;
        }
    }

    if slug.is_empty() {
        slug.push_str(FALLBACK_SLUG);
    }
    slug
}

/// Hands out unique names by appending `-1`, `-2`, ... to repeats.
#[derive(Debug, Default)]
pub struct Slugger {
    counts: HashMap<String, usize>,
}

impl Slugger {
    /// Creates a new slugger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Slugifies `text` and makes the result unique among everything seen so far.
    pub fn next_slug(&mut self, text: &str) -> String {
        let slug = slugify(text);
        self.unique(&slug)
    }

    /// Makes an already-formed name unique, without slugifying it.
    pub fn unique(&mut self, name: &str) -> String {
        self.unique_with(name, "")
    }

    /// Like [`Slugger::unique`], but the counter is inserted before `suffix`
    /// (`notes.md` -> `notes-1.md`).
    pub fn unique_with(&mut self, stem: &str, suffix: &str) -> String {
        let mut count = self.counts.get(stem).copied().unwrap_or(0);
        let mut candidate = if count == 0 {
            format!("{stem}{suffix}")
        } else {
            format!("{stem}-{count}{suffix}")
        };
        // A generated name may itself have been reserved earlier.
        while count > 0 && self.counts.contains_key(&format!("{stem}-{count}")) {
            count += 1;
            candidate = format!("{stem}-{count}{suffix}");
        }
        self.counts.insert(stem.to_string(), count + 1);
        if count > 0 {
            self.counts.insert(format!("{stem}-{count}"), 1);
        }
        candidate
    }

    /// Reserves a name so future names won't collide with it.
    pub fn reserve(&mut self, name: &str) {
        *self.counts.entry(name.to_string()).or_insert(0) += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_basic() {
        assert_eq!(slugify("Hello World"), "hello-world");
    }

    #[test]
    fn punctuation_runs_collapse() {
        assert_eq!(slugify("  a---b  "), "a-b");
        assert_eq!(slugify("import.meta.glob"), "import-meta-glob");
        assert_eq!(slugify("TypeScript & JSX"), "typescript-jsx");
    }

    #[test]
    fn path_separators_never_survive() {
        assert_eq!(slugify("src/content/"), "src-content");
        assert_eq!(slugify(r"C:\temp"), "c-temp");
    }

    #[test]
    fn apostrophes_are_dropped() {
        assert_eq!(slugify("Don't Panic"), "dont-panic");
        assert_eq!(slugify("It\u{2019}s here"), "its-here");
    }

    #[test]
    fn unicode_letters_preserved() {
        assert_eq!(slugify("多言語 ガイド"), "多言語-ガイド");
        assert_eq!(slugify("Héllo Wörld"), "héllo-wörld");
    }

    #[test]
    fn empty_falls_back() {
        assert_eq!(slugify(""), FALLBACK_SLUG);
        assert_eq!(slugify("🚀 !!"), FALLBACK_SLUG);
    }

    #[test]
    fn deduplication() {
        let mut slugger = Slugger::new();
        assert_eq!(slugger.next_slug("Title"), "title");
        assert_eq!(slugger.next_slug("Title"), "title-1");
        assert_eq!(slugger.next_slug("title!"), "title-2");
    }

    #[test]
    fn reserve_prevents_collision() {
        let mut slugger = Slugger::new();
        slugger.reserve("intro");
        assert_eq!(slugger.next_slug("Intro"), "intro-1");
    }

    #[test]
    fn generated_names_do_not_shadow_real_ones() {
        let mut slugger = Slugger::new();
        assert_eq!(slugger.unique("a-1"), "a-1");
        assert_eq!(slugger.unique("a"), "a");
        assert_eq!(slugger.unique("a"), "a-2");
    }

    #[test]
    fn suffix_goes_after_the_counter() {
        let mut slugger = Slugger::new();
        assert_eq!(slugger.unique_with("notes", ".md"), "notes.md");
        assert_eq!(slugger.unique_with("notes", ".md"), "notes-1.md");
    }
}
