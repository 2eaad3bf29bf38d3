//! Output buffer and scope tracking for HTML lowering.

use scribe_core::Slugger;

use super::RenderOptions;
use super::url::normalize_url;

/// Where the lowering currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Scope {
    Root,
    /// Inside a list; tight lists drop `<p>` around item paragraphs.
    List {
        tight: bool,
    },
    Blockquote,
    /// Inside phrasing content (paragraph, heading, cell).
    Inline,
}

/// Lowering state: the HTML buffer, the scope stack and heading slugs.
pub(super) struct Context<'a> {
    html: String,
    stack: Vec<Scope>,
    slugger: Slugger,
    options: &'a RenderOptions,
}

impl<'a> Context<'a> {
    pub fn new(options: &'a RenderOptions) -> Self {
        Self {
            html: String::with_capacity(1024),
            stack: vec![Scope::Root],
            slugger: Slugger::new(),
            options,
        }
    }

    /// Writes markup as is.
    pub fn push_raw(&mut self, s: &str) {
        self.html.push_str(s);
    }

    /// Writes text content, escaping `&`, `<` and `>`.
    pub fn push_text(&mut self, s: &str) {
        html_escape::encode_text_to_string(s, &mut self.html);
    }

    /// Writes a double-quoted attribute value body.
    pub fn push_attr_value(&mut self, s: &str) {
        html_escape::encode_double_quoted_attribute_to_string(s, &mut self.html);
    }

    /// Writes a normalized URL as an attribute value body.
    pub fn push_url(&mut self, url: &str) {
        let normalized = normalize_url(url);
        self.push_attr_value(&normalized);
    }

    /// Writes caption text. Only `<`, `>`, `'` and `"` are escaped.
    pub fn push_caption(&mut self, s: &str) {
        for c in s.chars() {
            match c {
                '<' => self.html.push_str("&lt;"),
                '>' => self.html.push_str("&gt;"),
                '\'' => self.html.push_str("&#39;"),
                '"' => self.html.push_str("&quot;"),
                _ => self.html.push(c),
            }
        }
    }

    /// Starts a new line unless the buffer is empty or already at one.
    pub fn ensure_newline(&mut self) {
        if !self.html.is_empty() && !self.html.ends_with('\n') {
            self.html.push('\n');
        }
    }

    pub fn enter(&mut self, scope: Scope) {
        self.stack.push(scope);
    }

    pub fn exit(&mut self) -> Option<Scope> {
        self.stack.pop()
    }

    /// Returns true if the nearest enclosing list is tight.
    pub fn is_in_tight_list(&self) -> bool {
        self.stack
            .iter()
            .rev()
            .find(|scope| matches!(scope, Scope::List { .. } | Scope::Blockquote))
            .is_some_and(|scope| matches!(scope, Scope::List { tight: true }))
    }

    pub fn is_inline(&self) -> bool {
        matches!(self.stack.last(), Some(Scope::Inline))
    }

    pub fn raw_html_allowed(&self) -> bool {
        self.options.allow_raw_html
    }

    pub fn heading_ids_enabled(&self) -> bool {
        self.options.heading_ids
    }

    /// Unique id for a heading with the given text.
    pub fn heading_id(&mut self, text: &str) -> String {
        self.slugger.next_slug(text)
    }

    pub fn finish(self) -> String {
        self.html
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caption_escaping_leaves_ampersands() {
        let options = RenderOptions::default();
        let mut ctx = Context::new(&options);
        ctx.push_caption(r#"<b>"Tom" & 'Jerry'</b>"#);
        assert_eq!(
            ctx.finish(),
            "&lt;b&gt;&quot;Tom&quot; & &#39;Jerry&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn tight_list_lookup_stops_at_blockquote() {
        let options = RenderOptions::default();
        let mut ctx = Context::new(&options);
        ctx.enter(Scope::List { tight: true });
        assert!(ctx.is_in_tight_list());
        ctx.enter(Scope::Blockquote);
        assert!(!ctx.is_in_tight_list());
        ctx.exit();
        ctx.enter(Scope::List { tight: false });
        assert!(!ctx.is_in_tight_list());
    }

    #[test]
    fn newline_only_when_needed() {
        let options = RenderOptions::default();
        let mut ctx = Context::new(&options);
        ctx.ensure_newline();
        ctx.push_raw("<p>");
        ctx.ensure_newline();
        ctx.ensure_newline();
        assert_eq!(ctx.finish(), "<p>\n");
    }
}
