//! HTML rendering: parse markdown, then lower the tree.

mod context;
mod lower;
mod url;

pub use lower::{CAPTION_CLASS, SPOILER_STYLE};
pub use url::normalize_url;

use scribe_core::{DocumentId, DocumentStore, ScribeError};
use serde::{Deserialize, Serialize};

use crate::ast::Node;
use crate::grammar::InlineRule;
use crate::parse::{ParseOptions, Parser};
use context::Context;

/// Rendering options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderOptions {
    /// Pass raw HTML through verbatim. When false it is escaped and shown as text.
    #[serde(default = "default_allow_raw_html")]
    pub allow_raw_html: bool,
    /// Give headings unique `id` attributes derived from their text.
    #[serde(default)]
    pub heading_ids: bool,
    /// Enable GitHub Flavored Markdown constructs.
    #[serde(default = "default_gfm")]
    pub gfm: bool,
}

fn default_allow_raw_html() -> bool {
    true
}

fn default_gfm() -> bool {
    true
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            allow_raw_html: default_allow_raw_html(),
            heading_ids: false,
            gfm: default_gfm(),
        }
    }
}

impl RenderOptions {
    /// Parser options matching these rendering options.
    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            gfm: self.gfm,
            ..ParseOptions::default()
        }
    }
}

/// Markdown to HTML renderer. Holds a configured parser and can be shared across threads.
pub struct Renderer {
    parser: Parser,
    options: RenderOptions,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(RenderOptions::default())
    }
}

impl Renderer {
    /// A renderer with the default extension rules.
    pub fn new(options: RenderOptions) -> Self {
        Self {
            parser: Parser::new(options.parse_options()),
            options,
        }
    }

    /// Registers an additional inline rule, tried after the built-in ones.
    pub fn add_rule<R: InlineRule + 'static>(&mut self, rule: R) {
        self.parser.add_rule(rule);
    }

    /// The options this renderer was built with.
    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Parses `text` without lowering it.
    pub fn parse(&self, text: &str) -> Node {
        self.parser.parse(text)
    }

    /// Renders markdown to HTML.
    pub fn render(&self, text: &str) -> String {
        self.render_tree(&self.parse(text))
    }

    /// Lowers an already-parsed tree.
    pub fn render_tree(&self, tree: &Node) -> String {
        let mut ctx = Context::new(&self.options);
        lower::lower_node(tree, &mut ctx);
        ctx.finish()
    }
}

/// Renders markdown to HTML with default options.
///
/// # Examples
///
/// ```
/// let html = scribe_render::render("!!boo!!");
/// assert!(html.contains(r#"<s class="spoiler""#));
/// ```
pub fn render(text: &str) -> String {
    Renderer::default().render(text)
}

/// Renders markdown to HTML with explicit options.
pub fn render_with(text: &str, options: &RenderOptions) -> String {
    Renderer::new(options.clone()).render(text)
}

/// Renders the body of a stored document.
pub fn render_stored<S>(
    store: &S,
    id: DocumentId,
    options: &RenderOptions,
) -> Result<String, ScribeError>
where
    S: DocumentStore + ?Sized,
{
    let document = store.fetch(id).ok_or_else(|| ScribeError::not_found(id))?;
    Ok(render_with(&document.body, options))
}
