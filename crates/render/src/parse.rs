//! Markdown parsing: markdown-rs for the base grammar, then a conversion into
//! [`Node`] during which the extension rules run.

use std::collections::HashMap;

use markdown::mdast;
use serde::{Deserialize, Serialize};

use crate::ast::{Align, Image, Node};
use crate::grammar::{InlineRule, SPOILER_DELIMITER, Token, default_rules, tokenize_in};

/// Which base-grammar constructs are recognized.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ParseOptions {
    /// GitHub Flavored Markdown: tables, strikethrough, task lists, autolink literals.
    pub gfm: bool,
    /// Recognize raw HTML. When off, tags are plain text.
    pub raw_html: bool,
    /// Recognize (and drop) a leading YAML frontmatter block.
    pub frontmatter: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            gfm: true,
            raw_html: true,
            frontmatter: true,
        }
    }
}

impl ParseOptions {
    /// Convert to markdown-rs `ParseOptions`.
    pub fn to_markdown(self) -> markdown::ParseOptions {
        let mut constructs = markdown::Constructs {
            frontmatter: self.frontmatter,
            html_flow: self.raw_html,
            html_text: self.raw_html,
            ..Default::default()
        };

        if self.gfm {
            constructs.gfm_autolink_literal = true;
            constructs.gfm_strikethrough = true;
            constructs.gfm_table = true;
            constructs.gfm_task_list_item = true;
        }

        markdown::ParseOptions {
            constructs,
            ..markdown::ParseOptions::default()
        }
    }
}

/// Markdown parser with extension rules.
pub struct Parser {
    options: ParseOptions,
    rules: Vec<Box<dyn InlineRule>>,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new(ParseOptions::default())
    }
}

impl Parser {
    /// A parser with the default extension rules.
    pub fn new(options: ParseOptions) -> Self {
        Self::with_rules(options, default_rules())
    }

    /// A parser with an explicit rule list, tried in order.
    pub fn with_rules(options: ParseOptions, rules: Vec<Box<dyn InlineRule>>) -> Self {
        Self { options, rules }
    }

    /// Appends an extension rule; it runs after the ones already registered.
    pub fn add_rule<R: InlineRule + 'static>(&mut self, rule: R) {
        self.rules.push(Box::new(rule));
    }

    /// Parses markdown into a [`Node::Root`]. Never fails.
    pub fn parse(&self, input: &str) -> Node {
        let tree = match markdown::to_mdast(input, &self.options.to_markdown()) {
            Ok(tree) => tree,
            Err(message) => {
                log::warn!("Markdown parse failed, rendering as plain text: {message}");
                return Node::Root {
                    children: vec![Node::Paragraph {
                        children: vec![Node::text(input)],
                    }],
                };
            }
        };

        let mut builder = TreeBuilder::new(&self.rules).with_source(input);
        builder.collect_definitions(&tree);
        match builder.convert(&tree) {
            Some(root @ Node::Root { .. }) => root,
            Some(other) => Node::Root {
                children: vec![other],
            },
            None => Node::Root {
                children: Vec::new(),
            },
        }
    }
}

/// Parses with default options and rules.
pub fn parse(input: &str) -> Node {
    Parser::default().parse(input)
}

/// Converts markdown-rs nodes into [`Node`]s, running extension rules on inline runs.
pub struct TreeBuilder<'r> {
    rules: &'r [Box<dyn InlineRule>],
    source: Option<&'r str>,
    definitions: HashMap<String, Definition>,
}

#[derive(Debug, Clone)]
struct Definition {
    url: String,
    title: Option<String>,
}

impl<'r> TreeBuilder<'r> {
    /// A builder using `rules`, with no link definitions.
    pub fn new(rules: &'r [Box<dyn InlineRule>]) -> Self {
        Self {
            rules,
            source: None,
            definitions: HashMap::new(),
        }
    }

    /// Sets the markdown the converted tree was parsed from, so escaped `!` are told
    /// apart from literal ones.
    pub fn with_source(mut self, source: &'r str) -> Self {
        self.source = Some(source);
        self
    }

    /// Records every `[label]: url` definition in the tree. The first one wins.
    pub fn collect_definitions(&mut self, node: &mdast::Node) {
        if let mdast::Node::Definition(definition) = node {
            self.definitions
                .entry(definition.identifier.to_lowercase())
                .or_insert_with(|| Definition {
                    url: definition.url.clone(),
                    title: definition.title.clone(),
                });
        }
        if let Some(children) = node.children() {
            for child in children {
                self.collect_definitions(child);
            }
        }
    }

    fn definition(&self, identifier: &str) -> Option<&Definition> {
        self.definitions.get(&identifier.to_lowercase())
    }

    /// Converts a run of inline tokens, giving the rules first pick at every position.
    pub fn inline(&self, tokens: &[Token<'_>]) -> Vec<Node> {
        let mut out = Vec::with_capacity(tokens.len());
        let mut pos = 0;

        while pos < tokens.len() {
            let rest = &tokens[pos..];
            if let Some(matched) = self
                .rules
                .iter()
                .find_map(|rule| rule.try_match(rest, self))
            {
                out.push(matched.node);
                pos += matched.consumed.max(1);
                continue;
            }

            match &tokens[pos] {
                Token::Text(text) => push_text(&mut out, text),
                Token::Delimiter => push_text(&mut out, SPOILER_DELIMITER),
                Token::Node(node) => {
                    if let Some(converted) = self.convert(node) {
                        out.push(converted);
                    }
                }
            }
            pos += 1;
        }
        out
    }

    /// [`TreeBuilder::inline`] over the children of an inline container.
    pub fn inline_children(&self, children: &[mdast::Node]) -> Vec<Node> {
        self.inline(&tokenize_in(children, self.source))
    }

    fn blocks(&self, children: &[mdast::Node]) -> Vec<Node> {
        children
            .iter()
            .filter_map(|child| self.convert(child))
            .collect()
    }

    /// The ordinary (uncaptioned) image an image or resolved image reference stands for.
    pub fn image(&self, node: &mdast::Node) -> Option<Image> {
        match node {
            mdast::Node::Image(image) => Some(Image {
                url: image.url.clone(),
                alt: image.alt.clone(),
                title: image.title.clone(),
                caption: None,
            }),
            mdast::Node::ImageReference(reference) => {
                let definition = self.definition(&reference.identifier)?;
                Some(Image {
                    url: definition.url.clone(),
                    alt: reference.alt.clone(),
                    title: definition.title.clone(),
                    caption: None,
                })
            }
            _ => None,
        }
    }

    /// Base conversion of a single node. Nodes without an HTML form yield `None`.
    pub fn convert(&self, node: &mdast::Node) -> Option<Node> {
        let converted = match node {
            mdast::Node::Root(root) => Node::Root {
                children: self.blocks(&root.children),
            },
            mdast::Node::Paragraph(paragraph) => Node::Paragraph {
                children: self.inline_children(&paragraph.children),
            },
            mdast::Node::Heading(heading) => Node::Heading {
                depth: heading.depth,
                children: self.inline_children(&heading.children),
            },
            mdast::Node::ThematicBreak(_) => Node::ThematicBreak,
            mdast::Node::Blockquote(quote) => Node::Blockquote {
                children: self.blocks(&quote.children),
            },
            mdast::Node::List(list) => Node::List {
                ordered: list.ordered,
                start: list.start,
                spread: list.spread || list.children.iter().any(is_spread_item),
                children: self.blocks(&list.children),
            },
            mdast::Node::ListItem(item) => Node::ListItem {
                checked: item.checked,
                children: self.blocks(&item.children),
            },
            mdast::Node::Code(code) => Node::Code {
                lang: code.lang.clone(),
                value: code.value.clone(),
            },
            mdast::Node::Html(html) => Node::Html {
                value: html.value.clone(),
            },
            mdast::Node::Table(table) => Node::Table {
                align: table.align.iter().map(align_of).collect(),
                children: self.blocks(&table.children),
            },
            mdast::Node::TableRow(row) => Node::TableRow {
                children: self.blocks(&row.children),
            },
            mdast::Node::TableCell(cell) => Node::TableCell {
                children: self.inline_children(&cell.children),
            },
            mdast::Node::Text(text) => Node::text(text.value.clone()),
            mdast::Node::Emphasis(emphasis) => Node::Emphasis {
                children: self.inline_children(&emphasis.children),
            },
            mdast::Node::Strong(strong) => Node::Strong {
                children: self.inline_children(&strong.children),
            },
            mdast::Node::Delete(delete) => Node::Delete {
                children: self.inline_children(&delete.children),
            },
            mdast::Node::InlineCode(code) => Node::InlineCode {
                value: code.value.clone(),
            },
            mdast::Node::Break(_) => Node::Break,
            mdast::Node::Link(link) => Node::Link {
                url: link.url.clone(),
                title: link.title.clone(),
                children: self.inline_children(&link.children),
            },
            mdast::Node::LinkReference(reference) => {
                let (url, title) = match self.definition(&reference.identifier) {
                    Some(definition) => (definition.url.clone(), definition.title.clone()),
                    None => {
                        log::debug!("Unresolved link reference '{}'", reference.identifier);
                        (String::new(), None)
                    }
                };
                Node::Link {
                    url,
                    title,
                    children: self.inline_children(&reference.children),
                }
            }
            mdast::Node::Image(_) | mdast::Node::ImageReference(_) => {
                Node::Image(self.image(node)?)
            }
            mdast::Node::Definition(_) | mdast::Node::Yaml(_) | mdast::Node::Toml(_) => {
                return None;
            }
            other => {
                log::debug!("Dropping unsupported markdown node: {other:?}");
                return None;
            }
        };
        Some(converted)
    }
}

fn is_spread_item(node: &mdast::Node) -> bool {
    matches!(node, mdast::Node::ListItem(item) if item.spread)
}

fn align_of(kind: &mdast::AlignKind) -> Align {
    match kind {
        mdast::AlignKind::Left => Align::Left,
        mdast::AlignKind::Right => Align::Right,
        mdast::AlignKind::Center => Align::Center,
        mdast::AlignKind::None => Align::None,
    }
}

/// Appends text, merging with a preceding text node.
fn push_text(out: &mut Vec<Node>, text: &str) {
    if let Some(Node::Text { value }) = out.last_mut() {
        value.push_str(text);
    } else {
        out.push(Node::text(text));
    }
}
