//! Syntax tree produced by the parser and consumed by the HTML lowering.
//!
//! Every node kind is its own variant and carries only the fields that kind needs.
//! Nodes own their children outright; a tree lives for a single render.

use serde::Serialize;

/// Column alignment of a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Align {
    /// No explicit alignment.
    None,
    /// `:---`
    Left,
    /// `---:`
    Right,
    /// `:---:`
    Center,
}

/// An image, optionally captioned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Image {
    /// Source URL as written (not yet normalized).
    pub url: String,
    /// Alternative text. For captioned images this is the caption.
    pub alt: String,
    /// Optional title.
    pub title: Option<String>,
    /// Visible caption; `None` for an ordinary image.
    pub caption: Option<String>,
}

impl Image {
    /// Returns true if the image is rendered as a figure with a caption.
    pub fn is_captioned(&self) -> bool {
        self.caption.is_some()
    }
}

/// A syntax tree node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Node {
    /// Document root.
    Root {
        /// Block children.
        children: Vec<Node>,
    },
    /// Paragraph.
    Paragraph {
        /// Inline children.
        children: Vec<Node>,
    },
    /// ATX or setext heading.
    Heading {
        /// Level, 1 to 6.
        depth: u8,
        /// Inline children.
        children: Vec<Node>,
    },
    /// `***`
    ThematicBreak,
    /// Block quote.
    Blockquote {
        /// Block children.
        children: Vec<Node>,
    },
    /// Ordered or bullet list.
    List {
        /// `<ol>` when true.
        ordered: bool,
        /// Start number of an ordered list.
        start: Option<u32>,
        /// Loose list: items are wrapped in paragraphs.
        spread: bool,
        /// List items.
        children: Vec<Node>,
    },
    /// List item, optionally a GFM task.
    ListItem {
        /// Task state, `None` for plain items.
        checked: Option<bool>,
        /// Block children.
        children: Vec<Node>,
    },
    /// Fenced or indented code block.
    Code {
        /// Info-string language.
        lang: Option<String>,
        /// Code text.
        value: String,
    },
    /// Raw HTML, block or inline.
    Html {
        /// Literal markup.
        value: String,
    },
    /// GFM table.
    Table {
        /// Per-column alignment.
        align: Vec<Align>,
        /// Rows; the first one is the header.
        children: Vec<Node>,
    },
    /// Table row.
    TableRow {
        /// Cells.
        children: Vec<Node>,
    },
    /// Table cell.
    TableCell {
        /// Inline children.
        children: Vec<Node>,
    },
    /// Plain text.
    Text {
        /// Unescaped text.
        value: String,
    },
    /// `*em*`
    Emphasis {
        /// Inline children.
        children: Vec<Node>,
    },
    /// `**strong**`
    Strong {
        /// Inline children.
        children: Vec<Node>,
    },
    /// `~~delete~~`
    Delete {
        /// Inline children.
        children: Vec<Node>,
    },
    /// `` `code` ``
    InlineCode {
        /// Code text.
        value: String,
    },
    /// Hard line break.
    Break,
    /// Hyperlink.
    Link {
        /// Destination as written.
        url: String,
        /// Optional title.
        title: Option<String>,
        /// Inline children.
        children: Vec<Node>,
    },
    /// Image, possibly captioned.
    Image(Image),
    /// Spoiler-masked inline content.
    Spoiler {
        /// Inline children, rendered normally inside the mask.
        children: Vec<Node>,
    },
}

impl Node {
    /// A text node.
    pub fn text(value: impl Into<String>) -> Self {
        Node::Text {
            value: value.into(),
        }
    }

    /// Child nodes; empty for leaves.
    pub fn children(&self) -> &[Node] {
        match self {
            Node::Root { children }
            | Node::Paragraph { children }
            | Node::Heading { children, .. }
            | Node::Blockquote { children }
            | Node::List { children, .. }
            | Node::ListItem { children, .. }
            | Node::Table { children, .. }
            | Node::TableRow { children }
            | Node::TableCell { children }
            | Node::Emphasis { children }
            | Node::Strong { children }
            | Node::Delete { children }
            | Node::Link { children, .. }
            | Node::Spoiler { children } => children,
            Node::ThematicBreak
            | Node::Code { .. }
            | Node::Html { .. }
            | Node::Text { .. }
            | Node::InlineCode { .. }
            | Node::Break
            | Node::Image(_) => &[],
        }
    }

    /// Concatenated text content, used for heading ids.
    pub fn plain_text(&self) -> String {
        let mut buffer = String::new();
        collect_text(self, &mut buffer);
        buffer
    }
}

fn collect_text(node: &Node, buffer: &mut String) {
    match node {
        Node::Text { value } | Node::InlineCode { value } => buffer.push_str(value),
        Node::Image(image) => buffer.push_str(&image.alt),
        other => {
            for child in other.children() {
                collect_text(child, buffer);
            }
        }
    }
}
