//! Lowering of [`Node`] trees to HTML.

use super::context::{Context, Scope};
use crate::ast::{Align, Image, Node};

/// Inline style that masks spoiler content until it is selected.
pub const SPOILER_STYLE: &str =
    "filter: invert(25%); background-color: currentColor; text-decoration: none;";

/// Class on the `<figcaption>` of a captioned image.
pub const CAPTION_CLASS: &str = "image-caption";

fn children(nodes: &[Node], ctx: &mut Context) {
    for node in nodes {
        lower_node(node, ctx);
    }
}

fn inline_children(nodes: &[Node], ctx: &mut Context) {
    ctx.enter(Scope::Inline);
    children(nodes, ctx);
    ctx.exit();
}

fn wrap(tag: &str, nodes: &[Node], ctx: &mut Context) {
    ctx.push_raw("<");
    ctx.push_raw(tag);
    ctx.push_raw(">");
    children(nodes, ctx);
    ctx.push_raw("</");
    ctx.push_raw(tag);
    ctx.push_raw(">");
}

/// Paragraph. A lone captioned image is emitted as a bare figure, and tight list
/// items drop the `<p>`.
fn lower_paragraph(nodes: &[Node], ctx: &mut Context) {
    if let [Node::Image(image)] = nodes
        && image.is_captioned()
    {
        ctx.ensure_newline();
        lower_image(image, ctx);
        ctx.push_raw("\n");
        return;
    }

    if ctx.is_in_tight_list() {
        inline_children(nodes, ctx);
        return;
    }

    ctx.ensure_newline();
    ctx.push_raw("<p>");
    inline_children(nodes, ctx);
    ctx.push_raw("</p>\n");
}

fn lower_heading(depth: u8, nodes: &[Node], ctx: &mut Context) {
    let depth = depth.clamp(1, 6);
    ctx.ensure_newline();
    ctx.push_raw(&format!("<h{depth}"));
    if ctx.heading_ids_enabled() {
        let text: String = nodes.iter().map(Node::plain_text).collect();
        let id = ctx.heading_id(&text);
        ctx.push_raw(" id=\"");
        ctx.push_attr_value(&id);
        ctx.push_raw("\"");
    }
    ctx.push_raw(">");
    inline_children(nodes, ctx);
    ctx.push_raw(&format!("</h{depth}>\n"));
}

fn lower_blockquote(nodes: &[Node], ctx: &mut Context) {
    ctx.ensure_newline();
    ctx.push_raw("<blockquote>\n");
    ctx.enter(Scope::Blockquote);
    children(nodes, ctx);
    ctx.exit();
    ctx.ensure_newline();
    ctx.push_raw("</blockquote>\n");
}

fn lower_list(ordered: bool, start: Option<u32>, spread: bool, items: &[Node], ctx: &mut Context) {
    ctx.ensure_newline();
    if ordered {
        match start {
            Some(start) if start != 1 => ctx.push_raw(&format!("<ol start=\"{start}\">\n")),
            _ => ctx.push_raw("<ol>\n"),
        }
    } else {
        ctx.push_raw("<ul>\n");
    }

    ctx.enter(Scope::List { tight: !spread });
    children(items, ctx);
    ctx.exit();

    ctx.ensure_newline();
    ctx.push_raw(if ordered { "</ol>\n" } else { "</ul>\n" });
}

fn lower_list_item(checked: Option<bool>, nodes: &[Node], ctx: &mut Context) {
    ctx.ensure_newline();
    ctx.push_raw("<li>");
    if let Some(checked) = checked {
        ctx.push_raw(if checked {
            "<input type=\"checkbox\" disabled checked>"
        } else {
            "<input type=\"checkbox\" disabled>"
        });
        if ctx.is_in_tight_list() {
            ctx.push_raw(" ");
        }
    }
    children(nodes, ctx);
    ctx.push_raw("</li>\n");
}

fn lower_code(lang: Option<&str>, value: &str, ctx: &mut Context) {
    ctx.ensure_newline();
    ctx.push_raw("<pre><code");
    // Only the first word of the info string names the language.
    if let Some(lang) = lang.and_then(|info| info.split_whitespace().next()) {
        ctx.push_raw(" class=\"language-");
        ctx.push_attr_value(lang);
        ctx.push_raw("\"");
    }
    ctx.push_raw(">");
    if !value.is_empty() {
        ctx.push_text(value);
        ctx.push_raw("\n");
    }
    ctx.push_raw("</code></pre>\n");
}

/// Raw HTML, passed through or escaped depending on options.
fn lower_html(value: &str, ctx: &mut Context) {
    let block = !ctx.is_inline();
    if block {
        ctx.ensure_newline();
    }
    if ctx.raw_html_allowed() {
        ctx.push_raw(value);
    } else {
        log::debug!("Escaping raw HTML: {value}");
        ctx.push_text(value);
    }
    if block {
        ctx.push_raw("\n");
    }
}

fn lower_table(align: &[Align], rows: &[Node], ctx: &mut Context) {
    ctx.ensure_newline();
    ctx.push_raw("<table>\n<thead>\n");
    if let Some(Node::TableRow { children }) = rows.first() {
        lower_table_row(children, align, "th", ctx);
    }
    ctx.push_raw("</thead>\n");

    if rows.len() > 1 {
        ctx.push_raw("<tbody>\n");
        for row in &rows[1..] {
            if let Node::TableRow { children } = row {
                lower_table_row(children, align, "td", ctx);
            }
        }
        ctx.push_raw("</tbody>\n");
    }
    ctx.push_raw("</table>\n");
}

fn lower_table_row(cells: &[Node], align: &[Align], tag: &str, ctx: &mut Context) {
    ctx.push_raw("<tr>\n");
    for (index, cell) in cells.iter().enumerate() {
        let Node::TableCell { children } = cell else {
            continue;
        };
        let align_attr = match align.get(index) {
            Some(Align::Left) => " align=\"left\"",
            Some(Align::Right) => " align=\"right\"",
            Some(Align::Center) => " align=\"center\"",
            Some(Align::None) | None => "",
        };
        ctx.push_raw(&format!("<{tag}{align_attr}>"));
        inline_children(children, ctx);
        ctx.push_raw(&format!("</{tag}>\n"));
    }
    ctx.push_raw("</tr>\n");
}

fn lower_link(url: &str, title: Option<&str>, nodes: &[Node], ctx: &mut Context) {
    ctx.push_raw("<a href=\"");
    ctx.push_url(url);
    ctx.push_raw("\"");
    if let Some(title) = title {
        ctx.push_raw(" title=\"");
        ctx.push_attr_value(title);
        ctx.push_raw("\"");
    }
    ctx.push_raw(">");
    children(nodes, ctx);
    ctx.push_raw("</a>");
}

/// `<img>` for ordinary images, `<figure>` with a caption for captioned ones.
fn lower_image(image: &Image, ctx: &mut Context) {
    let Some(caption) = &image.caption else {
        ctx.push_raw("<img src=\"");
        ctx.push_url(&image.url);
        ctx.push_raw("\" alt=\"");
        ctx.push_attr_value(&image.alt);
        ctx.push_raw("\"");
        if let Some(title) = &image.title {
            ctx.push_raw(" title=\"");
            ctx.push_attr_value(title);
            ctx.push_raw("\"");
        }
        ctx.push_raw(">");
        return;
    };

    ctx.push_raw("<figure><img src=\"");
    ctx.push_url(&image.url);
    ctx.push_raw("\">");
    ctx.push_raw(&format!("<figcaption class=\"{CAPTION_CLASS}\">"));
    ctx.push_caption(caption);
    ctx.push_raw("</figcaption></figure>");
}

fn lower_spoiler(nodes: &[Node], ctx: &mut Context) {
    ctx.push_raw(&format!("<s class=\"spoiler\" style=\"{SPOILER_STYLE}\">"));
    children(nodes, ctx);
    ctx.push_raw("</s>");
}

/// Lowers a node and its descendants into the context buffer.
pub(super) fn lower_node(node: &Node, ctx: &mut Context) {
    match node {
        Node::Root { children: nodes } => children(nodes, ctx),
        Node::Paragraph { children } => lower_paragraph(children, ctx),
        Node::Heading { depth, children } => lower_heading(*depth, children, ctx),
        Node::ThematicBreak => {
            ctx.ensure_newline();
            ctx.push_raw("<hr>\n");
        }
        Node::Blockquote { children } => lower_blockquote(children, ctx),
        Node::List {
            ordered,
            start,
            spread,
            children,
        } => lower_list(*ordered, *start, *spread, children, ctx),
        Node::ListItem { checked, children } => lower_list_item(*checked, children, ctx),
        Node::Code { lang, value } => lower_code(lang.as_deref(), value, ctx),
        Node::Html { value } => lower_html(value, ctx),
        Node::Table { align, children } => lower_table(align, children, ctx),
        // Rows and cells are only meaningful inside a table.
        Node::TableRow { .. } | Node::TableCell { .. } => {}
        Node::Text { value } => ctx.push_text(value),
        Node::Emphasis { children } => wrap("em", children, ctx),
        Node::Strong { children } => wrap("strong", children, ctx),
        Node::Delete { children } => wrap("del", children, ctx),
        Node::InlineCode { value } => {
            ctx.push_raw("<code>");
            ctx.push_text(value);
            ctx.push_raw("</code>");
        }
        Node::Break => ctx.push_raw("<br>\n"),
        Node::Link {
            url,
            title,
            children,
        } => lower_link(url, title.as_deref(), children, ctx),
        Node::Image(image) => lower_image(image, ctx),
        Node::Spoiler { children } => lower_spoiler(children, ctx),
    }
}
