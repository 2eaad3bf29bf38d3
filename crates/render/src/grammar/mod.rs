//! Inline grammar extensions layered over the base markdown grammar.
//!
//! The base parser hands us each run of inline siblings. Text in the run is split
//! around spoiler delimiters, producing a token stream, and at every position the
//! registered [`InlineRule`]s get the first chance to claim tokens. When no rule
//! matches, the token falls through to the base conversion.

mod caption;
mod spoiler;

pub use caption::CaptionRule;
pub use spoiler::SpoilerRule;

use markdown::mdast;

use crate::ast::Node;
use crate::parse::TreeBuilder;

/// Delimiter wrapping spoiler content: `!!hidden!!`.
pub const SPOILER_DELIMITER: &str = "!!";

/// Leading alt-text character that turns an image into a captioned figure.
pub const CAPTION_MARKER: char = '¡';

/// One unit of an inline token stream.
#[derive(Debug, Clone, PartialEq)]
pub enum Token<'a> {
    /// Plain text between delimiters.
    Text(String),
    /// A [`SPOILER_DELIMITER`] found in text.
    Delimiter,
    /// Any other inline node from the base parser.
    Node(&'a mdast::Node),
}

impl Token<'_> {
    /// Returns true for text tokens holding only whitespace.
    pub fn is_blank(&self) -> bool {
        matches!(self, Token::Text(text) if text.trim().is_empty())
    }
}

/// A successful rule application.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleMatch {
    /// Node produced by the rule.
    pub node: Node,
    /// Number of tokens consumed, at least one.
    pub consumed: usize,
}

/// An extension rule tried before the base grammar at each token position.
///
/// Rules never fail: declining with `None` hands the position back to the base
/// grammar.
pub trait InlineRule: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Attempts a match at the start of `tokens`.
    fn try_match(&self, tokens: &[Token<'_>], builder: &TreeBuilder<'_>) -> Option<RuleMatch>;
}

/// The spoiler and caption rules, in that order.
pub fn default_rules() -> Vec<Box<dyn InlineRule>> {
    vec![Box::new(SpoilerRule), Box::new(CaptionRule)]
}

/// Splits a run of inline siblings into tokens.
///
/// Adjacent text nodes are merged first so a delimiter split across them is still
/// found. Only text is scanned; code spans and other nodes pass through whole.
pub fn tokenize(children: &[mdast::Node]) -> Vec<Token<'_>> {
    tokenize_in(children, None)
}

/// [`tokenize`] with the markdown the nodes were parsed from.
///
/// Text values have escapes and character references already resolved, so `\!\!`
/// and `&#33;&#33;` read as `!!` there. With the source at hand, a delimiter is only
/// formed by two `!` written literally.
pub fn tokenize_in<'a>(children: &'a [mdast::Node], source: Option<&str>) -> Vec<Token<'a>> {
    let mut tokens = Vec::with_capacity(children.len());
    let mut run = TextRun::default();

    for child in children {
        match child {
            mdast::Node::Text(node) => run.push(node, source),
            other => {
                run.flush(&mut tokens);
                tokens.push(Token::Node(other));
            }
        }
    }
    run.flush(&mut tokens);
    tokens
}

/// Merged text with one flag per byte: whether that byte was written literally.
#[derive(Default)]
struct TextRun {
    text: String,
    literal: Vec<bool>,
}

impl TextRun {
    fn push(&mut self, node: &mdast::Text, source: Option<&str>) {
        let raw = source.zip(node.position.as_ref()).and_then(|(source, position)| {
            source.get(position.start.offset..position.end.offset)
        });
        let flags = match raw.and_then(|raw| literal_flags(&node.value, raw)) {
            Some(flags) => flags,
            None => vec![true; node.value.len()],
        };
        self.text.push_str(&node.value);
        self.literal.extend(flags);
    }

    fn flush(&mut self, tokens: &mut Vec<Token<'_>>) {
        if self.text.is_empty() {
            return;
        }
        let bytes = self.text.as_bytes();
        let mut segment = 0;
        let mut pos = 0;
        while pos + 1 < bytes.len() {
            let delimiter = bytes[pos] == b'!'
                && bytes[pos + 1] == b'!'
                && self.literal[pos]
                && self.literal[pos + 1];
            if delimiter {
                if segment < pos {
                    tokens.push(Token::Text(self.text[segment..pos].to_string()));
                }
                tokens.push(Token::Delimiter);
                pos += SPOILER_DELIMITER.len();
                segment = pos;
            } else {
                pos += 1;
            }
        }
        if segment < self.text.len() {
            tokens.push(Token::Text(self.text[segment..].to_string()));
        }
        self.text.clear();
        self.literal.clear();
    }
}

/// Aligns a text value with the source it came from, flagging each value byte that
/// appears verbatim. Escaped characters and character references are not literal.
/// Source-only characters (line prefixes, stripped indentation) are skipped.
/// Returns `None` when the two cannot be aligned.
fn literal_flags(value: &str, raw: &str) -> Option<Vec<bool>> {
    let mut flags = Vec::with_capacity(value.len());
    let mut rest = raw;

    for ch in value.chars() {
        let literal = loop {
            let mut chars = rest.chars();
            let next = chars.next()?;
            if next == '\\'
                && let Some(escaped) = chars.next()
                && escaped.is_ascii_punctuation()
            {
                rest = &rest[1 + escaped.len_utf8()..];
                if escaped == ch {
                    break false;
                }
                continue;
            }
            if next == ch {
                rest = &rest[next.len_utf8()..];
                break true;
            }
            if next == '&'
                && let Some(end) = rest.find(';')
            {
                rest = &rest[end + 1..];
                break false;
            }
            rest = &rest[next.len_utf8()..];
        };
        flags.extend(std::iter::repeat_n(literal, ch.len_utf8()));
    }
    Some(flags)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(value: &str) -> mdast::Node {
        mdast::Node::Text(mdast::Text {
            value: value.to_string(),
            position: None,
        })
    }

    #[test]
    fn splits_text_around_delimiters() {
        let children = [text("a !!b!! c")];
        assert_eq!(
            tokenize(&children),
            [
                Token::Text("a ".into()),
                Token::Delimiter,
                Token::Text("b".into()),
                Token::Delimiter,
                Token::Text(" c".into()),
            ]
        );
    }

    #[test]
    fn merges_adjacent_text_before_splitting() {
        let children = [text("x!"), text("!y")];
        assert_eq!(
            tokenize(&children),
            [
                Token::Text("x".into()),
                Token::Delimiter,
                Token::Text("y".into())
            ]
        );
    }

    #[test]
    fn odd_bangs_leave_a_literal() {
        let children = [text("!!!")];
        assert_eq!(
            tokenize(&children),
            [Token::Delimiter, Token::Text("!".into())]
        );
    }

    fn text_at(value: &str, start: usize, end: usize) -> mdast::Node {
        use markdown::unist::{Point, Position};
        mdast::Node::Text(mdast::Text {
            value: value.to_string(),
            position: Some(Position {
                start: Point::new(1, start + 1, start),
                end: Point::new(1, end + 1, end),
            }),
        })
    }

    #[test]
    fn escaped_bangs_are_not_delimiters() {
        let source = r"\!\!x\!\!";
        let children = [text_at("!!x!!", 0, source.len())];
        assert_eq!(
            tokenize_in(&children, Some(source)),
            [Token::Text("!!x!!".into())]
        );
    }

    #[test]
    fn one_escaped_bang_breaks_the_pair() {
        let source = r"!\!!x!!";
        let children = [text_at("!!!x!!", 0, source.len())];
        assert_eq!(
            tokenize_in(&children, Some(source)),
            [Token::Text("!!!x".into()), Token::Delimiter]
        );
    }

    #[test]
    fn character_references_are_not_delimiters() {
        let source = "&#33;&#33;x!!";
        let children = [text_at("!!x!!", 0, source.len())];
        assert_eq!(
            tokenize_in(&children, Some(source)),
            [Token::Text("!!x".into()), Token::Delimiter]
        );
    }

    #[test]
    fn unaligned_source_falls_back_to_value() {
        let children = [text_at("!!x!!", 0, 3)];
        assert_eq!(tokenize_in(&children, Some("abc")).len(), 3);
    }

    #[test]
    fn non_text_nodes_are_opaque() {
        let code = mdast::Node::InlineCode(mdast::InlineCode {
            value: "!!".into(),
            position: None,
        });
        let children = [text("a"), code.clone(), text("b")];
        let tokens = tokenize(&children);
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[1], Token::Node(&code));
    }
}
