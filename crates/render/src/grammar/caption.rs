use super::{CAPTION_MARKER, InlineRule, RuleMatch, Token};
use crate::ast::{Image, Node};
use crate::parse::TreeBuilder;

/// `![¡caption](url)` → captioned [`Image`].
///
/// Everything after the marker is the caption, whitespace included. Images whose alt
/// text does not start with [`CAPTION_MARKER`], or has only whitespace after it, are
/// left to the base grammar as ordinary images.
#[derive(Debug, Clone, Copy, Default)]
pub struct CaptionRule;

impl InlineRule for CaptionRule {
    fn name(&self) -> &'static str {
        "caption"
    }

    fn try_match(&self, tokens: &[Token<'_>], builder: &TreeBuilder<'_>) -> Option<RuleMatch> {
        let Token::Node(node) = tokens.first()? else {
            return None;
        };
        let image = builder.image(node)?;
        let caption = image.alt.strip_prefix(CAPTION_MARKER)?;
        if caption.trim().is_empty() {
            return None;
        }
        let caption = caption.to_string();

        Some(RuleMatch {
            node: Node::Image(Image {
                alt: caption.clone(),
                caption: Some(caption),
                ..image
            }),
            consumed: 1,
        })
    }
}
