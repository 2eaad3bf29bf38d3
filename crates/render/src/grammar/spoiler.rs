use super::{InlineRule, RuleMatch, Token};
use crate::ast::Node;
use crate::parse::TreeBuilder;

/// `!!content!!` → [`Node::Spoiler`].
///
/// The closing delimiter must sit at the same inline level as the opening one and the
/// content must not be blank; otherwise the delimiter stays literal text.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpoilerRule;

impl InlineRule for SpoilerRule {
    fn name(&self) -> &'static str {
        "spoiler"
    }

    fn try_match(&self, tokens: &[Token<'_>], builder: &TreeBuilder<'_>) -> Option<RuleMatch> {
        if !matches!(tokens.first()?, Token::Delimiter) {
            return None;
        }
        let close = 1 + tokens[1..]
            .iter()
            .position(|token| matches!(token, Token::Delimiter))?;
        let inner = &tokens[1..close];
        if inner.iter().all(Token::is_blank) {
            log::debug!("Empty spoiler left as literal text");
            return None;
        }

        Some(RuleMatch {
            node: Node::Spoiler {
                children: builder.inline(inner),
            },
            consumed: close + 1,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::default_rules;

    fn attempt(tokens: &[Token<'_>]) -> Option<RuleMatch> {
        let rules = default_rules();
        let builder = TreeBuilder::new(&rules);
        SpoilerRule.try_match(tokens, &builder)
    }

    #[test]
    fn wraps_content_between_delimiters() {
        let tokens = [
            Token::Delimiter,
            Token::Text("secret".into()),
            Token::Delimiter,
            Token::Text(" tail".into()),
        ];
        let matched = attempt(&tokens).expect("spoiler should match");
        assert_eq!(matched.consumed, 3);
        assert_eq!(
            matched.node,
            Node::Spoiler {
                children: vec![Node::text("secret")]
            }
        );
    }

    #[test]
    fn declines_without_closing_delimiter() {
        let tokens = [Token::Delimiter, Token::Text("open".into())];
        assert!(attempt(&tokens).is_none());
    }

    #[test]
    fn declines_blank_content() {
        assert!(attempt(&[Token::Delimiter, Token::Delimiter]).is_none());
        let tokens = [Token::Delimiter, Token::Text("  ".into()), Token::Delimiter];
        assert!(attempt(&tokens).is_none());
    }

    #[test]
    fn declines_when_not_at_a_delimiter() {
        let tokens = [Token::Text("x".into()), Token::Delimiter];
        assert!(attempt(&tokens).is_none());
    }
}
