#![deny(missing_docs)]
//! scribe render: markdown to HTML with captioned images and spoilers.

/// Syntax tree types.
pub mod ast;
/// Parallel batch rendering.
pub mod batch;
/// Inline grammar extensions.
pub mod grammar;
/// HTML lowering and the render entry points.
pub mod html;
/// Markdown parsing into [`ast::Node`].
pub mod parse;

pub use ast::{Align, Image, Node};
pub use batch::{BatchOptions, render_batch};
pub use grammar::{CaptionRule, InlineRule, RuleMatch, SpoilerRule, Token, default_rules};
pub use html::{RenderOptions, Renderer, render, render_stored, render_with};
pub use parse::{ParseOptions, Parser, TreeBuilder, parse};
