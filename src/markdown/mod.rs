//! Markdown bodies: pulldown-cmark tokens, a small document tree, and an escaping HTML renderer.

mod ast;
mod parse;
mod render;

pub use ast::{plain_text, Block, Document, Inline, TocEntry};
pub use parse::parse;
pub use render::{escape_html, render, safe_url};

/// Parse and render in one step.
pub fn to_html(src: &str) -> String {
    render(&parse(src))
}
