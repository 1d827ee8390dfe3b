//! Markdown to HTML conversion.
//!
//! Standard CommonMark conversion via pulldown-cmark. Front-matter handling
//! lives in [`crate::meta`]; the header block passes through here as an HTML
//! comment and is stripped after template rendering.

use pulldown_cmark::{html, Parser};

/// Render a Markdown document to an HTML fragment.
pub fn to_html(markdown: &str) -> String {
    let parser = Parser::new(markdown);
    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}
