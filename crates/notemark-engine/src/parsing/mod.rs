pub mod blocks;
pub mod diagnostics;
pub mod inline;
pub mod rope;

use xi_rope::Rope;

use crate::tree::Node;
use blocks::{BlockBuilder, Line};
use rope::lines_with_spans;

pub use diagnostics::{ParseResult, Warning, WarningKind};

/// Parses markdown text into a document tree. Never fails.
pub fn parse_markdown(text: &str) -> ParseResult {
    parse_rope(&Rope::from(text))
}

/// Parses the contents of a rope into a document tree. Never fails.
pub fn parse_rope(rope: &Rope) -> ParseResult {
    let lines = lines_with_spans(rope)
        .map(|lr| {
            let text = lr.text.trim_end_matches('\n').trim_end_matches('\r');
            Line::new(lr.span.start, text)
        })
        .collect();

    let (children, warnings) = BlockBuilder::parse(lines, 0);
    log::debug!(
        "parsed {} bytes into {} blocks with {} warnings",
        rope.len(),
        children.len(),
        warnings.len()
    );
    ParseResult {
        document: Node::document(children),
        warnings,
    }
}
