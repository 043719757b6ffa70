//! # Inline Parsing
//!
//! Token-based inline parsing with explicit raw zones.
//!
//! ## Architecture
//!
//! Inline parsing is separate from block parsing. When a leaf block closes,
//! its lines (container prefixes already stripped) are joined with `\n` and
//! lexed again; a [`SourceMap`] keeps warning offsets pointing into the
//! original text.
//!
//! The parser makes one pass over the tokens producing text, finished nodes
//! and pending delimiter runs, then resolves the runs with a stack-like
//! backward search:
//! - Code spans are raw zones and are matched first, so `` `*a*` `` is code
//! - Link text is parsed as its own run, so emphasis never crosses a link
//! - Unmatched runs fall back to literal text
//!
//! ## Modules
//!
//! - **`kinds`**: Inline types with owned delimiters (CodeSpan, DelimiterRun, LinkSyntax)
//! - **`cursor`**: `TokenCursor` for look-ahead over a token window
//! - **`parser`**: `parse_inline()` main entry point

pub mod cursor;
pub mod kinds;
pub mod parser;

pub use parser::parse_inline;

use crate::parsing::blocks::classify::Line;
use crate::parsing::diagnostics::Warning;
use crate::parsing::rope::SourceMap;
use crate::tree::Node;

/// Parses the inline content of a leaf block given as stripped lines.
///
/// Trailing whitespace of the last line is not content, so a block never
/// ends in a hard break.
pub fn parse_inline_lines(lines: &[Line]) -> (Vec<Node>, Vec<Warning>) {
    let mut text = String::new();
    let mut map = SourceMap::default();
    for (n, line) in lines.iter().enumerate() {
        if n > 0 {
            text.push('\n');
        }
        map.push(text.len(), line.offset);
        text.push_str(&line.text);
    }
    text.truncate(text.trim_end().len());
    parse_inline(&text, &map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::NodeKind;
    use pretty_assertions::assert_eq;

    #[test]
    fn lines_join_with_soft_breaks() {
        let lines = [Line::new(0, "a"), Line::new(4, "b  ")];
        let (nodes, _) = parse_inline_lines(&lines);
        assert_eq!(
            nodes,
            vec![
                Node::text("a"),
                Node::leaf(NodeKind::LineBreak { hard: false }),
                Node::text("b"),
            ]
        );
    }

    #[test]
    fn offsets_map_through_stripped_prefixes() {
        // "> a\n> *b" with the quote prefixes removed
        let lines = [Line::new(2, "a"), Line::new(6, "*b")];
        let (_, warnings) = parse_inline_lines(&lines);
        assert_eq!(warnings[0].offset, Some(6));
    }
}
