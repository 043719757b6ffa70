use notemark_syntax::{Token, TokenKind};

use crate::parsing::blocks::classify::Line;

/// A line that opens an ATX heading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadingOpen {
    pub level: u8,
    /// Heading text with the marker and any closing sequence removed.
    pub content: Line,
}

/// ATX heading type with owned delimiter constant.
pub struct Heading;

impl Heading {
    pub const MARKER: char = '#';
    pub const MAX_LEVEL: u8 = 6;

    pub fn open(tokens: &[Token<'_>], rest: &str, base: usize) -> Option<HeadingOpen> {
        let first = tokens.first()?;
        if first.kind != TokenKind::Hashes || first.len() > Self::MAX_LEVEL as usize {
            return None;
        }
        if tokens.get(1).is_some_and(|t| t.kind != TokenKind::Whitespace) {
            return None;
        }

        let after = &rest[first.span.end..];
        let lead = after.len() - after.trim_start().len();
        let content = Self::strip_closing(after.trim());
        Some(HeadingOpen {
            level: first.len() as u8,
            content: Line {
                offset: base + first.span.end + lead,
                text: content.to_string(),
            },
        })
    }

    /// Removes an optional closing `#` sequence. The sequence only counts if
    /// it is the whole content or is preceded by whitespace.
    pub fn strip_closing(content: &str) -> &str {
        let without = content.trim_end_matches(Self::MARKER);
        if without.is_empty() {
            ""
        } else if without.ends_with([' ', '\t']) {
            without.trim_end()
        } else {
            content
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notemark_syntax::lex;
    use rstest::rstest;

    #[rstest]
    #[case("# Title", 1, "Title")]
    #[case("### Deep ###", 3, "Deep")]
    #[case("## C#", 2, "C#")]
    #[case("#", 1, "")]
    #[case("# #", 1, "")]
    fn opens(#[case] line: &str, #[case] level: u8, #[case] content: &str) {
        let open = Heading::open(&lex(line), line, 0).unwrap();
        assert_eq!(open.level, level);
        assert_eq!(open.content.text, content);
    }

    #[test]
    fn content_offset_points_past_marker() {
        let open = Heading::open(&lex("##   x"), "##   x", 10).unwrap();
        assert_eq!(open.content.offset, 15);
    }

    #[test]
    fn escaped_closing_marker_is_kept() {
        assert_eq!(Heading::strip_closing("C \\#"), "C \\#");
    }
}
