use notemark_syntax::{Token, TokenKind};

use crate::parsing::blocks::classify::Line;

/// Kind of list marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    /// `-`, `*` or `+`.
    Bullet(char),
    /// Digits followed by `.` or `)`.
    Ordered { start: u64, delimiter: char },
}

/// A list item marker opened on a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListMarker {
    pub kind: MarkerKind,
    /// Column where the item's content begins; continuation lines indented
    /// at least this far belong to the item.
    pub content_indent: usize,
    /// First line of item content (marker and padding removed).
    pub content: Line,
    /// `Some` if the content starts with a task box.
    pub checked: Option<bool>,
}

/// Maximum digits in an ordered list marker.
const MAX_ORDINAL_DIGITS: usize = 9;

/// Spaces after the marker beyond which the content counts as indented code
/// and the padding is taken to be one space.
const MAX_PADDING: usize = 4;

impl ListMarker {
    pub const BULLETS: [char; 3] = ['-', '*', '+'];
    pub const DELIMITERS: [char; 2] = ['.', ')'];
    /// Largest ordinal that fits in a marker.
    pub const MAX_START: u64 = 999_999_999;

    pub fn open(tokens: &[Token<'_>], rest: &str, indent: usize, base: usize) -> Option<Self> {
        let first = tokens.first()?;
        let (kind, marker_end) = match first.kind {
            TokenKind::Dashes | TokenKind::Stars if first.len() == 1 => {
                (MarkerKind::Bullet(first.text.chars().next()?), first.span.end)
            }
            TokenKind::Plus => (MarkerKind::Bullet('+'), first.span.end),
            TokenKind::Digits if first.len() <= MAX_ORDINAL_DIGITS => {
                let delim = tokens.get(1)?;
                let delimiter = match delim.kind {
                    TokenKind::Dot => '.',
                    TokenKind::RParen => ')',
                    _ => return None,
                };
                let start = first.text.parse().ok()?;
                (MarkerKind::Ordered { start, delimiter }, delim.span.end)
            }
            _ => return None,
        };

        let after = &rest[marker_end..];
        if !(after.is_empty() || after.starts_with([' ', '\t'])) {
            return None;
        }
        let spaces = after.len() - after.trim_start_matches([' ', '\t']).len();
        let content_text = after.trim_start_matches([' ', '\t']);
        let padding = if content_text.is_empty() || spaces > MAX_PADDING {
            1
        } else {
            spaces
        };
        let skip = if content_text.is_empty() {
            after.len()
        } else {
            padding.min(after.len())
        };
        let content = Line::new(base + marker_end + skip, &after[skip..]);
        let (checked, content) = Self::task_box(content);

        Some(Self {
            kind,
            content_indent: indent + marker_end + padding,
            content,
            checked,
        })
    }

    /// Splits a leading `[ ]`, `[x]` or `[X]` box off the item content.
    fn task_box(content: Line) -> (Option<bool>, Line) {
        let checked = match content.text.get(..3) {
            Some("[ ]") => false,
            Some("[x]") | Some("[X]") => true,
            _ => return (None, content),
        };
        let after = &content.text[3..];
        if !(after.is_empty() || after.starts_with(' ')) {
            return (None, content);
        }
        let skip = if after.is_empty() { 3 } else { 4 };
        let rest = Line {
            offset: content.offset + skip,
            text: content.text[skip..].to_string(),
        };
        (Some(checked), rest)
    }

    pub fn is_ordered(&self) -> bool {
        matches!(self.kind, MarkerKind::Ordered { .. })
    }

    /// Empty items and ordered items not numbered 1 may not interrupt a
    /// paragraph.
    pub fn can_interrupt_paragraph(&self) -> bool {
        if self.content.is_blank() && self.checked.is_none() {
            return false;
        }
        match self.kind {
            MarkerKind::Bullet(_) => true,
            MarkerKind::Ordered { start, .. } => start == 1,
        }
    }

    /// Whether `next` continues the same list as `self`.
    pub fn accepts(&self, next: &ListMarker) -> bool {
        match (self.kind, next.kind) {
            (MarkerKind::Bullet(a), MarkerKind::Bullet(b)) => a == b,
            (
                MarkerKind::Ordered { delimiter: a, .. },
                MarkerKind::Ordered { delimiter: b, .. },
            ) => a == b,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notemark_syntax::lex;
    use rstest::rstest;

    fn open(line: &str) -> Option<ListMarker> {
        let indent = line.len() - line.trim_start().len();
        let rest = &line[indent..];
        ListMarker::open(&lex(rest), rest, indent, indent)
    }

    #[rstest]
    #[case("- a", MarkerKind::Bullet('-'), 2, "a")]
    #[case("* a", MarkerKind::Bullet('*'), 2, "a")]
    #[case("+   a", MarkerKind::Bullet('+'), 4, "a")]
    #[case("1. a", MarkerKind::Ordered { start: 1, delimiter: '.' }, 3, "a")]
    #[case("10) a", MarkerKind::Ordered { start: 10, delimiter: ')' }, 4, "a")]
    #[case("  - a", MarkerKind::Bullet('-'), 4, "a")]
    fn markers(
        #[case] line: &str,
        #[case] kind: MarkerKind,
        #[case] content_indent: usize,
        #[case] text: &str,
    ) {
        let m = open(line).unwrap();
        assert_eq!(m.kind, kind);
        assert_eq!(m.content_indent, content_indent);
        assert_eq!(m.content.text, text);
    }

    #[rstest]
    #[case("-a")]
    #[case("** a")]
    #[case("1.a")]
    #[case("1234567890. a")]
    #[case("a. b")]
    fn not_markers(#[case] line: &str) {
        assert!(open(line).is_none());
    }

    #[test]
    fn wide_padding_falls_back_to_one_space() {
        let m = open("-      code").unwrap();
        assert_eq!(m.content_indent, 2);
        assert_eq!(m.content.text, "     code");
    }

    #[test]
    fn empty_item() {
        let m = open("-").unwrap();
        assert_eq!(m.content.text, "");
        assert!(!m.can_interrupt_paragraph());
    }

    #[rstest]
    #[case("- [ ] todo", Some(false), "todo")]
    #[case("- [x] done", Some(true), "done")]
    #[case("- [X]", Some(true), "")]
    #[case("- [y] no", None, "[y] no")]
    #[case("- [ ]x", None, "[ ]x")]
    fn task_boxes(#[case] line: &str, #[case] checked: Option<bool>, #[case] text: &str) {
        let m = open(line).unwrap();
        assert_eq!(m.checked, checked);
        assert_eq!(m.content.text, text);
    }

    #[test]
    fn ordered_not_starting_at_one_cannot_interrupt() {
        assert!(!open("2. a").unwrap().can_interrupt_paragraph());
        assert!(open("1. a").unwrap().can_interrupt_paragraph());
    }

    #[test]
    fn accepts_same_bullet_only() {
        let dash = open("- a").unwrap();
        assert!(dash.accepts(&open("- b").unwrap()));
        assert!(!dash.accepts(&open("* b").unwrap()));
        assert!(!dash.accepts(&open("1. b").unwrap()));
    }
}
