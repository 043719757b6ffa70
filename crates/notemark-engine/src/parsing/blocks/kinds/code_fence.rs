use notemark_syntax::{Token, TokenKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FenceKind {
    Backticks,
    Tildes,
}

/// A line that opens (or could close) a fenced code block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FenceOpen {
    pub kind: FenceKind,
    /// Length of the marker run.
    pub len: usize,
    /// Indentation of the opening line, removed from content lines.
    pub indent: usize,
    /// First word of the info string.
    pub language: String,
    /// A closing fence carries no info string.
    pub bare: bool,
}

pub struct CodeFence;

impl CodeFence {
    pub const MIN_LEN: usize = 3;
    pub const BACKTICK: char = '`';
    pub const TILDE: char = '~';

    pub fn open(tokens: &[Token<'_>], rest: &str, indent: usize) -> Option<FenceOpen> {
        let first = tokens.first()?;
        let kind = match first.kind {
            TokenKind::Backticks => FenceKind::Backticks,
            TokenKind::Tildes => FenceKind::Tildes,
            _ => return None,
        };
        if first.len() < Self::MIN_LEN {
            return None;
        }
        let info = rest[first.span.end..].trim();
        if kind == FenceKind::Backticks && info.contains(Self::BACKTICK) {
            return None;
        }
        Some(FenceOpen {
            kind,
            len: first.len(),
            indent,
            language: info.split_whitespace().next().unwrap_or_default().to_string(),
            bare: info.is_empty(),
        })
    }

    /// A fence closes on a bare run of the same character at least as long.
    pub fn closes(open: &FenceOpen, candidate: &FenceOpen) -> bool {
        candidate.kind == open.kind && candidate.len >= open.len && candidate.bare
    }

    /// Shortest fence of `marker` that no line of `literal` can close.
    pub fn fence_for(literal: &str, marker: char) -> String {
        let longest = literal
            .lines()
            .map(|l| {
                let t = l.trim_start();
                t.len() - t.trim_start_matches(marker).len()
            })
            .max()
            .unwrap_or(0);
        marker.to_string().repeat((longest + 1).max(Self::MIN_LEN))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notemark_syntax::lex;

    fn open(line: &str) -> Option<FenceOpen> {
        CodeFence::open(&lex(line), line, 0)
    }

    #[test]
    fn detect_backtick_fence_with_language() {
        let f = open("```rust ignore").unwrap();
        assert_eq!(f.kind, FenceKind::Backticks);
        assert_eq!(f.language, "rust");
        assert!(!f.bare);
    }

    #[test]
    fn detect_tilde_fence() {
        assert_eq!(open("~~~~").unwrap().len, 4);
    }

    #[test]
    fn two_backticks_are_not_a_fence() {
        assert!(open("``").is_none());
    }

    #[test]
    fn backtick_in_info_is_not_a_fence() {
        assert!(open("``` a`b").is_none());
    }

    #[test]
    fn closes_only_with_same_kind_and_enough_length() {
        let opener = open("````").unwrap();
        assert!(CodeFence::closes(&opener, &open("`````").unwrap()));
        assert!(!CodeFence::closes(&opener, &open("```").unwrap()));
        assert!(!CodeFence::closes(&opener, &open("~~~~").unwrap()));
    }

    #[test]
    fn fence_outgrows_literal_backticks() {
        assert_eq!(CodeFence::fence_for("a\n````\nb", '`'), "`````");
        assert_eq!(CodeFence::fence_for("plain", '`'), "```");
        assert_eq!(CodeFence::fence_for("~~~", '~'), "~~~~");
    }
}
