use notemark_syntax::{Token, TokenKind};

/// Thematic break: three or more of the same `-`, `*` or `_`, optionally
/// separated by spaces, and nothing else on the line.
pub struct ThematicBreak;

impl ThematicBreak {
    /// Canonical form written by the stringifier.
    pub const CANONICAL: &'static str = "---";

    pub fn matches(tokens: &[Token<'_>]) -> bool {
        let mut marker = None;
        let mut count = 0;
        for t in tokens {
            match t.kind {
                TokenKind::Whitespace => {}
                TokenKind::Dashes | TokenKind::Stars | TokenKind::Underscores => {
                    if marker.is_some_and(|m| m != t.kind) {
                        return false;
                    }
                    marker = Some(t.kind);
                    count += t.len();
                }
                _ => return false,
            }
        }
        count >= 3
    }
}
