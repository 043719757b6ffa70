use notemark_syntax::{Token, TokenKind};

/// A cursor over a bounded window of lexed tokens.
///
/// Inline constructs are recognized by scanning ahead from a start token;
/// on failure the caller simply discards the cursor, so no state leaks.
#[derive(Clone)]
pub struct TokenCursor<'t, 's> {
    tokens: &'t [Token<'s>],
    /// Current token index.
    pub i: usize,
    /// Exclusive end of the window.
    pub hi: usize,
}

impl<'t, 's> TokenCursor<'t, 's> {
    pub fn new(tokens: &'t [Token<'s>], i: usize, hi: usize) -> Self {
        Self {
            tokens,
            i,
            hi: hi.min(tokens.len()),
        }
    }

    pub fn eof(&self) -> bool {
        self.i >= self.hi
    }

    pub fn peek(&self) -> Option<&'t Token<'s>> {
        if self.eof() {
            None
        } else {
            self.tokens.get(self.i)
        }
    }

    pub fn peek_kind(&self) -> Option<TokenKind> {
        self.peek().map(|t| t.kind)
    }

    pub fn at(&self, kind: TokenKind) -> bool {
        self.peek_kind() == Some(kind)
    }

    pub fn bump(&mut self) -> Option<&'t Token<'s>> {
        let token = self.peek()?;
        self.i += 1;
        Some(token)
    }

    /// Skips spaces and line endings.
    pub fn skip_whitespace(&mut self) {
        while matches!(
            self.peek_kind(),
            Some(TokenKind::Whitespace | TokenKind::Newline | TokenKind::HardBreak)
        ) {
            self.i += 1;
        }
    }

    /// Index of the next backtick run of exactly `len` before the window end.
    pub fn find_run(&self, kind: TokenKind, len: usize) -> Option<usize> {
        (self.i..self.hi).find(|&k| self.tokens[k].kind == kind && self.tokens[k].len() == len)
    }
}
