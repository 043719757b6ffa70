use crate::tree::NodeKind;

/// An emphasis, strong or strikethrough delimiter run waiting for a partner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelimiterRun {
    pub ch: char,
    /// Characters not yet consumed by a match.
    pub remaining: usize,
    /// Run length as lexed; used by the multiple-of-three rule.
    pub original: usize,
    pub can_open: bool,
    pub can_close: bool,
    /// Source offset of the run, for warnings.
    pub offset: usize,
}

impl DelimiterRun {
    pub const STAR: char = '*';
    pub const UNDERSCORE: char = '_';
    pub const TILDE: char = '~';

    /// Shortest `~` run that counts as a strikethrough delimiter.
    pub const STRIKE_LEN: usize = 2;

    /// Classifies a run from the characters on either side of it.
    ///
    /// A run can open when followed by a non-space character and close when
    /// preceded by one. `_` also may not open after, or close before, a
    /// letter or digit, so `snake_case_name` stays literal.
    pub fn new(
        ch: char,
        len: usize,
        prev: Option<char>,
        next: Option<char>,
        offset: usize,
    ) -> Self {
        let intraword = ch == Self::UNDERSCORE;
        let can_open = next.is_some_and(|c| !c.is_whitespace())
            && !(intraword && prev.is_some_and(char::is_alphanumeric));
        let can_close = prev.is_some_and(|c| !c.is_whitespace())
            && !(intraword && next.is_some_and(char::is_alphanumeric));
        Self {
            ch,
            remaining: len,
            original: len,
            can_open,
            can_close,
            offset,
        }
    }

    /// Whether `self` (earlier in the text) can pair with `closer`.
    pub fn pairs_with(&self, closer: &DelimiterRun) -> bool {
        if self.ch != closer.ch || !self.can_open || self.remaining == 0 {
            return false;
        }
        if self.ch == Self::TILDE {
            return self.remaining >= Self::STRIKE_LEN && closer.remaining >= Self::STRIKE_LEN;
        }
        let either_both = self.can_close || closer.can_open;
        let sum = self.original + closer.original;
        !(either_both && sum % 3 == 0 && !(self.original % 3 == 0 && closer.original % 3 == 0))
    }

    /// Characters a match between `self` and `closer` consumes, and the
    /// node kind it forms.
    pub fn consume(&self, closer: &DelimiterRun) -> (usize, NodeKind) {
        if self.ch == Self::TILDE {
            (Self::STRIKE_LEN, NodeKind::Strikethrough)
        } else if self.remaining >= 2 && closer.remaining >= 2 {
            (2, NodeKind::Strong)
        } else {
            (1, NodeKind::Emphasis)
        }
    }

    /// Whether an unmatched run is worth a warning. Runs that can neither
    /// open nor close are ordinary punctuation.
    pub fn was_delimiter(&self) -> bool {
        self.can_open || self.can_close
    }
}
