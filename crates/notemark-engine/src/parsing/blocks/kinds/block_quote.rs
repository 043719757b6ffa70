use crate::parsing::blocks::classify::Line;

/// Blockquote block type with owned delimiter constant.
pub struct BlockQuote;

impl BlockQuote {
    /// The blockquote prefix character.
    pub const PREFIX: char = '>';

    /// Strips one `>` prefix and one optional following space, returning the
    /// remaining content. Nested quotes are handled by re-parsing the
    /// content, so `> > a` yields `> a` here.
    pub fn open(rest: &str, base: usize) -> Option<Line> {
        let after = rest.strip_prefix(Self::PREFIX)?;
        let (skip, content) = match after.strip_prefix(' ') {
            Some(content) => (2, content),
            None => (1, after),
        };
        Some(Line::new(base + skip, content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_no_quote() {
        assert_eq!(BlockQuote::open("hello", 0), None);
    }

    #[test]
    fn strip_single_quote() {
        assert_eq!(BlockQuote::open("> hello", 0).unwrap().text, "hello");
    }

    #[test]
    fn strip_keeps_nested_marker() {
        let inner = BlockQuote::open("> > hello", 4).unwrap();
        assert_eq!(inner.text, "> hello");
        assert_eq!(inner.offset, 6);
    }

    #[test]
    fn strip_without_space() {
        assert_eq!(BlockQuote::open(">hello", 0).unwrap().text, "hello");
    }
}
