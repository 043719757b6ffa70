use notemark_syntax::{Token, TokenKind, lex};

/// Code span inline type with owned delimiter constant.
///
/// Code spans are raw zones: no other inline parsing occurs inside them.
pub struct CodeSpan;

impl CodeSpan {
    /// The backtick character that delimits code spans.
    pub const TICK: char = '`';

    /// Normalizes raw span content: line endings become spaces, and one
    /// space is stripped from each side when both sides have one and the
    /// content is not all spaces.
    pub fn literal(raw: &str) -> String {
        let flat = raw.replace("\r\n", " ").replace('\n', " ");
        let stripped = flat.len() >= 2
            && flat.starts_with(' ')
            && flat.ends_with(' ')
            && !flat.bytes().all(|b| b == b' ');
        if stripped {
            flat[1..flat.len() - 1].to_string()
        } else {
            flat
        }
    }

    /// A fence and padding that reproduce `literal` when parsed.
    ///
    /// The fence is the shortest backtick run the literal does not contain,
    /// so the first run of that length after the opener is the closer.
    pub fn delimit(literal: &str) -> (String, &'static str) {
        let runs: Vec<usize> = lex(literal)
            .iter()
            .filter(|t| t.kind == TokenKind::Backticks)
            .map(Token::len)
            .collect();
        let len = (1..).find(|n| !runs.contains(n)).unwrap_or(1);
        let fence = Self::TICK.to_string().repeat(len);
        // A trailing backslash would escape the closing fence.
        let needs_pad = literal.starts_with(Self::TICK)
            || literal.ends_with(Self::TICK)
            || literal.ends_with('\\')
            || (literal.starts_with(' ')
                && literal.ends_with(' ')
                && !literal.bytes().all(|b| b == b' '));
        (fence, if needs_pad { " " } else { "" })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("code", "code")]
    #[case(" a ", "a")]
    #[case("  a  ", " a ")]
    #[case("   ", "   ")]
    #[case("a\nb", "a b")]
    #[case(" `` ", "``")]
    fn literals(#[case] raw: &str, #[case] literal: &str) {
        assert_eq!(CodeSpan::literal(raw), literal);
    }

    #[rstest]
    #[case("a", "`", "")]
    #[case("a`b", "``", "")]
    #[case("`a", "``", " ")]
    #[case(" a ", "`", " ")]
    #[case("a```b", "`", "")]
    #[case("a`b``c", "```", "")]
    #[case("a\\", "`", " ")]
    fn delimiters(#[case] literal: &str, #[case] fence: &str, #[case] pad: &str) {
        assert_eq!(CodeSpan::delimit(literal), (fence.to_string(), pad));
    }
}
