use std::sync::OnceLock;

use regex::Regex;

fn scheme_regex() -> &'static Regex {
    static ABSOLUTE_URI: OnceLock<Regex> = OnceLock::new();
    ABSOLUTE_URI.get_or_init(|| {
        Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]{1,31}:[^\s<>]*$").expect("Invalid autolink regex")
    })
}

/// Link, image and autolink syntax with owned delimiter constants.
pub struct LinkSyntax;

impl LinkSyntax {
    pub const OPEN: char = '[';
    pub const CLOSE: char = ']';
    pub const IMAGE: char = '!';
    pub const AUTOLINK_OPEN: char = '<';
    pub const AUTOLINK_CLOSE: char = '>';

    /// Link and image nesting beyond which brackets are read as text.
    pub const MAX_NESTING: usize = 32;

    /// Whether the text between `<` and `>` is an absolute URI.
    pub fn is_autolink(candidate: &str) -> bool {
        scheme_regex().is_match(candidate)
    }

    /// Whether a destination must be written in angle brackets.
    pub fn needs_angle_brackets(destination: &str) -> bool {
        destination.is_empty()
            || destination
                .chars()
                .any(|c| c.is_whitespace() || matches!(c, '(' | ')' | '<' | '>'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("https://example.test/a?b=c", true)]
    #[case("mailto:me@example.test", true)]
    #[case("irc://x", true)]
    #[case("not a url", false)]
    #[case("a:b", false)]
    #[case("example.test", false)]
    fn autolinks(#[case] candidate: &str, #[case] expected: bool) {
        assert_eq!(LinkSyntax::is_autolink(candidate), expected);
    }

    #[test]
    fn angle_brackets_for_spaces_and_parens() {
        assert!(LinkSyntax::needs_angle_brackets("a b"));
        assert!(LinkSyntax::needs_angle_brackets("f(x)"));
        assert!(!LinkSyntax::needs_angle_brackets("https://x.test"));
    }
}
