//! # Lexer - Tokenizing Markdown Source
//!
//! This module is the first stage of parsing: breaking source text into
//! typed lexical spans using the [Logos] lexer generator.
//!
//! [Logos]: https://docs.rs/logos
//!
//! ## The Lossless Guarantee
//!
//! **Every byte in the input appears in exactly one token.** Nothing is
//! skipped or discarded, and any character that matches no rule becomes a
//! [`TokenKind::Text`] token instead of an error:
//!
//! ```
//! use notemark_syntax::lexer::lex;
//!
//! let input = "# Hello, **world**!\n";
//! let tokens = lex(input);
//!
//! let reconstructed: String = tokens.iter().map(|t| t.text).collect();
//! assert_eq!(input, reconstructed);
//! ```
//!
//! ## Delimiter Runs
//!
//! Marker characters that can repeat (`*`, `_`, `~`, `` ` ``, `#`, `-`) are
//! lexed as whole runs. Logos always takes the longest match, so `**` is one
//! `Stars` token rather than two, and the inline parser sees each delimiter
//! run exactly once.
//!
//! ## Token Design Philosophy
//!
//! Tokens are **context-free**. The lexer doesn't know whether `-` starts a
//! list item, a thematic break, or is a hyphen in a sentence - that's the
//! block parser's job. The lexer is restartable: nested containers re-lex the
//! remainder of a line after stripping their prefix.

use std::ops::Range;

use logos::Logos;

/// Token kinds produced by the Logos lexer.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Horizontal whitespace (spaces, tabs)
    #[regex(r"[ \t]+")]
    Whitespace,

    /// Line ending (LF or CRLF)
    #[regex(r"\r?\n")]
    Newline,

    /// A backslash or two-plus trailing spaces before a line ending
    #[regex(r"\\\r?\n|  +\r?\n")]
    HardBreak,

    /// Backslash followed by ASCII punctuation
    #[regex(r"\\[\x21-\x2F\x3A-\x40\x5B-\x60\x7B-\x7E]")]
    Escape,

    /// A backslash that escapes nothing
    #[token("\\")]
    Backslash,

    /// Run of `#` for headings
    #[regex(r"#+")]
    Hashes,

    /// `>` for blockquotes and autolink close
    #[token(">")]
    Gt,

    /// `<` for autolinks
    #[token("<")]
    Lt,

    /// Run of `-` for bullets and thematic breaks
    #[regex(r"-+")]
    Dashes,

    /// Run of `*` for emphasis, bullets and thematic breaks
    #[regex(r"\*+")]
    Stars,

    /// Run of `_` for emphasis and thematic breaks
    #[regex(r"_+")]
    Underscores,

    /// Run of `~` for strikethrough and fences
    #[regex(r"~+")]
    Tildes,

    /// Run of backticks for code spans and fences
    #[regex(r"`+")]
    Backticks,

    /// `+` for bullets
    #[token("+")]
    Plus,

    /// Run of ASCII digits for ordered list markers
    #[regex(r"[0-9]+")]
    Digits,

    /// `.` ordered list delimiter
    #[token(".")]
    Dot,

    /// `[` for links
    #[token("[")]
    LBracket,

    /// `]` for links
    #[token("]")]
    RBracket,

    /// `(` for link destinations
    #[token("(")]
    LParen,

    /// `)` for link destinations and ordered list delimiters
    #[token(")")]
    RParen,

    /// `!` for images
    #[token("!")]
    Bang,

    /// `|` for table cells
    #[token("|")]
    Pipe,

    /// `:` for table alignment
    #[token(":")]
    Colon,

    /// `"` for link titles
    #[token("\"")]
    DoubleQuote,

    /// `'` for link titles
    #[token("'")]
    SingleQuote,

    /// Plain text - anything not matched by other rules
    #[regex(r#"[^\s\\#<>*_~`+\-0-9.\[\]()!|:"']+"#)]
    Text,
}

impl TokenKind {
    /// The repeated character of a delimiter-run token, if this is one.
    pub fn run_char(self) -> Option<char> {
        match self {
            TokenKind::Stars => Some('*'),
            TokenKind::Underscores => Some('_'),
            TokenKind::Tildes => Some('~'),
            TokenKind::Backticks => Some('`'),
            TokenKind::Hashes => Some('#'),
            TokenKind::Dashes => Some('-'),
            _ => None,
        }
    }

    /// True for tokens that end a line.
    pub fn is_line_end(self) -> bool {
        matches!(self, TokenKind::Newline | TokenKind::HardBreak)
    }
}

/// A lexed token with its kind, text slice and byte span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    pub span: Range<usize>,
}

impl Token<'_> {
    /// Length of the token in characters (delimiter runs are ASCII, so this
    /// equals the run length for them).
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    /// True if the token covers no text. Lexed tokens are never empty.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Lex the input into a sequence of tokens.
///
/// Guarantees that all bytes from the input appear in the output tokens.
pub fn lex(input: &str) -> Vec<Token<'_>> {
    Tokens::new(input).collect()
}

/// A restartable token stream over a string slice.
#[derive(Clone)]
pub struct Tokens<'a> {
    input: &'a str,
    lexer: logos::Lexer<'a, TokenKind>,
}

impl<'a> Tokens<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            lexer: TokenKind::lexer(input),
        }
    }

    /// Restart the stream from the beginning of the input.
    pub fn restart(&mut self) {
        self.lexer = TokenKind::lexer(self.input);
    }
}

impl<'a> Iterator for Tokens<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let result = self.lexer.next()?;
        // Logos error means unrecognized character - treat as TEXT
        let kind = result.unwrap_or(TokenKind::Text);
        Some(Token {
            kind,
            text: self.lexer.slice(),
            span: self.lexer.span(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn kinds(input: &str) -> Vec<(TokenKind, &str)> {
        lex(input).into_iter().map(|t| (t.kind, t.text)).collect()
    }

    #[test]
    fn lex_empty_input() {
        assert_eq!(lex(""), vec![]);
    }

    #[test]
    fn lex_plain_text() {
        assert_eq!(kinds("hello"), vec![(TokenKind::Text, "hello")]);
    }

    #[test]
    fn lex_newline_crlf() {
        assert_eq!(kinds("\r\n"), vec![(TokenKind::Newline, "\r\n")]);
    }

    #[test]
    fn longest_match_wins_for_strong_marker() {
        assert_eq!(
            kinds("**a*"),
            vec![
                (TokenKind::Stars, "**"),
                (TokenKind::Text, "a"),
                (TokenKind::Stars, "*"),
            ]
        );
    }

    #[test]
    fn heading_marker_is_one_run() {
        assert_eq!(
            kinds("### x"),
            vec![
                (TokenKind::Hashes, "###"),
                (TokenKind::Whitespace, " "),
                (TokenKind::Text, "x"),
            ]
        );
    }

    #[rstest]
    #[case("a  \nb", TokenKind::HardBreak, "  \n")]
    #[case("a\\\nb", TokenKind::HardBreak, "\\\n")]
    #[case("\\*", TokenKind::Escape, "\\*")]
    #[case("\\a", TokenKind::Backslash, "\\")]
    fn special_sequences(#[case] input: &str, #[case] kind: TokenKind, #[case] text: &str) {
        assert!(
            kinds(input).contains(&(kind, text)),
            "{input:?} should contain {kind:?} {text:?}"
        );
    }

    #[test]
    fn link_tokens() {
        assert_eq!(
            kinds("[t](u \"x\")"),
            vec![
                (TokenKind::LBracket, "["),
                (TokenKind::Text, "t"),
                (TokenKind::RBracket, "]"),
                (TokenKind::LParen, "("),
                (TokenKind::Text, "u"),
                (TokenKind::Whitespace, " "),
                (TokenKind::DoubleQuote, "\""),
                (TokenKind::Text, "x"),
                (TokenKind::DoubleQuote, "\""),
                (TokenKind::RParen, ")"),
            ]
        );
    }

    #[test]
    fn ordered_marker_tokens() {
        assert_eq!(
            kinds("12. a"),
            vec![
                (TokenKind::Digits, "12"),
                (TokenKind::Dot, "."),
                (TokenKind::Whitespace, " "),
                (TokenKind::Text, "a"),
            ]
        );
    }

    #[test]
    fn unicode_text_is_one_run() {
        assert_eq!(
            kinds("héllo wörld"),
            vec![
                (TokenKind::Text, "héllo"),
                (TokenKind::Whitespace, " "),
                (TokenKind::Text, "wörld"),
            ]
        );
    }

    #[test]
    fn all_bytes_preserved_complex() {
        let input = "## Heading\n\n> A *quote* with [link](http://x.test)\n\n- [ ] item\n  1) nested\n\n```rust\ncode\n```\n| a | b |\n|:-|-:|";
        let reconstructed: String = lex(input).iter().map(|t| t.text).collect();
        assert_eq!(input, reconstructed);
    }

    #[test]
    fn spans_are_correct() {
        let input = "hello *world* ~~x~~";
        for token in lex(input) {
            assert_eq!(token.text, &input[token.span.clone()]);
        }
    }

    #[test]
    fn restart_yields_same_tokens() {
        let mut tokens = Tokens::new("a *b*");
        let first: Vec<_> = tokens.by_ref().collect();
        tokens.restart();
        let second: Vec<_> = tokens.collect();
        assert_eq!(first, second);
    }

    proptest::proptest! {
        #[test]
        fn lexing_is_lossless(input in "\\PC*") {
            let reconstructed: String = lex(&input).iter().map(|t| t.text).collect();
            proptest::prop_assert_eq!(input, reconstructed);
        }
    }
}
