//! # notemark-syntax
//!
//! The tokenizer of the notemark document engine: a lossless, context-free
//! lexer built with [Logos].
//!
//! [Logos]: https://docs.rs/logos
//!
//! ```text
//! "# Hello\n" → [Hashes("#"), Whitespace(" "), Text("Hello"), Newline("\n")]
//! ```
//!
//! The block and inline parsers in `notemark-engine` consume these tokens.
//! Lexing never fails: any byte sequence that matches no marker rule becomes
//! a [`TokenKind::Text`] run.

pub mod lexer;

pub use lexer::{Token, TokenKind, Tokens, lex};
