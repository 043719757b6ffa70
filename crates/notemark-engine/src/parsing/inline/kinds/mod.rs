//! # Inline Kinds
//!
//! Inline-specific types that own their syntax delimiters. The parser calls
//! these; it never hardcodes `` ` ``, `*` or `[`.
//!
//! - **`CodeSpan`**: backtick raw zones and their normalization
//! - **`DelimiterRun`**: `*`, `_` and `~` runs and their pairing rules
//! - **`LinkSyntax`**: `[text](dest "title")`, `![alt](src)` and `<uri>`

pub mod code_span;
pub mod delimiter;
pub mod link;

pub use code_span::CodeSpan;
pub use delimiter::DelimiterRun;
pub use link::LinkSyntax;
