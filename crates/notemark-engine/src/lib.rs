//! Markdown document engine.
//!
//! Parses markdown into a [`tree::Node`] tree, writes trees back out as
//! markdown, and restores client-edited node lists into valid trees. All
//! three operations are pure and never fail on text input; problems come
//! back as [`parsing::Warning`]s next to a best-effort result.

pub mod api;
pub mod error;
pub mod parsing;
pub mod restore;
pub mod stringify;
pub mod tree;

// Re-export key types for easier usage
pub use error::{EngineError, decode, parse_bytes};
pub use parsing::{ParseResult, Warning, WarningKind, parse_markdown};
pub use restore::restore;
pub use stringify::stringify;
pub use tree::{Alignment, LinkKind, LinkReference, Node, NodeKind, links};
