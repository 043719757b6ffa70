//! # Block Parsing
//!
//! Two-phase block parsing with one open-block context per nesting level.
//!
//! ## Parsing Phases
//!
//! 1. **Line Classification** (`classify`): Each line is classified into a `LineClass`
//!    containing local facts (indentation, blank status, the block it could open)
//!
//! 2. **Block Construction** (`builder`): A `BlockBuilder` offers each line to the
//!    open block's continuation rule, then to the block-start rules, and emits
//!    nodes as blocks close
//!
//! ## Modules
//!
//! - **`kinds`**: Block-specific types with owned delimiters (BlockQuote, CodeFence,
//!   Heading, ListMarker, Table, ThematicBreak)
//! - **`classify`**: `MarkdownLineClassifier` produces `LineClass` for each line
//! - **`builder`**: `BlockBuilder` state machine for block construction
//!
//! ## Key Invariants
//!
//! - Start precedence: thematic break > heading > fence > block quote > list > paragraph
//! - Fenced and indented code blocks are raw zones: no block/inline parsing inside
//! - Container content is re-parsed by a nested builder; nesting is capped at
//!   [`builder::MAX_NESTING`] so hostile input cannot exhaust the stack
//! - Unterminated constructs close implicitly at the end of their container

pub mod builder;
pub mod classify;
pub mod kinds;

pub use builder::BlockBuilder;
pub use classify::{BlockStart, Line, LineClass, MarkdownLineClassifier};
