pub mod block_quote;
pub mod code_fence;
pub mod heading;
pub mod list;
pub mod table;
pub mod thematic_break;

pub use block_quote::BlockQuote;
pub use code_fence::{CodeFence, FenceKind, FenceOpen};
pub use heading::{Heading, HeadingOpen};
pub use list::{ListMarker, MarkerKind};
pub use table::Table;
pub use thematic_break::ThematicBreak;
