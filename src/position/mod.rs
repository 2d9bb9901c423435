mod index;
mod types;

pub use index::{lower_bound, NewlineIndex};
pub use types::{LineColumn, PositionEntry, PositionGroup, SourceSpan};
