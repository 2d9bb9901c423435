//! Map compiled EVM instructions back to the source text they came from.
//!
//! The compiler's assembly JSON gives every instruction a character-offset
//! span. [`PositionCatalog`] collects those spans per contract,
//! [`NewlineIndex`] turns offsets into line/column pairs, and [`Resolver`]
//! ties both to program counters discovered during disassembly.

pub mod catalog;
pub mod compiler;
pub mod error;
pub mod position;
pub mod resolver;

pub use catalog::{PositionCatalog, SharedCatalog};
pub use compiler::{CompilerConfig, CompilerRunner, SolcRunner};
pub use error::{Result, SourceMapError};
pub use position::{LineColumn, NewlineIndex, PositionEntry, PositionGroup, SourceSpan};
pub use resolver::{source_path, InstrPositionTable, Resolver};
