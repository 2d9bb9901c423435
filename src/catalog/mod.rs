mod asm;
mod cache;
mod units;

pub use asm::{extract_positions, is_tag, strip_tags, AsmInstruction, AssemblyObject};
pub use cache::{PositionCatalog, SharedCatalog};
pub use units::{first_json_object, split_units, AsmUnit};
