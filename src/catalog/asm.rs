use serde::Deserialize;

use crate::position::PositionEntry;

/// Top-level assembly object; only the instruction list is read.
#[derive(Debug, Clone, Deserialize)]
pub struct AssemblyObject {
    #[serde(rename = ".code")]
    pub code: Vec<AsmInstruction>,
}

/// One entry of the `.code` list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AsmInstruction {
    pub name: String,
    pub begin: i64,
    pub end: i64,
}

/// Labels (`tag`) are jump targets with no slot in the position list.
pub fn is_tag(instruction: &AsmInstruction) -> bool {
    instruction.name.starts_with("tag")
}

pub fn strip_tags(code: Vec<AsmInstruction>) -> Vec<AsmInstruction> {
    code.into_iter().filter(|instr| !is_tag(instr)).collect()
}

/// Parse one unit's assembly object into its position list.
pub fn extract_positions(json: &str) -> serde_json::Result<Vec<PositionEntry>> {
    let object: AssemblyObject = serde_json::from_str(json)?;
    Ok(strip_tags(object.code)
        .iter()
        .map(|instr| PositionEntry::new(instr.begin, instr.end))
        .collect())
}
