use std::collections::HashMap;

use crate::error::{Result, SourceMapError};
use crate::position::PositionEntry;

/// Program counter to position, filled in as instructions are discovered.
#[derive(Debug, Default)]
pub struct InstrPositionTable {
    entries: HashMap<usize, PositionEntry>,
}

impl InstrPositionTable {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Later registrations for the same pc replace earlier ones.
    pub fn insert(&mut self, pc: usize, entry: PositionEntry) {
        self.entries.insert(pc, entry);
        tracing::trace!(pc, begin = entry.begin, end = entry.end, "registered position");
    }

    pub fn get(&self, pc: usize) -> Result<PositionEntry> {
        self.entries
            .get(&pc)
            .copied()
            .ok_or(SourceMapError::UnregisteredPc(pc))
    }

    pub fn contains(&self, pc: usize) -> bool {
        self.entries.contains_key(&pc)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registered pcs in ascending order.
    pub fn pcs(&self) -> Vec<usize> {
        let mut pcs: Vec<usize> = self.entries.keys().copied().collect();
        pcs.sort_unstable();
        pcs
    }
}
