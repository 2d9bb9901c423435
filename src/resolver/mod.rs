mod table;

use std::fs;
use std::path::{Path, PathBuf};

use crate::catalog::{PositionCatalog, SharedCatalog};
use crate::compiler::CompilerRunner;
use crate::error::{Result, SourceMapError};
use crate::position::{NewlineIndex, PositionEntry, PositionGroup, SourceSpan};

pub use table::InstrPositionTable;

/// Maps the instructions of one contract back to its source text.
#[derive(Debug)]
pub struct Resolver {
    contract: String,
    path: PathBuf,
    source: String,
    index: NewlineIndex,
    positions: PositionGroup,
    instr_positions: InstrPositionTable,
}

impl Resolver {
    /// Load `path`, compile it if the catalog hasn't yet, and bind the
    /// positions of `contract`.
    pub fn new(
        contract: &str,
        path: impl AsRef<Path>,
        catalog: &mut PositionCatalog,
        runner: &dyn CompilerRunner,
    ) -> Result<Self> {
        let path = path.as_ref();
        let source = load_source(path)?;
        catalog.ensure_built(path, runner)?;
        let positions = catalog.lookup(path, contract)?;
        Ok(Self::from_parts(contract, path, source, positions))
    }

    /// Same as [`new`](Self::new), against a catalog shared between threads.
    pub fn with_shared(
        contract: &str,
        path: impl AsRef<Path>,
        catalog: &SharedCatalog,
        runner: &dyn CompilerRunner,
    ) -> Result<Self> {
        let path = path.as_ref();
        let source = load_source(path)?;
        let positions = {
            let mut guard = catalog.lock();
            guard.ensure_built(path, runner)?;
            guard.lookup(path, contract)?
        };
        Ok(Self::from_parts(contract, path, source, positions))
    }

    /// Build from a `<file>:<Contract>` identifier; the whole identifier is
    /// the unit name the compiler reports.
    pub fn from_contract_id(
        contract_id: &str,
        catalog: &mut PositionCatalog,
        runner: &dyn CompilerRunner,
    ) -> Result<Self> {
        let path = source_path(contract_id);
        Self::new(contract_id, path, catalog, runner)
    }

    fn from_parts(contract: &str, path: &Path, source: String, positions: PositionGroup) -> Self {
        let index = NewlineIndex::build(&source);
        Self {
            contract: contract.to_string(),
            path: path.to_path_buf(),
            source,
            index,
            positions,
            instr_positions: InstrPositionTable::new(),
        }
    }

    pub fn contract_name(&self) -> &str {
        &self.contract
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn newline_index(&self) -> &NewlineIndex {
        &self.index
    }

    /// Raw positions of the bound contract, in instruction order.
    pub fn positions(&self) -> &[PositionEntry] {
        &self.positions
    }

    pub fn instr_positions(&self) -> &InstrPositionTable {
        &self.instr_positions
    }

    /// Associate `pc` with the `position_index`-th non-tag instruction.
    pub fn register_position(&mut self, pc: usize, position_index: usize) -> Result<()> {
        let entry = self.positions.get(position_index).copied().ok_or(
            SourceMapError::PositionIndexOutOfRange {
                index: position_index,
                len: self.positions.len(),
            },
        )?;
        self.instr_positions.insert(pc, entry);
        Ok(())
    }

    /// Literal source text of the instruction at `pc`, or `None` when the
    /// compiler gave it no location.
    pub fn source_text_for(&self, pc: usize) -> Result<Option<&str>> {
        let entry = self.instr_positions.get(pc)?;
        let Some((begin, end)) = entry.char_range() else {
            return Ok(None);
        };
        char_slice(&self.source, begin, end)
            .map(Some)
            .ok_or_else(|| SourceMapError::SpanOutOfBounds {
                begin: entry.begin,
                end: entry.end,
                len: self.source.chars().count(),
            })
    }

    /// Begin and end coordinates for `pc`, or `None` without a location.
    pub fn location(&self, pc: usize) -> Result<Option<SourceSpan>> {
        let entry = self.instr_positions.get(pc)?;
        Ok(self.index.resolve_entry(&entry))
    }

    /// Three-line report: `<contract>:<line>:<column>`, the snippet, a caret.
    ///
    /// Instructions without a location yield a single line saying so.
    pub fn formatted_location(&self, pc: usize) -> Result<String> {
        let Some(span) = self.location(pc)? else {
            return Ok(format!("{}: <no source location>", self.contract));
        };
        let snippet = self.source_text_for(pc)?.unwrap_or_default();
        Ok(format!(
            "{}:{}:{}\n{}\n^",
            self.contract, span.begin.line, span.begin.column, snippet
        ))
    }
}

fn load_source(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| SourceMapError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// File part of a `<file>:<Contract>` identifier.
pub fn source_path(contract_id: &str) -> &str {
    contract_id.split(':').next().unwrap_or(contract_id)
}

/// Slice by character offsets, `None` if the range leaves the text.
fn char_slice(text: &str, begin: usize, end: usize) -> Option<&str> {
    let mut bounds = text
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(text.len()));
    let start = bounds.nth(begin)?;
    let stop = if end == begin {
        start
    } else {
        bounds.nth(end - begin - 1)?
    };
    Some(&text[start..stop])
}
