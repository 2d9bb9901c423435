use std::fmt;
use std::sync::Arc;

use serde::Serialize;

/// Character-offset span the compiler attributed to one instruction.
///
/// `end` is inclusive. `begin == -1`, or an end that falls more than one
/// character before `begin`, means the compiler had no source for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PositionEntry {
    pub begin: i64,
    pub end: i64,
}

impl PositionEntry {
    pub fn new(begin: i64, end: i64) -> Self {
        Self { begin, end }
    }

    pub fn is_resolvable(&self) -> bool {
        self.begin >= 0 && self.end >= self.begin - 1
    }

    /// Half-open character range, or `None` for an unresolvable entry.
    pub fn char_range(&self) -> Option<(usize, usize)> {
        if !self.is_resolvable() {
            return None;
        }
        let begin = usize::try_from(self.begin).ok()?;
        let stop = match usize::try_from(self.end) {
            Ok(end) if end >= begin => end.saturating_add(1),
            _ => begin,
        };
        Some((begin, stop))
    }

    /// Inclusive last offset; an empty span ends where it begins.
    pub fn last_offset(&self) -> Option<usize> {
        if !self.is_resolvable() {
            return None;
        }
        usize::try_from(self.end.max(self.begin)).ok()
    }
}

/// Positions for one contract, index-aligned with its non-tag instructions.
pub type PositionGroup = Arc<[PositionEntry]>;

/// 0-based line and column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LineColumn {
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for LineColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Begin and end coordinates of a resolvable entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SourceSpan {
    pub begin: LineColumn,
    pub end: LineColumn,
}
