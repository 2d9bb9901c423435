use super::types::{LineColumn, PositionEntry, SourceSpan};

/// Greatest index `i` with `array[i] <= target`, or `None` when every
/// element is larger (or the array is empty).
pub fn lower_bound(target: usize, array: &[usize]) -> Option<usize> {
    let mut start = 0usize;
    let mut length = array.len();

    while length > 0 {
        let half = length >> 1;
        let middle = start + half;
        if array[middle] <= target {
            length = length - 1 - half;
            start = middle + 1;
        } else {
            length = half;
        }
    }

    start.checked_sub(1)
}

/// Ascending character offsets of every `\n` in a source text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewlineIndex {
    breaks: Vec<usize>,
}

impl NewlineIndex {
    pub fn build(source: &str) -> Self {
        let breaks = source
            .chars()
            .enumerate()
            .filter(|(_, ch)| *ch == '\n')
            .map(|(i, _)| i)
            .collect();
        Self { breaks }
    }

    pub fn breaks(&self) -> &[usize] {
        &self.breaks
    }

    pub fn len(&self) -> usize {
        self.breaks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.breaks.is_empty()
    }

    /// Character offset where `line` starts.
    pub fn line_start(&self, line: usize) -> usize {
        match line {
            0 => 0,
            n => self.breaks[n - 1] + 1,
        }
    }

    /// Convert a character offset to a line/column pair.
    ///
    /// An offset sitting exactly on a newline is reported as column 0 of the
    /// following line.
    pub fn resolve(&self, offset: usize) -> LineColumn {
        match lower_bound(offset, &self.breaks) {
            Some(i) if self.breaks[i] == offset => LineColumn {
                line: i + 1,
                column: 0,
            },
            found => {
                let line = found.map_or(0, |i| i + 1);
                LineColumn {
                    line,
                    column: offset - self.line_start(line),
                }
            }
        }
    }

    /// Inverse of [`resolve`](Self::resolve) for offsets not on a newline.
    pub fn offset_of(&self, at: LineColumn) -> usize {
        self.line_start(at.line) + at.column
    }

    pub fn resolve_entry(&self, entry: &PositionEntry) -> Option<SourceSpan> {
        let (begin, _) = entry.char_range()?;
        let last = entry.last_offset()?;
        Some(SourceSpan {
            begin: self.resolve(begin),
            end: self.resolve(last),
        })
    }
}
