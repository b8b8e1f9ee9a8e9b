//! Line index: where every line of the text starts.

use crate::source::TextSource;
use memchr::memchr_iter;

/// Sorted start offsets of every line. Line 0 always starts at 0, so the
/// index is never empty; a text ending in a newline has a final empty
/// line.
#[derive(Clone, Debug)]
pub struct LineIndex {
    starts: Vec<usize>,
}

impl Default for LineIndex {
    fn default() -> LineIndex {
        LineIndex { starts: vec![0] }
    }
}

impl LineIndex {
    pub fn new() -> LineIndex {
        LineIndex::default()
    }

    pub fn line_count(&self) -> usize {
        self.starts.len()
    }

    /// Start offset of `line`.
    ///
    /// # Panics
    /// Panics if `line` is out of range, like slice indexing.
    pub fn start(&self, line: usize) -> usize {
        self.starts[line]
    }

    /// The line containing `offset`. An offset equal to the text length
    /// belongs to the last line.
    pub fn line_of(&self, offset: usize) -> usize {
        self.starts.partition_point(|&s| s <= offset) - 1
    }

    /// Byte range of `line`, including its newline byte when present.
    pub fn line_range(&self, line: usize, text_len: usize) -> std::ops::Range<usize> {
        let start = self.starts[line];
        let end = self
            .starts
            .get(line + 1)
            .copied()
            .unwrap_or(text_len);
        start..end
    }

    /// Mirror a text edit: drop the line starts inside the deleted range,
    /// shift the later ones, and index the newlines of the inserted bytes
    /// (read back from `text`, which already reflects the edit).
    ///
    /// Returns `(first, removed, added)`: the index of the first affected
    /// line start and how many entries were removed and added there, so a
    /// parallel per-line cache can be spliced identically.
    pub fn splice(
        &mut self,
        text: &impl TextSource,
        offset: usize,
        deleted: usize,
        inserted: usize,
    ) -> (usize, usize, usize) {
        let lo = self.starts.partition_point(|&s| s <= offset);
        let hi = self.starts.partition_point(|&s| s <= offset + deleted);
        let delta = inserted as isize - deleted as isize;
        for start in &mut self.starts[hi..] {
            *start = start.saturating_add_signed(delta);
        }

        let mut fresh = vec![0u8; inserted];
        text.read(offset, &mut fresh);
        let new_starts: Vec<usize> = memchr_iter(b'\n', &fresh)
            .map(|i| offset + i + 1)
            .collect();
        let added = new_starts.len();
        self.starts.splice(lo..hi, new_starts);
        (lo, hi - lo, added)
    }
}
