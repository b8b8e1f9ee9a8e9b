//! The highlighter: incremental rescan loop and tag queries.

use crate::lines::LineIndex;
use crate::source::TextSource;
use quill_match::{MatchState, PairLog};
use quill_scan::Scanner;
use quill_table::{StateId, Table, TableError};
use quill_tag::{Override, Role, Tag, TagBuf};

/// Notification of one text edit. The text already reflects the edit:
/// `deleted` bytes at `offset` were replaced by `inserted` bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Edit {
    pub offset: usize,
    pub deleted: usize,
    pub inserted: usize,
}

/// Scanner and matcher state at one line boundary. Two equal boundaries
/// guarantee identical scanning and matching of everything after them,
/// which is the whole basis of incremental rescanning.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct Boundary {
    state: StateId,
    openers: MatchState,
}

/// Owns the tags and keeps them consistent with the text across edits.
#[derive(Clone, Debug)]
pub struct Highlighter {
    table: Table,
    tags: TagBuf,
    lines: LineIndex,
    /// `boundaries[i]` is the snapshot entering line `i`; `None` marks a
    /// freshly inserted line whose entry state is not yet known. Kept
    /// parallel to the line index at all times.
    boundaries: Vec<Option<Boundary>>,
    /// State after the final line: the scanner's carried state and the
    /// openers still unmatched at end of text.
    end: Boundary,
    /// Lines rescanned by the most recent edit, for diagnostics.
    last_rescan: usize,
}

impl Highlighter {
    pub fn new(table: Table) -> Highlighter {
        Highlighter {
            table,
            tags: TagBuf::new(),
            lines: LineIndex::new(),
            boundaries: vec![Some(Boundary::default())],
            end: Boundary::default(),
            last_rescan: 0,
        }
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn tags(&self) -> &TagBuf {
        &self.tags
    }

    /// Lines rescanned by the most recent edit.
    pub fn last_rescan_lines(&self) -> usize {
        self.last_rescan
    }

    /// Tag a whole text from scratch, discarding previous state.
    pub fn load(&mut self, text: &impl TextSource) {
        self.tags = TagBuf::new();
        self.lines = LineIndex::new();
        self.boundaries = vec![Some(Boundary::default())];
        self.end = Boundary::default();
        self.apply_edit(
            text,
            Edit {
                offset: 0,
                deleted: 0,
                inserted: text.len(),
            },
        );
    }

    /// Replace the compiled table and retag the text. A table that fails
    /// validation is rejected whole: the previous table and all tags stay
    /// in effect.
    pub fn set_table(&mut self, bytes: &[u8], text: &impl TextSource) -> Result<(), TableError> {
        let table = Table::from_bytes(bytes)?;
        self.table = table;
        tracing::info!(
            states = self.table.state_count(),
            patterns = self.table.pattern_count(),
            "table replaced"
        );
        self.load(text);
        Ok(())
    }

    /// Bring the tags back in step with the text after one edit.
    ///
    /// Splices the tag buffer and the line index, then rescans from the
    /// boundary of the line containing the edit. Rescanning stops at the
    /// first line boundary whose recomputed snapshot equals the recorded
    /// one: everything beyond is unchanged by construction.
    pub fn apply_edit(&mut self, text: &impl TextSource, edit: Edit) {
        let Edit {
            offset,
            deleted,
            inserted,
        } = edit;
        let delta = inserted as isize - deleted as isize;

        self.tags.splice(offset, deleted, inserted);
        let (first_entry, removed, added) = self.lines.splice(text, offset, deleted, inserted);
        self.boundaries.splice(
            first_entry..first_entry + removed,
            std::iter::repeat_with(|| None).take(added),
        );
        debug_assert_eq!(self.boundaries.len(), self.lines.line_count());

        // Recorded opener positions after the edit have moved with the
        // text. Positions inside the deleted range shift to garbage, but
        // those snapshots can only fail the stability comparison, which
        // just extends the rescan.
        for boundary in self.boundaries.iter_mut().flatten() {
            boundary.openers.shift(offset, delta);
        }
        self.end.openers.shift(offset, delta);

        let first_line = self.lines.line_of(offset);
        self.rescan(text, first_line);
        tracing::debug!(
            offset,
            deleted,
            inserted,
            first_line,
            lines = self.last_rescan,
            "edit applied"
        );
    }

    /// Rescan and rematch line by line from `first_line` until a boundary
    /// snapshot stabilises or the text ends.
    fn rescan(&mut self, text: &impl TextSource, first_line: usize) {
        let scanner = Scanner::new(&self.table);
        let text_len = text.len();
        debug_assert!(self.boundaries[first_line].is_some());
        let mut boundary = self.boundaries[first_line].clone().unwrap_or_default();
        let mut line = first_line;
        let mut scratch = Vec::new();
        self.last_rescan = 0;

        loop {
            let range = self.lines.line_range(line, text_len);
            scratch.resize(range.len(), 0);
            text.read(range.start, &mut scratch);

            let state = scanner.scan_line(boundary.state, &scratch, &mut self.tags, range.start);

            // The scanner rewrote every tag in the line override-free, so
            // the matcher starts from a clean slate here.
            let mut openers = boundary.openers;
            let heads: Vec<(usize, Tag)> = self.tags.heads(range).collect();
            for (at, tag) in heads {
                openers.step(at, tag.class, &mut self.tags);
            }

            boundary = Boundary { state, openers };
            self.last_rescan += 1;
            line += 1;

            if line >= self.lines.line_count() {
                // An opener unmatched at end of text carries no
                // resolution; an earlier pass may have left a stale
                // `Mismatched` on one sitting behind the rescan start.
                // (Pairings behind the rescan start are cleared by the
                // sink as they happen.)
                for opener in boundary.openers.openers() {
                    self.tags.set_override(opener.at, Override::None);
                }
                self.end = boundary;
                return;
            }
            match &self.boundaries[line] {
                Some(previous) if *previous == boundary => return,
                _ => self.boundaries[line] = Some(boundary.clone()),
            }
        }
    }

    // --- queries ---------------------------------------------------------

    /// The tag at `offset`: base class plus override.
    pub fn classification(&self, offset: usize) -> Tag {
        self.tags.get(offset)
    }

    /// Head offset and tag of the token containing `offset`.
    fn head(&self, offset: usize) -> (usize, Tag) {
        let head = self.tags.head_of(offset);
        (head, self.tags.get(head))
    }

    /// Is the token at `offset` a pair-opening delimiter?
    pub fn is_opener(&self, offset: usize) -> bool {
        matches!(self.head(offset).1.class.role(), Some(Role::Opener | Role::Both))
    }

    /// Is the token at `offset` a pair-closing delimiter?
    pub fn is_closer(&self, offset: usize) -> bool {
        matches!(self.head(offset).1.class.role(), Some(Role::Closer | Role::Both))
    }

    /// Is the delimiter at `offset` paired with a compatible partner?
    pub fn is_matched(&self, offset: usize) -> bool {
        let (head, tag) = self.head(offset);
        tag.class.role().is_some()
            && tag.over == Override::None
            && !self.is_unmatched_opener(head)
    }

    /// Was the delimiter at `offset` paired with an incompatible partner?
    pub fn is_mismatched(&self, offset: usize) -> bool {
        self.head(offset).1.over == Override::Mismatched
    }

    /// An opener still waiting for a partner at end of text.
    fn is_unmatched_opener(&self, head: usize) -> bool {
        self.end.openers.openers().iter().any(|o| o.at == head)
    }

    /// The partner position of the matched delimiter at `offset`.
    ///
    /// Replays the matcher read-only from the boundary of the delimiter's
    /// line; the tag buffer is not touched. Returns `None` for anything
    /// that is not a matched delimiter.
    pub fn matching_position(&self, offset: usize) -> Option<usize> {
        let (head, tag) = self.head(offset);
        tag.class.role()?;
        if tag.over != Override::None || self.is_unmatched_opener(head) {
            return None;
        }
        let line = self.lines.line_of(head);
        let mut openers = self.boundaries.get(line)?.clone()?.openers;
        let mut log = PairLog::new();
        for (at, t) in self.tags.heads(self.lines.start(line)..self.tags.len()) {
            openers.step(at, t.class, &mut log);
            if at >= head {
                if let Some(partner) = log.partner_of(head) {
                    return Some(partner);
                }
            }
        }
        log.partner_of(head)
    }

    /// First offset after the token containing `offset`.
    pub fn next_token_boundary(&self, offset: usize) -> usize {
        self.tags.next_token_boundary(offset)
    }

    /// First offset after the UTF-8 sequence containing `offset`.
    pub fn next_grapheme_boundary(&self, offset: usize) -> usize {
        self.tags.next_grapheme_boundary(offset)
    }
}
