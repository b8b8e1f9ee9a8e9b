//! Where match results go.

use quill_tag::{Override, TagBuf};

/// Receiver for the matcher's output events.
///
/// All methods default to no-ops so a sink only implements what it cares
/// about.
pub trait MatchSink {
    /// Apply an override to the head tag at `at`.
    fn set_override(&mut self, at: usize, over: Override) {
        let _ = (at, over);
    }

    /// Remove provisional overrides from every tag in `range`. Emitted
    /// when a one-line quote turns out to be unterminated.
    fn revert_overrides(&mut self, range: std::ops::Range<usize>) {
        let _ = range;
    }

    /// The opener at `opener` and the token at `closer` matched.
    fn paired(&mut self, opener: usize, closer: usize) {
        let _ = (opener, closer);
    }
}

/// The edit path: overrides land in the tag buffer.
impl MatchSink for TagBuf {
    fn set_override(&mut self, at: usize, over: Override) {
        TagBuf::set_override(self, at, over);
    }

    fn revert_overrides(&mut self, range: std::ops::Range<usize>) {
        self.clear_overrides(range);
    }

    /// A matched pair carries no override. The opener's tag can hold a
    /// stale `Mismatched` from an earlier pass when it sits behind the
    /// start of the current rescan, so both ends are cleared explicitly.
    fn paired(&mut self, opener: usize, closer: usize) {
        TagBuf::set_override(self, opener, Override::None);
        TagBuf::set_override(self, closer, Override::None);
    }
}

/// The query path: records pairings, discards override writes.
#[derive(Clone, Debug, Default)]
pub struct PairLog {
    pub pairs: Vec<(usize, usize)>,
}

impl PairLog {
    pub fn new() -> PairLog {
        PairLog::default()
    }

    /// The partner of the token at `at`, if a pairing involving it was
    /// recorded.
    pub fn partner_of(&self, at: usize) -> Option<usize> {
        self.pairs.iter().find_map(|&(open, close)| {
            if open == at {
                Some(close)
            } else if close == at {
                Some(open)
            } else {
                None
            }
        })
    }
}

impl MatchSink for PairLog {
    fn paired(&mut self, opener: usize, closer: usize) {
        self.pairs.push((opener, closer));
    }
}
