//! Bracket and delimiter matching over the tag stream.
//!
//! The matcher never sees text bytes, only the head tags the scanner
//! produced. It keeps one piece of state: the ordered stack of openers
//! that are still waiting for a partner. Everything else it has to say is
//! said through a [`MatchSink`]: overrides for mismatched delimiters and
//! for the interiors of quotes and comments, and pairing events for
//! matched partners.
//!
//! The same stepping logic serves two callers. The edit path feeds a
//! [`TagBuf`](quill_tag::TagBuf) as the sink, writing overrides in place.
//! The query path replays a stretch of tags into a [`PairLog`], which
//! records pairings and discards override writes, leaving the buffer
//! untouched.

mod matcher;
mod sink;

pub use matcher::{MatchState, Opener};
pub use sink::{MatchSink, PairLog};
