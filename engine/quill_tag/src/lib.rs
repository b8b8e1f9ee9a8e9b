//! Per-byte classification tags for the Quill engine.
//!
//! Every byte of text carries exactly one [`Tag`]: a base [`TokenClass`]
//! plus at most one [`Override`]. The first byte of a token carries the
//! token's classification; subsequent bytes carry [`TokenClass::More`]
//! (token continuation) or [`TokenClass::Joint`] (UTF-8 continuation byte
//! of a grapheme). Spaces and tabs carry [`TokenClass::Gap`], newlines
//! [`TokenClass::Newline`].
//!
//! [`TagBuf`] stores tags packed one byte per text byte and is edited
//! transactionally alongside the text buffer: every insert or delete of
//! text bytes is mirrored by an equal-length splice of tag bytes.

mod buf;
mod class;
mod tag;

pub use buf::TagBuf;
pub use class::{Priority, Role, TokenClass};
pub use tag::{Override, Tag};
