//! The user-facing layer of the Quill engine.
//!
//! [`Highlighter`] ties the pieces together: it owns the compiled table,
//! the per-byte tag buffer, a line index over the text, and a snapshot of
//! the scanner and matcher state at every line boundary. The editor tells
//! it about each text edit after the fact; it splices the tag buffer,
//! rescans from the nearest line boundary before the edit, and stops as
//! soon as a boundary snapshot reproduces its previously recorded value,
//! at which point every later tag is known to still be valid.
//!
//! Text itself stays on the editor's side of the fence, behind
//! [`TextSource`]: the engine reads bytes, it never stores them.

mod highlight;
mod lines;
mod source;

pub use highlight::{Edit, Highlighter};
pub use lines::LineIndex;
pub use source::TextSource;
