//! Compiled transition tables for the Quill scanner.
//!
//! A table is an external artifact, produced by a language compiler that is
//! not part of this workspace. This crate consumes its binary form: an
//! ordered set of named states, an ordered set of patterns grouped by
//! leading byte, and a dense `states x patterns` action matrix. The table
//! is loaded once, validated once, and is immutable for the session; a
//! language change replaces it wholesale.
//!
//! All integrity checking happens at load time. A table that passes
//! [`Table::from_bytes`] guarantees the scanner a match for every
//! reachable `(state, byte)` pair, so scanning itself can never fail.
//!
//! [`TableBuilder`] is the writer half: programmatic construction that
//! serializes to the same binary format, used by tests and by embedded
//! language definitions.

mod action;
mod builder;
mod error;
mod table;

pub use action::{Action, ActionKind, StateId, START_STATE};
pub use builder::TableBuilder;
pub use error::TableError;
pub use table::{Matched, Table};
