//! Table-integrity faults.
//!
//! Detected once, at load time, and fatal for that table: the caller must
//! not scan with a table that failed validation. They are authoring or
//! compiler errors, never runtime conditions. A language-change operation
//! that hits one of these aborts and leaves the previous table in effect.

use thiserror::Error;

/// Why a compiled table failed to load.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TableError {
    #[error("table truncated: needed {needed} bytes, found {found}")]
    Truncated { needed: usize, found: usize },

    #[error("state count {0} out of range 1..=256")]
    BadStateCount(usize),

    #[error("pattern count {0} out of range 1..=4096")]
    BadPatternCount(usize),

    #[error("string pool malformed or truncated")]
    BadStringPool,

    #[error("trailing bytes after string pool")]
    TrailingBytes,

    #[error("unknown action byte 0x{byte:02x} at state {state}, pattern {pattern}")]
    UnknownAction { state: usize, pattern: usize, byte: u8 },

    #[error("target state {target} out of range at state {state}, pattern {pattern}")]
    BadTarget {
        state: usize,
        pattern: usize,
        target: usize,
    },

    #[error("pattern {0:?} contains a byte outside printable ASCII")]
    BadPatternByte(String),

    #[error("pattern {0:?} declared twice")]
    DuplicatePattern(String),

    #[error("pattern {0:?} out of leading-byte order")]
    PatternOrder(String),

    #[error("no wildcard fallback pattern at the end of the pool")]
    MissingWildcard,

    #[error("state {state} has no consuming fallback for byte 0x{byte:02x}")]
    MissingFallback { state: usize, byte: u8 },

    #[error("lookahead pattern {0:?} has a continue action; lookahead must classify")]
    LookaheadContinues(String),
}
