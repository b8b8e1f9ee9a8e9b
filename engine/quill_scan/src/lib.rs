//! The Quill scanner: drives a compiled transition table over one line of
//! text at a time, writing one classification tag per byte.
//!
//! The scanner itself is language-blind. It knows four things the table
//! does not express: spaces and tabs are gaps, a newline ends a line,
//! non-ASCII bytes group into UTF-8 sequences, and an interrupted token
//! must still be classified. Everything else, including which bytes start
//! which tokens and what a token means, lives in the table.
//!
//! Scanning a line is a pure function of the table, the entry state and
//! the line bytes, which is what makes line-boundary restart (and with it
//! incremental rescanning) sound.

mod scanner;

pub use scanner::Scanner;
