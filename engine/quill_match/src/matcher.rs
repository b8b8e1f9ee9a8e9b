//! The forward matching algorithm.

use crate::sink::MatchSink;
use quill_tag::{Override, Role, TokenClass};
use smallvec::SmallVec;

/// An opener still waiting for its partner.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Opener {
    pub at: usize,
    pub class: TokenClass,
}

/// The matcher's resumption state: the stack of unmatched openers, oldest
/// first.
///
/// Invariant: at most the top entry is a quote or comment delimiter.
/// While one is on top nothing pushes (interior tokens are overridden
/// instead), so everything beneath the top is always a plain bracket.
///
/// The state is `Eq`-comparable and cheap to clone, which is what the
/// per-line boundary snapshots rely on: rescanning after an edit stops as
/// soon as a line boundary reproduces its previously recorded state.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MatchState {
    stack: SmallVec<[Opener; 16]>,
    /// Tokens provisionally overridden under a one-line quote top. If the
    /// quote fails at its newline they were real tokens after all and are
    /// replayed through the stack. Always empty at a line boundary, since
    /// no one-line quote survives one.
    pending: SmallVec<[(usize, TokenClass); 8]>,
}

impl MatchState {
    pub fn new() -> MatchState {
        MatchState::default()
    }

    /// The unmatched openers, oldest first.
    pub fn openers(&self) -> &[Opener] {
        &self.stack
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// Shift every recorded position at or after `from` by `delta`.
    /// Applied to cached snapshots when an edit moves later text.
    pub fn shift(&mut self, from: usize, delta: isize) {
        for opener in &mut self.stack {
            if opener.at >= from {
                opener.at = opener.at.saturating_add_signed(delta);
            }
        }
        for (at, _) in &mut self.pending {
            if *at >= from {
                *at = at.saturating_add_signed(delta);
            }
        }
    }

    /// Feed one head tag. `at` is the byte offset of the token head;
    /// `class` is its base class. Gaps and continuation tags are not
    /// matching events and need not be fed, but feeding them is harmless.
    /// Newlines must be fed: they end line comments and unterminate
    /// one-line quotes.
    pub fn step(&mut self, at: usize, class: TokenClass, sink: &mut impl MatchSink) {
        // A quote or comment delimiter on top captures the interior.
        if let Some(&top) = self.stack.last() {
            match top.class {
                TokenClass::Quote | TokenClass::Double => {
                    if class == top.class {
                        self.stack.pop();
                        self.pending.clear();
                        sink.paired(top.at, at);
                    } else if class == TokenClass::Newline {
                        // The quote never closed on its line: undo the
                        // provisional interior overrides, replay the
                        // interiors as ordinary tokens, and give the
                        // newline to whatever is underneath.
                        sink.revert_overrides(top.at + 1..at);
                        sink.set_override(top.at, Override::Mismatched);
                        self.stack.pop();
                        let pending = std::mem::take(&mut self.pending);
                        for (interior_at, interior) in pending {
                            self.step(interior_at, interior, sink);
                        }
                        self.step(at, class, sink);
                    } else {
                        sink.set_override(at, Override::Quoted);
                        self.pending.push((at, class));
                    }
                    return;
                }
                TokenClass::Triple => {
                    if class == top.class {
                        self.stack.pop();
                        sink.paired(top.at, at);
                    } else if class != TokenClass::Newline {
                        sink.set_override(at, Override::Quoted);
                    }
                    return;
                }
                TokenClass::Note => {
                    if class == TokenClass::Newline {
                        self.stack.pop();
                        sink.paired(top.at, at);
                    } else {
                        sink.set_override(at, Override::Commented);
                    }
                    return;
                }
                TokenClass::CommentOpen => {
                    if class == TokenClass::CommentClose {
                        self.stack.pop();
                        sink.paired(top.at, at);
                    } else if class != TokenClass::Newline {
                        // Comments do not nest: an interior open marker
                        // is just commented text.
                        sink.set_override(at, Override::Commented);
                    }
                    return;
                }
                _ => {}
            }
        }

        // Top of stack (if any) is a plain bracket.
        match class.role() {
            Some(Role::Opener | Role::Both) => {
                self.stack.push(Opener { at, class });
            }
            Some(Role::Closer) => self.close(at, class, sink),
            None => {}
        }
    }

    /// Resolve a closer against the bracket stack.
    fn close(&mut self, at: usize, class: TokenClass, sink: &mut impl MatchSink) {
        if class == TokenClass::CommentClose {
            // Only a comment-open top matches a comment close, and that
            // case was handled before we got here.
            sink.set_override(at, Override::Mismatched);
            return;
        }
        // Safe: bracket closers all carry a priority.
        let Some(closing) = class.priority() else {
            return;
        };
        loop {
            let Some(&top) = self.stack.last() else {
                sink.set_override(at, Override::Mismatched);
                return;
            };
            let Some(open) = top.class.priority() else {
                return;
            };
            if open == closing {
                // Equal priority means the same bracket kind.
                self.stack.pop();
                sink.paired(top.at, at);
                return;
            }
            if open < closing {
                // The closer outranks the opener: the opener can never
                // match anything inside the closer's construct.
                self.stack.pop();
                sink.set_override(top.at, Override::Mismatched);
                continue;
            }
            // The opener outranks the closer: the closer loses and the
            // stack stays intact.
            sink.set_override(at, Override::Mismatched);
            return;
        }
    }
}
