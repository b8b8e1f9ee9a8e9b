//! In-memory transition table and its binary reader.
//!
//! Binary layout (big-endian):
//!
//! ```text
//! u16 state count
//! u16 pattern count
//! states x patterns cells of 2 bytes: action byte, target state index
//! string pool: NUL-terminated state names, in state order,
//!              then NUL-terminated pattern strings, in pattern order
//! ```
//!
//! Action bytes are the one-character class short names, `-` for "continue
//! current token", `~` for "not applicable in this state". Pattern strings
//! are grouped by leading byte in ascending order; within a group the
//! declared order is the match precedence (the compiler puts longer
//! patterns first). A zero-length pattern closes a group and acts as that
//! byte's default. The pool ends with one or more zero-length wildcard
//! patterns that match any remaining byte. A trailing `?` flags a
//! lookahead pattern and is stripped here at load time.

use crate::action::{Action, ActionKind, StateId};
use crate::error::TableError;
use quill_tag::TokenClass;

/// Patterns this far outside printable ASCII make no sense in a table;
/// whitespace and newlines are handled by the scanner itself.
fn printable(byte: u8) -> bool {
    (0x21..=0x7E).contains(&byte)
}

#[derive(Clone, Debug)]
struct Pattern {
    /// Literal bytes, lookahead marker stripped. Empty for defaults and
    /// wildcards.
    bytes: Vec<u8>,
    /// Matches only without consuming input; the scanner re-reads the
    /// bytes in the target state.
    lookahead: bool,
}

/// The result of a pattern search: how many bytes to consume (zero for a
/// lookahead match) and the action to apply.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Matched {
    pub len: usize,
    pub lookahead: bool,
    pub action: Action,
}

/// A validated, immutable transition table.
///
/// Construction via [`Table::from_bytes`] performs all integrity checks;
/// a constructed table guarantees [`Table::find`] a match for every
/// `(state, byte)` the scanner can reach.
#[derive(Clone, Debug)]
pub struct Table {
    states: Vec<String>,
    patterns: Vec<Pattern>,
    /// For each ASCII leading byte, the index range of its pattern group.
    groups: Vec<(u16, u16)>,
    /// Trailing zero-length wildcard patterns.
    wildcards: (u16, u16),
    /// Row-major `states x patterns` action matrix.
    actions: Vec<Action>,
}

fn read_u16(data: &[u8], at: usize) -> Result<u16, TableError> {
    let bytes: [u8; 2] = data
        .get(at..at + 2)
        .and_then(|s| s.try_into().ok())
        .ok_or(TableError::Truncated {
            needed: at + 2,
            found: data.len(),
        })?;
    Ok(u16::from_be_bytes(bytes))
}

/// Read one NUL-terminated string, returning it and the rest of the pool.
fn read_cstr(pool: &[u8]) -> Result<(&[u8], &[u8]), TableError> {
    let end = pool
        .iter()
        .position(|&b| b == 0)
        .ok_or(TableError::BadStringPool)?;
    Ok((&pool[..end], &pool[end + 1..]))
}

impl Table {
    /// Read and validate a compiled table.
    pub fn from_bytes(data: &[u8]) -> Result<Table, TableError> {
        let state_count = read_u16(data, 0)? as usize;
        let pattern_count = read_u16(data, 2)? as usize;
        if state_count == 0 || state_count > 256 {
            return Err(TableError::BadStateCount(state_count));
        }
        if pattern_count == 0 || pattern_count > 4096 {
            return Err(TableError::BadPatternCount(pattern_count));
        }

        let matrix_len = state_count * pattern_count * 2;
        let pool_start = 4 + matrix_len;
        if data.len() < pool_start {
            return Err(TableError::Truncated {
                needed: pool_start,
                found: data.len(),
            });
        }

        let mut pool = &data[pool_start..];
        let mut states = Vec::with_capacity(state_count);
        for _ in 0..state_count {
            let (name, rest) = read_cstr(pool)?;
            let name = std::str::from_utf8(name)
                .map_err(|_| TableError::BadStringPool)?
                .to_owned();
            states.push(name);
            pool = rest;
        }
        let mut patterns = Vec::with_capacity(pattern_count);
        for _ in 0..pattern_count {
            let (raw, rest) = read_cstr(pool)?;
            patterns.push(parse_pattern(raw)?);
            pool = rest;
        }
        if !pool.is_empty() {
            return Err(TableError::TrailingBytes);
        }

        let (groups, wildcards) = group_patterns(&patterns)?;

        let mut actions = Vec::with_capacity(state_count * pattern_count);
        for state in 0..state_count {
            for pattern in 0..pattern_count {
                let cell = 4 + (state * pattern_count + pattern) * 2;
                let kind = ActionKind::from_byte(data[cell]).ok_or(TableError::UnknownAction {
                    state,
                    pattern,
                    byte: data[cell],
                })?;
                let target = data[cell + 1] as usize;
                if kind != ActionKind::Skip && target >= state_count {
                    return Err(TableError::BadTarget {
                        state,
                        pattern,
                        target,
                    });
                }
                actions.push(Action {
                    kind,
                    target: target as StateId,
                });
            }
        }

        let table = Table {
            states,
            patterns,
            groups,
            wildcards,
            actions,
        };
        table.validate()?;
        Ok(table)
    }

    /// Completeness checks: every state must have a consuming fallback for
    /// every byte, and lookahead entries must classify.
    fn validate(&self) -> Result<(), TableError> {
        for state in 0..self.states.len() {
            for (p, pattern) in self.patterns.iter().enumerate() {
                let action = self.action(state as StateId, p);
                if action.kind == ActionKind::Skip {
                    continue;
                }
                if pattern.lookahead && action.kind == ActionKind::More {
                    return Err(TableError::LookaheadContinues(
                        String::from_utf8_lossy(&pattern.bytes).into_owned(),
                    ));
                }
            }
            // Bytes with a group fall back through the group's certain
            // matches to the wildcards; everything else needs a consuming
            // wildcard directly. 0x80 stands in for all non-ASCII leads.
            for byte in (0x21..=0x7Eu8).chain([0x80]) {
                if !self.has_consuming_fallback(state as StateId, byte) {
                    return Err(TableError::MissingFallback { state, byte });
                }
            }
        }
        Ok(())
    }

    fn has_consuming_fallback(&self, state: StateId, byte: u8) -> bool {
        self.search_indices(Some(byte)).any(|p| {
            let pattern = &self.patterns[p];
            let certain = pattern.bytes.is_empty() || pattern.bytes[..] == [byte];
            certain
                && !pattern.lookahead
                && self.action(state, p).kind != ActionKind::Skip
        })
    }

    fn action(&self, state: StateId, pattern: usize) -> Action {
        self.actions[state as usize * self.patterns.len() + pattern]
    }

    /// Pattern indices to try for a given leading byte, in precedence
    /// order: the byte's group, then the trailing wildcards.
    fn search_indices(&self, lead: Option<u8>) -> impl Iterator<Item = usize> + '_ {
        let group = match lead {
            Some(b) if (b as usize) < self.groups.len() => self.groups[b as usize],
            _ => (0, 0),
        };
        (group.0 as usize..group.1 as usize)
            .chain(self.wildcards.0 as usize..self.wildcards.1 as usize)
    }

    /// Find the entry matching `input` in `state`. Total for non-empty
    /// input on a validated table; the `Bad` fallback is a defensive
    /// return for release builds only.
    ///
    /// # Panics
    /// In debug builds, panics if no entry matches; that means the table
    /// validation is wrong, a programmer error rather than a data
    /// condition.
    pub fn find(&self, state: StateId, input: &[u8]) -> Matched {
        debug_assert!(!input.is_empty());
        for p in self.search_indices(input.first().copied()) {
            let pattern = &self.patterns[p];
            let action = self.action(state, p);
            if action.kind == ActionKind::Skip {
                continue;
            }
            if !input.starts_with(&pattern.bytes) {
                continue;
            }
            let len = if pattern.lookahead {
                0
            } else if pattern.bytes.is_empty() {
                1
            } else {
                pattern.bytes.len()
            };
            return Matched {
                len,
                lookahead: pattern.lookahead,
                action,
            };
        }
        debug_assert!(false, "validated table has no match for state {state}");
        Matched {
            len: 1,
            lookahead: false,
            action: Action {
                kind: ActionKind::Class(TokenClass::Bad),
                target: state,
            },
        }
    }

    /// Find a lookahead entry matching `input` in `state`, for closing the
    /// open token at a gap or newline. `input` is the text after the
    /// whitespace run and may be empty at end of line.
    pub fn find_lookahead(&self, state: StateId, input: &[u8]) -> Option<Action> {
        for p in self.search_indices(input.first().copied()) {
            let pattern = &self.patterns[p];
            if !pattern.lookahead {
                continue;
            }
            let action = self.action(state, p);
            if action.kind == ActionKind::Skip {
                continue;
            }
            if input.starts_with(&pattern.bytes) {
                return Some(action);
            }
        }
        None
    }

    /// The state's wildcard classification, used as the fallback when a
    /// gap or newline closes a token and no lookahead entry matched.
    pub fn wildcard_action(&self, state: StateId) -> Action {
        for p in self.wildcards.0 as usize..self.wildcards.1 as usize {
            if self.patterns[p].lookahead {
                continue;
            }
            let action = self.action(state, p);
            if action.kind != ActionKind::Skip {
                return action;
            }
        }
        // Validation guarantees a consuming wildcard per state.
        Action {
            kind: ActionKind::Class(TokenClass::Bad),
            target: state,
        }
    }

    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }

    pub fn state_name(&self, state: StateId) -> &str {
        &self.states[state as usize]
    }

    /// Look up a state index by name. Test and tooling convenience.
    pub fn state_named(&self, name: &str) -> Option<StateId> {
        self.states
            .iter()
            .position(|s| s == name)
            .map(|i| i as StateId)
    }
}

fn parse_pattern(raw: &[u8]) -> Result<Pattern, TableError> {
    let (bytes, lookahead) = match raw.split_last() {
        Some((b'?', rest)) => (rest, true),
        _ => (raw, false),
    };
    if !bytes.iter().all(|&b| printable(b)) {
        return Err(TableError::BadPatternByte(
            String::from_utf8_lossy(raw).into_owned(),
        ));
    }
    Ok(Pattern {
        bytes: bytes.to_vec(),
        lookahead,
    })
}

/// Build the per-leading-byte group ranges and locate the trailing
/// wildcard run, checking the pool ordering invariants.
fn group_patterns(patterns: &[Pattern]) -> Result<(Vec<(u16, u16)>, (u16, u16)), TableError> {
    // The wildcard run: trailing zero-length patterns, at least one of
    // which must be consuming (non-lookahead).
    let mut wildcard_start = patterns.len();
    while wildcard_start > 0 && patterns[wildcard_start - 1].bytes.is_empty() {
        wildcard_start -= 1;
    }
    if wildcard_start == patterns.len()
        || patterns[wildcard_start..].iter().all(|p| p.lookahead)
    {
        return Err(TableError::MissingWildcard);
    }

    let mut groups = vec![(0u16, 0u16); 128];
    let mut current: Option<u8> = None;
    let mut last_lead: Option<u8> = None;
    let mut group_start = 0usize;
    let mut close = |lead: Option<u8>, start: usize, end: usize| {
        if let Some(b) = lead {
            groups[b as usize] = (start as u16, end as u16);
        }
    };
    for (i, pattern) in patterns[..wildcard_start].iter().enumerate() {
        let shown = || String::from_utf8_lossy(&pattern.bytes).into_owned();
        match pattern.bytes.first().copied() {
            None => {
                // Group default: closes the current group, which must exist.
                if current.is_none() {
                    return Err(TableError::PatternOrder(shown()));
                }
                close(current, group_start, i + 1);
                current = None;
            }
            Some(lead) => {
                if current == Some(lead) {
                    // continuing the current group
                } else {
                    if last_lead.is_some_and(|prev| lead <= prev) {
                        return Err(TableError::PatternOrder(shown()));
                    }
                    close(current, group_start, i);
                    current = Some(lead);
                    last_lead = Some(lead);
                    group_start = i;
                }
                // Duplicate (bytes, lookahead) pairs within a group.
                if patterns[group_start..i].iter().any(|q| {
                    q.bytes == pattern.bytes && q.lookahead == pattern.lookahead
                }) {
                    return Err(TableError::DuplicatePattern(shown()));
                }
            }
        }
    }
    close(current, group_start, wildcard_start);

    Ok((groups, (wildcard_start as u16, patterns.len() as u16)))
}
