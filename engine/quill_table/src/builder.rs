//! Programmatic table construction and the binary writer.
//!
//! The builder is the writer half of the table format: rules are declared
//! against named states, then serialized to the same binary layout the
//! reader consumes. `build()` goes the whole way round, so every built
//! table has passed the reader's integrity validation.
//!
//! Rule declaration order is significant exactly as in the format: within
//! one leading-byte group longer patterns always win, and the first
//! declared rule wins a cell that two rules both claim.

use crate::action::{Action, ActionKind, StateId};
use crate::error::TableError;
use crate::table::Table;
use quill_tag::TokenClass;

impl From<TokenClass> for ActionKind {
    fn from(class: TokenClass) -> ActionKind {
        ActionKind::Class(class)
    }
}

#[derive(Clone, Debug)]
struct Rule {
    state: StateId,
    bytes: Vec<u8>,
    lookahead: bool,
    kind: ActionKind,
    target: StateId,
}

/// Builds a transition table rule by rule.
#[derive(Clone, Debug, Default)]
pub struct TableBuilder {
    states: Vec<String>,
    rules: Vec<Rule>,
}

impl TableBuilder {
    pub fn new() -> TableBuilder {
        TableBuilder::default()
    }

    /// Find or add a named state. The first state added is the start
    /// state.
    ///
    /// # Panics
    /// Panics past 256 states; the format's target byte cannot name more.
    pub fn state(&mut self, name: &str) -> StateId {
        if let Some(i) = self.states.iter().position(|s| s == name) {
            return i as StateId;
        }
        assert!(self.states.len() < 256, "too many states for the table format");
        self.states.push(name.to_owned());
        (self.states.len() - 1) as StateId
    }

    /// Pattern that continues the current token.
    pub fn more(&mut self, state: StateId, pattern: &[u8], target: StateId) -> &mut Self {
        self.rule(state, pattern, false, ActionKind::More, target)
    }

    /// Pattern that closes the current token with `class`.
    pub fn classify(
        &mut self,
        state: StateId,
        pattern: &[u8],
        class: TokenClass,
        target: StateId,
    ) -> &mut Self {
        self.rule(state, pattern, false, ActionKind::Class(class), target)
    }

    /// Lookahead pattern: matches without consuming, closing the open
    /// token; the pattern bytes are re-scanned in the target state.
    pub fn look(
        &mut self,
        state: StateId,
        pattern: &[u8],
        kind: impl Into<ActionKind>,
        target: StateId,
    ) -> &mut Self {
        self.rule(state, pattern, true, kind.into(), target)
    }

    /// Lookahead wildcard: closes the open token with `class` on any
    /// input at all, including end of line. The usual way a token-
    /// accumulating state hands back to the start state.
    pub fn close_with(
        &mut self,
        state: StateId,
        class: TokenClass,
        target: StateId,
    ) -> &mut Self {
        self.rule(state, b"", true, ActionKind::Class(class), target)
    }

    /// Consuming wildcard: the default action for any byte no other
    /// pattern claims. Every state needs one.
    pub fn wildcard(
        &mut self,
        state: StateId,
        kind: impl Into<ActionKind>,
        target: StateId,
    ) -> &mut Self {
        self.rule(state, b"", false, kind.into(), target)
    }

    fn rule(
        &mut self,
        state: StateId,
        pattern: &[u8],
        lookahead: bool,
        kind: ActionKind,
        target: StateId,
    ) -> &mut Self {
        self.rules.push(Rule {
            state,
            bytes: pattern.to_vec(),
            lookahead,
            kind,
            target,
        });
        self
    }

    /// Serialize to the binary table format.
    pub fn to_bytes(&self) -> Result<Vec<u8>, TableError> {
        if self.states.is_empty() {
            return Err(TableError::BadStateCount(0));
        }
        let patterns = self.sorted_patterns();
        if patterns.len() > 4096 {
            return Err(TableError::BadPatternCount(patterns.len()));
        }

        // Dense matrix, Skip everywhere a rule doesn't claim a cell;
        // first declared rule wins.
        let width = patterns.len();
        let mut cells = vec![
            Action {
                kind: ActionKind::Skip,
                target: 0
            };
            self.states.len() * width
        ];
        for rule in &self.rules {
            let column = patterns
                .iter()
                .position(|(b, l)| **b == rule.bytes && *l == rule.lookahead)
                .unwrap_or(0);
            let cell = &mut cells[rule.state as usize * width + column];
            if cell.kind == ActionKind::Skip {
                *cell = Action {
                    kind: rule.kind,
                    target: rule.target,
                };
            }
        }

        let mut bytes = Vec::new();
        bytes.extend_from_slice(&(self.states.len() as u16).to_be_bytes());
        bytes.extend_from_slice(&(patterns.len() as u16).to_be_bytes());
        for cell in &cells {
            bytes.push(cell.kind.to_byte());
            bytes.push(cell.target);
        }
        for name in &self.states {
            bytes.extend_from_slice(name.as_bytes());
            bytes.push(0);
        }
        for (pattern, lookahead) in &patterns {
            bytes.extend_from_slice(pattern);
            if *lookahead {
                bytes.push(b'?');
            }
            bytes.push(0);
        }
        Ok(bytes)
    }

    /// Serialize and reload, so the result carries the reader's
    /// validation guarantees.
    pub fn build(&self) -> Result<Table, TableError> {
        Table::from_bytes(&self.to_bytes()?)
    }

    /// Unique patterns in pool order: ascending leading byte, longer
    /// patterns before their prefixes within a group, lookahead variants
    /// before consuming ones, wildcards last. A consuming wildcard is
    /// always emitted so the pool is well formed even for rule sets that
    /// forgot one (validation then reports the skip-only state).
    fn sorted_patterns(&self) -> Vec<(&Vec<u8>, bool)> {
        let mut patterns: Vec<(&Vec<u8>, bool)> = Vec::new();
        for rule in &self.rules {
            if !patterns
                .iter()
                .any(|(b, l)| **b == rule.bytes && *l == rule.lookahead)
            {
                patterns.push((&rule.bytes, rule.lookahead));
            }
        }
        static EMPTY: Vec<u8> = Vec::new();
        if !patterns.iter().any(|(b, l)| b.is_empty() && !*l) {
            patterns.push((&EMPTY, false));
        }
        patterns.sort_by(|(a, al), (b, bl)| {
            use std::cmp::Ordering;
            match (a.is_empty(), b.is_empty()) {
                // Wildcards sort last, lookahead wildcard first among them.
                (true, true) => bl.cmp(al),
                (true, false) => Ordering::Greater,
                (false, true) => Ordering::Less,
                (false, false) => pattern_order(a, b).then(bl.cmp(al)),
            }
        });
        patterns
    }
}

/// Byte order except that a pattern sorts before its own prefixes, so
/// longest-match-first falls out of a plain linear search.
fn pattern_order(a: &[u8], b: &[u8]) -> std::cmp::Ordering {
    use std::cmp::Ordering;
    match a.cmp(b) {
        Ordering::Less if b.starts_with(a) => Ordering::Greater,
        Ordering::Greater if a.starts_with(b) => Ordering::Less,
        other => other,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn pattern_order_prefers_longer_prefixes() {
        use std::cmp::Ordering;
        assert_eq!(pattern_order(b"==", b"="), Ordering::Less);
        assert_eq!(pattern_order(b"=", b"=="), Ordering::Greater);
        assert_eq!(pattern_order(b"ab", b"ac"), Ordering::Less);
        assert_eq!(pattern_order(b"a", b"b"), Ordering::Less);
    }

    #[test]
    fn builder_emits_sorted_pool() {
        let mut b = TableBuilder::new();
        let start = b.state("start");
        b.classify(start, b"=", TokenClass::Sign, start);
        b.classify(start, b"==", TokenClass::Operator, start);
        b.classify(start, b"<", TokenClass::Sign, start);
        b.wildcard(start, TokenClass::Bad, start);
        let bytes = b.to_bytes().unwrap();
        // Pool tail: "<", "==", "=", "" in that order.
        let pool = &bytes[bytes.len() - "start\0<\0==\0=\0\0".len()..];
        assert_eq!(pool, b"start\0<\0==\0=\0\0");
    }

    #[test]
    fn first_declared_rule_wins_a_cell() {
        let mut b = TableBuilder::new();
        let start = b.state("start");
        b.classify(start, b"+", TokenClass::Operator, start);
        b.classify(start, b"+", TokenClass::Sign, start);
        b.wildcard(start, TokenClass::Bad, start);
        let table = b.build().unwrap();
        let m = table.find(0, b"+");
        assert_eq!(m.action.kind, ActionKind::Class(TokenClass::Operator));
    }

    #[test]
    fn duplicate_state_names_reuse_the_index() {
        let mut b = TableBuilder::new();
        let one = b.state("start");
        let two = b.state("start");
        assert_eq!(one, two);
        assert_eq!(b.state("other"), 1);
    }

    #[test]
    fn missing_wildcard_rule_still_serializes() {
        let mut b = TableBuilder::new();
        let start = b.state("start");
        b.classify(start, b"x", TokenClass::Ident, start);
        // No wildcard rule: the pool gets one anyway, and validation
        // reports the skip-only fallback.
        assert!(matches!(
            b.build(),
            Err(TableError::MissingFallback { state: 0, .. })
        ));
    }
}
