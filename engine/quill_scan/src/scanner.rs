//! Line scanning.

use quill_table::{ActionKind, StateId, Table, START_STATE};
use quill_tag::{TagBuf, TokenClass};

/// How many continuation bytes follow a UTF-8 lead byte.
fn continuation_count(lead: u8) -> usize {
    match lead {
        0xC2..=0xDF => 1,
        0xE0..=0xEF => 2,
        0xF0..=0xF4 => 3,
        _ => 0,
    }
}

/// A byte that cannot start a UTF-8 sequence: a stray continuation byte
/// or a lead the encoding never produces.
fn is_stray(byte: u8) -> bool {
    (0x80..=0xC1).contains(&byte) || byte >= 0xF5
}

fn is_gap(byte: u8) -> bool {
    byte == b' ' || byte == b'\t'
}

/// Drives one validated table over lines of text.
#[derive(Clone, Copy, Debug)]
pub struct Scanner<'t> {
    table: &'t Table,
}

impl<'t> Scanner<'t> {
    pub fn new(table: &'t Table) -> Scanner<'t> {
        Scanner { table }
    }

    pub fn table(&self) -> &'t Table {
        self.table
    }

    /// Scan one line, entering in `state`, writing one tag per line byte
    /// into `tags` starting at `base`. `line` includes its trailing
    /// newline byte when it has one; the final line of a text may not.
    /// Returns the state carried into the next line.
    pub fn scan_line(
        &self,
        state: StateId,
        line: &[u8],
        tags: &mut TagBuf,
        base: usize,
    ) -> StateId {
        let mut state = state;
        // Start of the open token; head == i means no token is open.
        let mut head = 0usize;
        let mut i = 0usize;
        // Consecutive steps that consumed nothing, bounded by the state
        // count: more means the table loops through lookahead entries.
        let mut stalled = 0usize;

        while i < line.len() {
            let byte = line[i];

            if byte == b'\n' {
                if head < i {
                    state = self.close_open(state, head, b"", tags, base);
                }
                tags.write(base + i, TokenClass::Newline);
                i += 1;
                head = i;
                continue;
            }

            if is_gap(byte) {
                let mut end = i;
                while end < line.len() && is_gap(line[end]) {
                    end += 1;
                }
                if head < i {
                    state = self.close_open(state, head, &line[end..], tags, base);
                }
                for at in i..end {
                    tags.write(base + at, TokenClass::Gap);
                }
                i = end;
                head = i;
                continue;
            }

            if is_stray(byte) {
                if head < i {
                    state = self.close_open(state, head, b"", tags, base);
                }
                tags.write(base + i, TokenClass::Bad);
                i += 1;
                head = i;
                continue;
            }

            let found = self.table.find(state, &line[i..]);

            if found.lookahead {
                stalled += 1;
                if stalled > self.table.state_count() {
                    // A lookahead cycle is a bug in the table, not a
                    // condition scanning can meet in valid input.
                    debug_assert!(
                        false,
                        "lookahead cycle in state {} at byte {byte:#04x}",
                        self.table.state_name(state)
                    );
                    tags.write(base + i, TokenClass::Bad);
                    i += 1;
                    head = i;
                    state = START_STATE;
                    stalled = 0;
                    continue;
                }
                // Lookahead entries always classify; the open token (if
                // any) closes here and the byte is re-read in the target.
                if let ActionKind::Class(class) = found.action.kind {
                    if head < i {
                        tags.write(base + head, class);
                    }
                }
                state = found.action.target;
                head = i;
                continue;
            }
            stalled = 0;

            let mut end = i + found.len;
            for at in i..end {
                tags.write(base + at, TokenClass::More);
            }
            // A consumed UTF-8 lead brings its continuation bytes along.
            let mut trailing = continuation_count(byte);
            while trailing > 0 && end < line.len() && (0x80..0xC0).contains(&line[end]) {
                tags.write(base + end, TokenClass::Joint);
                end += 1;
                trailing -= 1;
            }

            if let ActionKind::Class(class) = found.action.kind {
                tags.write(base + head, class);
                head = end;
            }
            state = found.action.target;
            i = end;
        }

        // A line without a newline still closes its open token.
        if head < line.len() {
            state = self.close_open(state, head, b"", tags, base);
        }
        state
    }

    /// Classify the token opened at `head` when a gap, newline or end of
    /// input interrupts it. `rest` is the text after the interruption, so
    /// a lookahead entry can classify by what follows the gap; with no
    /// lookahead match the state's own wildcard classification applies.
    fn close_open(
        &self,
        state: StateId,
        head: usize,
        rest: &[u8],
        tags: &mut TagBuf,
        base: usize,
    ) -> StateId {
        if let Some(action) = self.table.find_lookahead(state, rest) {
            if let ActionKind::Class(class) = action.kind {
                tags.write(base + head, class);
            }
            return action.target;
        }
        let action = self.table.wildcard_action(state);
        if let ActionKind::Class(class) = action.kind {
            tags.write(base + head, class);
            return action.target;
        }
        // The state only ever continues tokens; an interrupted one has no
        // class of its own.
        tags.write(base + head, TokenClass::Bad);
        START_STATE
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use quill_table::TableBuilder;

    /// Letters accumulate into identifier tokens; an identifier directly
    /// before `(` is a function name; `(` and `)` are brackets, `//`
    /// starts a one-line comment marker, everything else is a sign.
    fn demo_table() -> Table {
        let mut b = TableBuilder::new();
        let start = b.state("start");
        let word = b.state("word");
        for ch in b'a'..=b'z' {
            b.more(start, &[ch], word);
            b.more(word, &[ch], word);
        }
        b.classify(start, b"(", TokenClass::Round, start);
        b.classify(start, b")", TokenClass::RoundEnd, start);
        b.classify(start, b"//", TokenClass::Note, start);
        b.look(word, b"(", TokenClass::Function, start);
        b.close_with(word, TokenClass::Ident, start);
        b.wildcard(start, TokenClass::Sign, start);
        b.wildcard(word, TokenClass::Sign, start);
        b.build().unwrap()
    }

    fn scan(line: &[u8]) -> (String, StateId) {
        let table = demo_table();
        let scanner = Scanner::new(&table);
        let mut tags = TagBuf::new();
        tags.splice(0, 0, line.len());
        let state = scanner.scan_line(START_STATE, line, &mut tags, 0);
        (tags.glyphs(0..line.len()), state)
    }

    #[test]
    fn words_gaps_and_signs() {
        let (glyphs, state) = scan(b"ab cd;\n");
        assert_eq!(glyphs, "I-_I-Z.");
        assert_eq!(state, START_STATE);
    }

    #[test]
    fn lookahead_classifies_by_what_follows() {
        let (glyphs, _) = scan(b"foo(\n");
        assert_eq!(glyphs, "F--R.");
        let (glyphs, _) = scan(b"foo;\n");
        assert_eq!(glyphs, "I--Z.");
    }

    #[test]
    fn lookahead_applies_across_a_gap() {
        // The classification of a token interrupted by whitespace still
        // depends on the first thing after the whitespace.
        let (glyphs, _) = scan(b"foo (\n");
        assert_eq!(glyphs, "F--_R.");
        let (glyphs, _) = scan(b"foo ;\n");
        assert_eq!(glyphs, "I--_Z.");
    }

    #[test]
    fn comment_marker_is_one_token() {
        let (glyphs, _) = scan(b"// x\n");
        assert_eq!(glyphs, "N-_I.");
    }

    #[test]
    fn end_of_input_closes_the_open_token() {
        let (glyphs, state) = scan(b"ab");
        assert_eq!(glyphs, "I-");
        assert_eq!(state, START_STATE);
    }

    #[test]
    fn multibyte_sequences_get_joint_tags() {
        // "é" is 0xC3 0xA9; the lead goes through the wildcard, the
        // continuation byte is glued on.
        let (glyphs, _) = scan(&[0xC3, 0xA9, b'\n']);
        assert_eq!(glyphs, "Z+.");
    }

    #[test]
    fn stray_bytes_become_bad_tokens() {
        let (glyphs, _) = scan(&[b'a', 0x80, b'\n']);
        assert_eq!(glyphs, "IB.");
        let (glyphs, _) = scan(&[0xFF, b'\n']);
        assert_eq!(glyphs, "B.");
    }

    #[test]
    fn state_carries_across_lines() {
        let table = demo_table();
        let scanner = Scanner::new(&table);
        let mut tags = TagBuf::new();
        let text = b"ab\ncd\n";
        tags.splice(0, 0, text.len());
        let mid = scanner.scan_line(START_STATE, &text[..3], &mut tags, 0);
        let end = scanner.scan_line(mid, &text[3..], &mut tags, 3);
        assert_eq!(tags.glyphs(0..text.len()), "I-.I-.");
        assert_eq!(end, START_STATE);
    }

    proptest! {
        /// Scanning writes a real tag over every byte of the line: the
        /// Handle sentinel (which this table never produces) must be gone.
        #[test]
        fn scanning_is_total(line in "[ -~]{0,60}") {
            let table = demo_table();
            let scanner = Scanner::new(&table);
            let mut tags = TagBuf::new();
            tags.splice(0, 0, line.len());
            for i in 0..line.len() {
                tags.write(i, TokenClass::Handle);
            }
            let state = scanner.scan_line(START_STATE, line.as_bytes(), &mut tags, 0);
            prop_assert!(!tags.glyphs(0..line.len()).contains('H'));
            prop_assert!((state as usize) < table.state_count());
        }

        /// A trailing newline changes nothing about how the bytes before
        /// it are tagged, nor the carried state: end of input and end of
        /// line close tokens identically.
        #[test]
        fn newline_matches_end_of_input(line in "[ -~]{0,60}") {
            let table = demo_table();
            let scanner = Scanner::new(&table);

            let mut bare = TagBuf::new();
            bare.splice(0, 0, line.len());
            let bare_state = scanner.scan_line(START_STATE, line.as_bytes(), &mut bare, 0);

            let ended = format!("{line}\n");
            let mut full = TagBuf::new();
            full.splice(0, 0, ended.len());
            let full_state = scanner.scan_line(START_STATE, ended.as_bytes(), &mut full, 0);

            prop_assert_eq!(bare.glyphs(0..line.len()), full.glyphs(0..line.len()));
            prop_assert_eq!(bare_state, full_state);
        }
    }
}
