//! Property-based tests for the highlighter.
//!
//! These use proptest to generate synthetic inputs and verify:
//! 1. Involution: for balanced bracket text, `matching_position` is its
//!    own inverse and every bracket reports matched.
//! 2. Incremental equivalence: applying a random single-byte edit gives
//!    exactly the tags a from-scratch load of the edited text gives.

#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]

use proptest::prelude::*;
use quill_table::{Table, TableBuilder};
use quill_tag::TokenClass;
use quill_text::{Edit, Highlighter};

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
    b.classify(start, b"[", TokenClass::Square, start);
    b.classify(start, b"]", TokenClass::SquareEnd, start);
    b.classify(start, b"{", TokenClass::Curly, start);
    b.classify(start, b"}", TokenClass::CurlyEnd, start);
    b.classify(start, b"\"", TokenClass::Double, start);
    b.classify(start, b"//", TokenClass::Note, start);
    b.classify(start, b"/*", TokenClass::CommentOpen, start);
    b.classify(start, b"*/", TokenClass::CommentClose, start);
    b.close_with(word, TokenClass::Ident, start);
    b.wildcard(start, TokenClass::Sign, start);
    b.wildcard(word, TokenClass::Sign, start);
    b.build().unwrap()
}

/// Generate well-nested bracket text with identifier and gap filler.
fn balanced_strategy() -> impl Strategy<Value = String> {
    let leaf = prop::string::string_regex("[a-z ]{0,6}").expect("valid regex");
    leaf.prop_recursive(5, 48, 4, |inner| {
        prop_oneof![
            (inner.clone(), inner.clone()).prop_map(|(a, b)| format!("{a}{b}")),
            inner.clone().prop_map(|s| format!("({s})")),
            inner.clone().prop_map(|s| format!("[{s}]")),
            inner.prop_map(|s| format!("{{{s}}}")),
        ]
    })
}

fn loaded(text: &[u8]) -> Highlighter {
    let mut hl = Highlighter::new(demo_table());
    hl.load(&text);
    hl
}

fn is_bracket(byte: u8) -> bool {
    matches!(byte, b'(' | b')' | b'[' | b']' | b'{' | b'}')
}

proptest! {
    #[test]
    fn matching_position_is_an_involution(body in balanced_strategy()) {
        let text = format!("{body}\n");
        let hl = loaded(text.as_bytes());
        for (at, &byte) in text.as_bytes().iter().enumerate() {
            if !is_bracket(byte) {
                continue;
            }
            prop_assert!(hl.is_matched(at), "bracket at {at} in {text:?}");
            prop_assert!(!hl.is_mismatched(at));
            let partner = hl.matching_position(at);
            prop_assert!(partner.is_some(), "no partner at {at} in {text:?}");
            let partner = partner.unwrap();
            prop_assert_eq!(hl.matching_position(partner), Some(at));
            // Openers pair forward, closers backward.
            if hl.is_opener(at) {
                prop_assert!(partner > at);
            } else {
                prop_assert!(partner < at);
            }
        }
    }

    /// A single-byte replacement anywhere must leave the highlighter in
    /// exactly the state a from-scratch load of the edited text reaches.
    #[test]
    fn incremental_edit_equals_full_reload(
        body in "[a-z(){}\\[\\] \"/*\n]{1,60}",
        at_frac in 0.0f64..1.0,
        replacement in prop::sample::select(&b"x(){} \"\n"[..]),
    ) {
        let mut text = body.into_bytes();
        let at = ((text.len() - 1) as f64 * at_frac) as usize;

        let mut hl = loaded(&text);
        text[at] = replacement;
        hl.apply_edit(
            &text.as_slice(),
            Edit { offset: at, deleted: 1, inserted: 1 },
        );

        let fresh = loaded(&text);
        let len = text.len();
        prop_assert_eq!(hl.tags().glyphs(0..len), fresh.tags().glyphs(0..len));
        for offset in 0..len {
            prop_assert_eq!(
                hl.classification(offset).over,
                fresh.classification(offset).over,
                "override differs at {}", offset
            );
            prop_assert_eq!(
                hl.matching_position(offset),
                fresh.matching_position(offset),
                "partner differs at {}", offset
            );
        }
    }
}
