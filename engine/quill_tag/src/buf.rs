//! Growable per-byte tag array, kept in lock-step with the text buffer.
//!
//! One packed tag byte per text byte. The buffer itself knows nothing of
//! lines or tokens beyond the continuation convention: the head byte of a
//! token is the nearest preceding tag whose class is not a continuation
//! class, which is what makes backward head search well-defined.

use crate::{Override, Tag, TokenClass};

/// Per-byte tag storage.
///
/// Any insertion or deletion of text must be accompanied, in the same
/// logical transaction, by an equal-length [`splice`](TagBuf::splice) here,
/// followed by a rescan of the affected region. Spliced-in bytes hold a
/// `Bad` placeholder until the scanner rewrites them.
#[derive(Clone, Debug, Default)]
pub struct TagBuf {
    bytes: Vec<u8>,
}

impl TagBuf {
    pub fn new() -> TagBuf {
        TagBuf::default()
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// The tag at `offset`.
    ///
    /// # Panics
    /// Panics if `offset` is out of range, like slice indexing.
    pub fn get(&self, offset: usize) -> Tag {
        Tag::unpack(self.bytes[offset])
    }

    /// Overwrite the tag at `offset` with a fresh, override-free tag.
    pub fn write(&mut self, offset: usize, class: TokenClass) {
        self.bytes[offset] = Tag::new(class).pack();
    }

    /// Replace the base classification at `offset`, keeping the override.
    pub fn reclassify(&mut self, offset: usize, class: TokenClass) {
        let over = self.get(offset).over;
        self.bytes[offset] = Tag { class, over }.pack();
    }

    /// Apply an override to the tag at `offset`.
    ///
    /// Structural tags (gap, newline, continuations) are left untouched:
    /// they carry no user-visible classification to override.
    pub fn set_override(&mut self, offset: usize, over: Override) {
        let tag = self.get(offset);
        if !tag.can_override() {
            return;
        }
        self.bytes[offset] = Tag {
            class: tag.class,
            over,
        }
        .pack();
    }

    /// Remove any override from the tags in `range`.
    pub fn clear_overrides(&mut self, range: std::ops::Range<usize>) {
        for offset in range {
            let tag = self.get(offset);
            if tag.over != Override::None {
                self.bytes[offset] = Tag::new(tag.class).pack();
            }
        }
    }

    /// Mirror a text edit: delete `deleted` tag bytes at `offset` and
    /// insert `inserted` placeholder bytes in their place.
    pub fn splice(&mut self, offset: usize, deleted: usize, inserted: usize) {
        let placeholder = Tag::new(TokenClass::Bad).pack();
        self.bytes.splice(
            offset..offset + deleted,
            std::iter::repeat(placeholder).take(inserted),
        );
    }

    /// The head byte of the token containing `offset`: the nearest tag at
    /// or before `offset` whose class is not a continuation class.
    pub fn head_of(&self, offset: usize) -> usize {
        let mut at = offset;
        while at > 0 && self.get(at).class.is_continuation() {
            at -= 1;
        }
        at
    }

    /// The next token boundary strictly after `offset`: the first index
    /// whose tag is not a token continuation, clamped to `len()`.
    pub fn next_token_boundary(&self, offset: usize) -> usize {
        let mut at = offset + 1;
        while at < self.len() && self.get(at).class == TokenClass::More {
            at += 1;
        }
        at
    }

    /// The next grapheme boundary strictly after `offset`: the first index
    /// whose tag is not a UTF-8 continuation, clamped to `len()`.
    pub fn next_grapheme_boundary(&self, offset: usize) -> usize {
        let mut at = offset + 1;
        while at < self.len() && self.get(at).class == TokenClass::Joint {
            at += 1;
        }
        at
    }

    /// Iterate the non-continuation tags in `range` as `(offset, tag)`.
    /// This is the token stream the matcher consumes: every head tag plus
    /// the structural gap and newline tags.
    pub fn heads(
        &self,
        range: std::ops::Range<usize>,
    ) -> impl Iterator<Item = (usize, Tag)> + '_ {
        range.filter_map(move |offset| {
            let tag = self.get(offset);
            (!tag.class.is_continuation()).then_some((offset, tag))
        })
    }

    /// Render the base classes of `range` as a string of short names.
    /// Test harness convenience, matching the line / expected-tag-string
    /// regression style.
    pub fn glyphs(&self, range: std::ops::Range<usize>) -> String {
        range
            .map(|offset| self.get(offset).class.short_name() as char)
            .collect()
    }
}
