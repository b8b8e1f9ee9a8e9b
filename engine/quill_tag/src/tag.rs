//! A tag: base classification plus at most one override.
//!
//! The public contract is the `(class, override)` pair. The packed
//! one-byte encoding (low six bits class, top two bits override) exists
//! purely as a storage optimisation inside [`TagBuf`](crate::TagBuf) and
//! is reachable only through [`Tag::pack`] and [`Tag::unpack`].

use crate::TokenClass;

/// Override status layered on top of a base classification.
///
/// Mismatched delimiters and the interiors of comments and quotes are an
/// expected data condition, never an error: they are represented here and
/// surfaced through highlighting.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(u8)]
pub enum Override {
    #[default]
    None = 0,
    /// Token sits between quote delimiters.
    Quoted = 1,
    /// Token sits between comment delimiters.
    Commented = 2,
    /// Bracket or delimiter paired with an incompatible partner.
    Mismatched = 3,
}

/// One byte of per-source-byte metadata.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tag {
    pub class: TokenClass,
    pub over: Override,
}

impl Tag {
    /// A plain tag with no override.
    pub fn new(class: TokenClass) -> Tag {
        Tag {
            class,
            over: Override::None,
        }
    }

    /// Pack into the one-byte storage form.
    pub fn pack(self) -> u8 {
        debug_assert!((self.class as u8) < 64);
        ((self.over as u8) << 6) | (self.class as u8)
    }

    /// Unpack from the one-byte storage form.
    pub fn unpack(byte: u8) -> Tag {
        let over = match byte >> 6 {
            1 => Override::Quoted,
            2 => Override::Commented,
            3 => Override::Mismatched,
            _ => Override::None,
        };
        Tag {
            class: TokenClass::from_discriminant(byte & 0x3F),
            over,
        }
    }

    /// Structural tags (gaps, newlines, continuations) never take an
    /// override; everything else can.
    pub fn can_override(self) -> bool {
        !self.class.is_structural()
    }
}
