//! Base classification of a text byte.
//!
//! The set of classes mirrors the token types a transition table can name:
//! bracket and delimiter classes first, then structural classes produced by
//! the scanner itself, then ordinary token classes. Each class has a
//! one-character short name, used both as the action byte in the compiled
//! table format and as the glyph in test tag-strings.

/// Base classification of one text byte.
///
/// Discriminants are stable: the bracket/delimiter classes occupy the low
/// values and the whole enum fits in six bits, which is what allows a
/// [`Tag`](crate::Tag) to pack into a single byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TokenClass {
    /// `(`
    Round = 0,
    /// `)`
    RoundEnd = 1,
    /// `[`
    Square = 2,
    /// `]`
    SquareEnd = 3,
    /// `{`
    Curly = 4,
    /// `}`
    CurlyEnd = 5,
    /// Line comment start, e.g. `//`. Closes implicitly at the newline.
    Note = 6,
    /// Multiline comment open, e.g. `/*`.
    CommentOpen = 7,
    /// Multiline comment close, e.g. `*/`.
    CommentClose = 8,
    /// Single quote delimiter.
    Quote = 9,
    /// Double quote delimiter.
    Double = 10,
    /// Triple quote delimiter (multiline string).
    Triple = 11,

    /// Space or tab.
    Gap = 12,
    /// Newline byte.
    Newline = 13,
    /// Continuation byte of the current token.
    More = 14,
    /// Continuation byte of a UTF-8 sequence (grapheme interior).
    Joint = 15,

    Ident = 16,
    Function = 17,
    Property = 18,
    Keyword = 19,
    Type = 20,
    Value = 21,
    Operator = 22,
    Sign = 23,
    Escape = 24,
    Label = 25,
    Handle = 26,
    /// Invalid or unrecognised input, including malformed UTF-8.
    Bad = 27,
}

/// Whether a class begins a pair, ends one, or can do either.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    /// Begins a pair: brackets, comment openers, line comment markers.
    Opener,
    /// Ends a pair: close brackets, comment closers.
    Closer,
    /// Quote delimiters open a pair and close their own kind.
    Both,
}

/// Binding strength of a bracket or delimiter class.
///
/// Total order used to resolve mismatches: round < square < curly <
/// comment < quote, ascending. An inner, lower-priority construct can
/// never steal a match from an outer, higher-priority one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Priority(pub u8);

impl TokenClass {
    /// All classes, in discriminant order.
    pub const ALL: [TokenClass; 28] = [
        TokenClass::Round,
        TokenClass::RoundEnd,
        TokenClass::Square,
        TokenClass::SquareEnd,
        TokenClass::Curly,
        TokenClass::CurlyEnd,
        TokenClass::Note,
        TokenClass::CommentOpen,
        TokenClass::CommentClose,
        TokenClass::Quote,
        TokenClass::Double,
        TokenClass::Triple,
        TokenClass::Gap,
        TokenClass::Newline,
        TokenClass::More,
        TokenClass::Joint,
        TokenClass::Ident,
        TokenClass::Function,
        TokenClass::Property,
        TokenClass::Keyword,
        TokenClass::Type,
        TokenClass::Value,
        TokenClass::Operator,
        TokenClass::Sign,
        TokenClass::Escape,
        TokenClass::Label,
        TokenClass::Handle,
        TokenClass::Bad,
    ];

    /// One-character short name, used as the action byte in the compiled
    /// table format and as the glyph in test tag-strings.
    pub fn short_name(self) -> u8 {
        match self {
            TokenClass::Round => b'R',
            TokenClass::RoundEnd => b'r',
            TokenClass::Square => b'S',
            TokenClass::SquareEnd => b's',
            TokenClass::Curly => b'C',
            TokenClass::CurlyEnd => b'c',
            TokenClass::Note => b'N',
            TokenClass::CommentOpen => b'X',
            TokenClass::CommentClose => b'x',
            TokenClass::Quote => b'Q',
            TokenClass::Double => b'D',
            TokenClass::Triple => b'T',
            TokenClass::Gap => b'_',
            TokenClass::Newline => b'.',
            TokenClass::More => b'-',
            TokenClass::Joint => b'+',
            TokenClass::Ident => b'I',
            TokenClass::Function => b'F',
            TokenClass::Property => b'P',
            TokenClass::Keyword => b'K',
            TokenClass::Type => b'Y',
            TokenClass::Value => b'V',
            TokenClass::Operator => b'O',
            TokenClass::Sign => b'Z',
            TokenClass::Escape => b'E',
            TokenClass::Label => b'L',
            TokenClass::Handle => b'H',
            TokenClass::Bad => b'B',
        }
    }

    /// Look up the class a table action byte names.
    ///
    /// Only classifying classes are nameable by a table: the structural
    /// classes (`Gap`, `Newline`, `More`, `Joint`) are produced by the
    /// scanner itself and are rejected here, as are the reserved action
    /// bytes (`-` for "continue token", `~` for "not applicable").
    pub fn from_action(byte: u8) -> Option<TokenClass> {
        TokenClass::ALL
            .into_iter()
            .find(|c| !c.is_structural() && c.short_name() == byte)
    }

    /// Classes the scanner emits itself rather than the table naming them.
    pub fn is_structural(self) -> bool {
        matches!(
            self,
            TokenClass::Gap | TokenClass::Newline | TokenClass::More | TokenClass::Joint
        )
    }

    /// Continuation classes: not the head of a token.
    pub fn is_continuation(self) -> bool {
        matches!(self, TokenClass::More | TokenClass::Joint)
    }

    /// Pairing role, or `None` for classes that take no part in matching.
    pub fn role(self) -> Option<Role> {
        match self {
            TokenClass::Round
            | TokenClass::Square
            | TokenClass::Curly
            | TokenClass::Note
            | TokenClass::CommentOpen => Some(Role::Opener),
            TokenClass::RoundEnd
            | TokenClass::SquareEnd
            | TokenClass::CurlyEnd
            | TokenClass::CommentClose => Some(Role::Closer),
            TokenClass::Quote | TokenClass::Double | TokenClass::Triple => Some(Role::Both),
            _ => None,
        }
    }

    /// Binding strength, or `None` for non-bracket classes.
    pub fn priority(self) -> Option<Priority> {
        match self {
            TokenClass::Round | TokenClass::RoundEnd => Some(Priority(0)),
            TokenClass::Square | TokenClass::SquareEnd => Some(Priority(1)),
            TokenClass::Curly | TokenClass::CurlyEnd => Some(Priority(2)),
            TokenClass::Note | TokenClass::CommentOpen | TokenClass::CommentClose => {
                Some(Priority(3))
            }
            TokenClass::Quote | TokenClass::Double | TokenClass::Triple => Some(Priority(4)),
            _ => None,
        }
    }

    /// The class that closes a pair opened by `self`.
    ///
    /// Quotes close their own kind; a line comment is closed by the
    /// newline at the end of its line.
    pub fn partner(self) -> Option<TokenClass> {
        match self {
            TokenClass::Round => Some(TokenClass::RoundEnd),
            TokenClass::Square => Some(TokenClass::SquareEnd),
            TokenClass::Curly => Some(TokenClass::CurlyEnd),
            TokenClass::CommentOpen => Some(TokenClass::CommentClose),
            TokenClass::Quote => Some(TokenClass::Quote),
            TokenClass::Double => Some(TokenClass::Double),
            TokenClass::Triple => Some(TokenClass::Triple),
            TokenClass::Note => Some(TokenClass::Newline),
            _ => None,
        }
    }

    /// Reconstruct a class from its discriminant. Out-of-range values
    /// decode as `Bad` so that a corrupted packed byte still yields a tag.
    pub fn from_discriminant(value: u8) -> TokenClass {
        *TokenClass::ALL
            .get(value as usize)
            .unwrap_or(&TokenClass::Bad)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn class_fits_in_six_bits() {
        for class in TokenClass::ALL {
            assert!((class as u8) < 64, "{class:?}");
        }
        assert_eq!(std::mem::size_of::<TokenClass>(), 1);
    }

    #[test]
    fn short_names_are_unique() {
        let mut seen = [false; 256];
        for class in TokenClass::ALL {
            let b = class.short_name() as usize;
            assert!(!seen[b], "duplicate short name for {class:?}");
            seen[b] = true;
        }
    }

    #[test]
    fn action_bytes_round_trip() {
        for class in TokenClass::ALL {
            let decoded = TokenClass::from_action(class.short_name());
            if class.is_structural() {
                assert_eq!(decoded, None, "{class:?} must not be nameable");
            } else {
                assert_eq!(decoded, Some(class));
            }
        }
    }

    #[test]
    fn reserved_action_bytes_are_not_classes() {
        assert_eq!(TokenClass::from_action(b'~'), None);
        assert_eq!(TokenClass::from_action(b'-'), None);
    }

    #[test]
    fn priority_order_is_ascending() {
        let round = TokenClass::Round.priority();
        let square = TokenClass::Square.priority();
        let curly = TokenClass::Curly.priority();
        let comment = TokenClass::CommentOpen.priority();
        let quote = TokenClass::Quote.priority();
        assert!(round < square && square < curly && curly < comment && comment < quote);
    }

    #[test]
    fn bracket_partners_are_involutive() {
        let pairs = [
            (TokenClass::Round, TokenClass::RoundEnd),
            (TokenClass::Square, TokenClass::SquareEnd),
            (TokenClass::Curly, TokenClass::CurlyEnd),
        ];
        for (open, close) in pairs {
            assert_eq!(open.partner(), Some(close));
            assert_eq!(open.priority(), close.priority());
        }
    }

    #[test]
    fn quotes_are_their_own_partner() {
        for q in [TokenClass::Quote, TokenClass::Double, TokenClass::Triple] {
            assert_eq!(q.partner(), Some(q));
            assert_eq!(q.role(), Some(Role::Both));
        }
    }

    #[test]
    fn note_is_closed_by_newline() {
        assert_eq!(TokenClass::Note.partner(), Some(TokenClass::Newline));
        assert_eq!(TokenClass::Note.role(), Some(Role::Opener));
    }

    #[test]
    fn discriminant_round_trip() {
        for class in TokenClass::ALL {
            assert_eq!(TokenClass::from_discriminant(class as u8), class);
        }
        assert_eq!(TokenClass::from_discriminant(63), TokenClass::Bad);
    }
}
