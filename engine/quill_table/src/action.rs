//! Actions: what a table entry tells the scanner to do.

use quill_tag::TokenClass;

/// Scanner states are opaque small integers supplied by the table. The
/// scanner has no hardcoded notion of what any state means; all structure
/// lives in the table.
pub type StateId = u8;

/// The fixed initial state of every table.
pub const START_STATE: StateId = 0;

/// What to do when a pattern matches in a state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActionKind {
    /// This pattern is not applicable in this state; keep searching.
    /// Never selected at runtime once a table has been validated.
    Skip,
    /// Continue the current token without classifying it yet.
    More,
    /// Close the current token and tag its head byte with this class.
    Class(TokenClass),
}

/// One cell of the transition matrix: an action and a target state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Action {
    pub kind: ActionKind,
    pub target: StateId,
}

/// Reserved action byte: entry not applicable to this state.
pub(crate) const SKIP_BYTE: u8 = b'~';
/// Reserved action byte: continue the current token.
pub(crate) const MORE_BYTE: u8 = b'-';

impl ActionKind {
    /// Decode a table action byte.
    pub(crate) fn from_byte(byte: u8) -> Option<ActionKind> {
        match byte {
            SKIP_BYTE => Some(ActionKind::Skip),
            MORE_BYTE => Some(ActionKind::More),
            _ => TokenClass::from_action(byte).map(ActionKind::Class),
        }
    }

    /// Encode as a table action byte.
    pub(crate) fn to_byte(self) -> u8 {
        match self {
            ActionKind::Skip => SKIP_BYTE,
            ActionKind::More => MORE_BYTE,
            ActionKind::Class(class) => class.short_name(),
        }
    }
}
