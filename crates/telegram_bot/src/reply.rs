//! Transport-agnostic conversation surface.
//!
//! The dialog core consumes [`Event`]s and emits [`Reply`] lists; nothing in
//! it knows about teloxide. The adapter in `handlers` maps both directions.

/// One inbound user action, borrowed from the transport update.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event<'a> {
    /// A slash command without the leading `/` (`"start"`).
    Command(&'a str),
    /// A plain text message.
    Text(&'a str),
    /// An inline button press carrying its callback payload.
    Button(&'a str),
}

/// Keyboard attached to an outbound message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Keyboard {
    /// Persistent reply keyboard; rows of button labels.
    Menu(Vec<Vec<String>>),
    /// Inline keyboard; rows of `(label, payload)` pairs.
    Inline(Vec<Vec<(String, String)>>),
}

/// One outbound message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Reply {
    Text(String),
    Keyboard { text: String, keyboard: Keyboard },
    /// Replaces the text of the message the pressed button was attached to.
    EditPrevious(String),
}
