//! User-originated input events
//!
//! A [`UserGesture`] can only be built inside the crate's input layer, so
//! anything holding one was handed a genuine click or key-press.

/// Kind of user gesture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    Click,
    KeyPress,
}

impl std::fmt::Display for Gesture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Gesture::Click => write!(f, "click"),
            Gesture::KeyPress => write!(f, "key_press"),
        }
    }
}

/// Proof that a gesture came from the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserGesture {
    kind: Gesture,
}

impl UserGesture {
    pub(crate) fn new(kind: Gesture) -> Self {
        Self { kind }
    }

    pub fn kind(&self) -> Gesture {
        self.kind
    }
}

/// Events sent from the input listener to the coordinator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    /// The user clicked or pressed a key
    Gesture(UserGesture),
    /// The user submitted a question
    Submit(String),
}
