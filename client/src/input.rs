//! Turns typed lines into protocol messages

use shared::ClientMessage;

/// Tracks whether the player is in the lobby yet, which decides what a line means
///
/// Until the server accepts a join, every line is a name. Afterwards every line is
/// a word for the current round.
#[derive(Debug, Default)]
pub struct InputManager {
    joined: bool,
}

impl InputManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_joined(&mut self, joined: bool) {
        self.joined = joined;
    }

    pub fn is_joined(&self) -> bool {
        self.joined
    }

    /// Returns the message for a typed line, or None for blank input
    pub fn line_to_message(&self, line: &str) -> Option<ClientMessage> {
        let text = line.trim();
        if text.is_empty() {
            return None;
        }

        let text = text.to_string();
        Some(if self.joined {
            ClientMessage::Word { word: text }
        } else {
            ClientMessage::Join { name: text }
        })
    }
}
