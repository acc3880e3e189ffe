//! Fan-out of protocol messages to every registered player

use crate::network::Outbox;
use crate::registry::PlayerRegistry;
use crate::session::{GameResult, Session};
use shared::{ServerMessage, Standing};

/// Queues messages for every player in a registry snapshot.
///
/// Callers pass the registry while holding the session lock, so the recipient list
/// cannot change halfway through a broadcast.
#[derive(Clone)]
pub struct Broadcaster {
    outbox: Outbox,
}

impl Broadcaster {
    pub fn new(outbox: Outbox) -> Self {
        Self { outbox }
    }

    pub fn broadcast(&self, registry: &PlayerRegistry, message: &ServerMessage) {
        self.outbox.broadcast(registry.peers(), message);
    }

    pub fn round_start(&self, registry: &PlayerRegistry, round: u32, letters: &str) {
        self.broadcast(registry, &ServerMessage::RoundStart { round });
        self.broadcast(
            registry,
            &ServerMessage::RoundLetters {
                letters: letters.to_string(),
            },
        );
    }

    /// Announces the session's active round, if there is one.
    pub fn announce_active_round(&self, session: &Session) {
        if let Some(round) = session.active_round() {
            self.round_start(session.registry(), round.number(), round.letters());
        }
    }

    pub fn round_over(&self, registry: &PlayerRegistry, round: u32, scores: Vec<Standing>) {
        self.broadcast(registry, &ServerMessage::RoundOver { round, scores });
    }

    pub fn final_result(&self, registry: &PlayerRegistry, result: &GameResult) {
        self.broadcast(registry, &result.to_message());
    }
}
