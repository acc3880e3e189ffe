//! Per-round submission tracking and the sealing barrier

use crate::registry::PeerId;
use std::collections::HashMap;

/// Result of offering a word to a round
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The word was recorded. `sealed` is true when it was the last one missing.
    Accepted { round: u32, sealed: bool },
    /// Wrong round, round already sealed, or the player already submitted.
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundState {
    Open,
    Sealed,
    Scored,
}

/// One round of play
///
/// The letter pool is drawn once when the round is created and never changes.
/// `expected` is the player count captured at that moment.
#[derive(Debug)]
pub struct Round {
    number: u32,
    letters: String,
    expected: usize,
    submissions: HashMap<PeerId, String>,
    awards: HashMap<PeerId, u32>,
    state: RoundState,
}

impl Round {
    pub fn new(number: u32, letters: String, expected: usize) -> Self {
        // Nobody to wait for
        let state = if expected == 0 {
            RoundState::Sealed
        } else {
            RoundState::Open
        };

        Self {
            number,
            letters,
            expected,
            submissions: HashMap::with_capacity(expected),
            awards: HashMap::new(),
            state,
        }
    }

    /// Records the first word a player submits for this round
    pub fn try_submit(&mut self, player: PeerId, word: &str) -> SubmitOutcome {
        if self.state != RoundState::Open || self.submissions.contains_key(&player) {
            return SubmitOutcome::Ignored;
        }

        self.submissions.insert(player, word.to_string());

        let sealed = self.submissions.len() >= self.expected;
        if sealed {
            self.state = RoundState::Sealed;
        }

        SubmitOutcome::Accepted {
            round: self.number,
            sealed,
        }
    }

    /// Stores the points awarded per submission. Only valid once, on a sealed round.
    pub(crate) fn record_awards(&mut self, awards: HashMap<PeerId, u32>) {
        debug_assert_eq!(self.state, RoundState::Sealed);
        self.awards = awards;
        self.state = RoundState::Scored;
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn letters(&self) -> &str {
        &self.letters
    }

    pub fn expected(&self) -> usize {
        self.expected
    }

    pub fn state(&self) -> RoundState {
        self.state
    }

    pub fn is_sealed(&self) -> bool {
        self.state != RoundState::Open
    }

    pub fn is_scored(&self) -> bool {
        self.state == RoundState::Scored
    }

    pub fn submission_count(&self) -> usize {
        self.submissions.len()
    }

    pub fn submission(&self, player: &PeerId) -> Option<&str> {
        self.submissions.get(player).map(String::as_str)
    }

    pub fn submissions(&self) -> impl Iterator<Item = (&PeerId, &str)> {
        self.submissions.iter().map(|(id, w)| (id, w.as_str()))
    }

    pub fn award(&self, player: &PeerId) -> Option<u32> {
        self.awards.get(player).copied()
    }
}
