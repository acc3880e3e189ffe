use crate::config::GameConfig;
use crate::dictionary::WordValidator;
use crate::letters::LetterSource;
use crate::registry::{Joined, PeerId, PlayerRegistry};
use crate::round::{Round, SubmitOutcome};
use log::{info, warn};
use serde::Serialize;
use shared::{RejectReason, ServerMessage, Standing};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Lobby,
    RoundActive(u32),
    Finished,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("no round is active")]
    NoActiveRound,
    #[error("round {0} is still collecting submissions")]
    RoundNotSealed(u32),
    #[error("round {0} was already scored")]
    AlreadyScored(u32),
    #[error("round {0} has not been scored yet")]
    RoundNotScored(u32),
}

/// Final outcome: everyone tied at the top score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GameResult {
    Winner { name: String, score: u32 },
    Tie { names: Vec<String>, score: u32 },
}

impl GameResult {
    pub fn to_message(&self) -> ServerMessage {
        match self {
            GameResult::Winner { name, score } => ServerMessage::Winner {
                name: name.clone(),
                score: *score,
            },
            GameResult::Tie { names, score } => ServerMessage::Tie {
                names: names.clone(),
                score: *score,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmissionRecord {
    pub player: String,
    pub peer: String,
    pub word: String,
    pub points: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RoundSummary {
    pub round: u32,
    pub letters: String,
    pub submissions: Vec<SubmissionRecord>,
}

/// Record of a played game, written out with `--summary`.
#[derive(Debug, Clone, Serialize)]
pub struct GameSummary {
    pub rounds: Vec<RoundSummary>,
    pub standings: Vec<Standing>,
    pub result: GameResult,
}

pub struct Session {
    config: GameConfig,
    phase: Phase,
    registry: PlayerRegistry,
    rounds: Vec<Round>,
    letters: Box<dyn LetterSource>,
}

impl Session {
    pub fn new(config: GameConfig, letters: Box<dyn LetterSource>) -> Self {
        Self {
            registry: PlayerRegistry::new(config.max_players),
            config,
            phase: Phase::Lobby,
            rounds: Vec::new(),
            letters,
        }
    }

    /// Registers a player. Filling the last slot starts round 1 immediately.
    pub fn try_join(&mut self, peer: PeerId, name: &str) -> Result<Joined, RejectReason> {
        let joined = self.registry.try_join(peer, name)?;

        if joined.lobby_full && self.phase == Phase::Lobby {
            info!("Lobby full with {} players, starting game", self.registry.len());
            self.start();
        }

        Ok(joined)
    }

    /// Admin-triggered start. Refused outside the lobby or with nobody joined.
    pub fn manual_start(&mut self) -> bool {
        if self.phase != Phase::Lobby {
            return false;
        }
        if self.registry.is_empty() {
            warn!("Ignoring start request: no players have joined");
            return false;
        }

        info!("Manual start with {} players", self.registry.len());
        self.start();
        true
    }

    fn start(&mut self) {
        self.registry.close();
        self.begin_round(1);
    }

    fn begin_round(&mut self, number: u32) {
        let letters = self.letters.draw(self.config.letters_per_round);
        info!("Round {} letters: {}", number, letters);

        self.rounds
            .push(Round::new(number, letters, self.registry.len()));
        self.phase = Phase::RoundActive(number);
    }

    /// Offers a word for the active round on behalf of a registered player.
    pub fn try_submit(&mut self, peer: PeerId, word: &str) -> SubmitOutcome {
        if !matches!(self.phase, Phase::RoundActive(_)) || !self.registry.contains(&peer) {
            return SubmitOutcome::Ignored;
        }

        match self.rounds.last_mut() {
            Some(round) => round.try_submit(peer, word),
            None => SubmitOutcome::Ignored,
        }
    }

    /// Scores the sealed active round exactly once and returns the new standings.
    pub fn score_active_round(
        &mut self,
        validator: &WordValidator,
    ) -> Result<Vec<Standing>, SessionError> {
        let number = self.current_round();
        let round = self
            .rounds
            .last_mut()
            .filter(|r| r.number() == number)
            .ok_or(SessionError::NoActiveRound)?;

        if round.is_scored() {
            return Err(SessionError::AlreadyScored(number));
        }
        if !round.is_sealed() {
            return Err(SessionError::RoundNotSealed(number));
        }

        let mut awards = HashMap::with_capacity(round.submission_count());
        for (peer, word) in round.submissions() {
            let points = validator.score(word, round.letters());
            if let Some(player) = self.registry.get(peer) {
                info!(
                    "Round {}: {} submitted '{}' for {} points",
                    number, player.name, word, points
                );
            }
            awards.insert(*peer, points);
        }

        for (peer, points) in &awards {
            self.registry.award(peer, *points);
        }
        round.record_awards(awards);

        Ok(self.registry.standings())
    }

    /// Moves past a scored round: into the next round, or to `Finished` after the last.
    pub fn advance(&mut self) -> Result<Phase, SessionError> {
        let number = match self.phase {
            Phase::RoundActive(number) => number,
            _ => return Err(SessionError::NoActiveRound),
        };

        if !self.round(number).is_some_and(Round::is_scored) {
            return Err(SessionError::RoundNotScored(number));
        }

        if number < self.config.rounds {
            self.begin_round(number + 1);
        } else {
            info!("All {} rounds complete", self.config.rounds);
            self.phase = Phase::Finished;
        }

        Ok(self.phase)
    }

    /// Every player sharing the top score, in join order.
    pub fn final_result(&self) -> GameResult {
        let top = self.registry.iter().map(|p| p.score).max().unwrap_or(0);
        let mut names: Vec<String> = self
            .registry
            .iter()
            .filter(|p| p.score == top)
            .map(|p| p.name.clone())
            .collect();

        if names.len() == 1 {
            GameResult::Winner {
                name: names.remove(0),
                score: top,
            }
        } else {
            GameResult::Tie { names, score: top }
        }
    }

    pub fn summary(&self) -> GameSummary {
        let rounds = self
            .rounds
            .iter()
            .map(|round| RoundSummary {
                round: round.number(),
                letters: round.letters().to_string(),
                submissions: self
                    .registry
                    .iter()
                    .filter_map(|player| {
                        round.submission(&player.id).map(|word| SubmissionRecord {
                            player: player.name.clone(),
                            peer: player.id.to_string(),
                            word: word.to_string(),
                            points: round.award(&player.id),
                        })
                    })
                    .collect(),
            })
            .collect();

        GameSummary {
            rounds,
            standings: self.registry.standings(),
            result: self.final_result(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn has_started(&self) -> bool {
        self.phase != Phase::Lobby
    }

    /// 0 in the lobby, otherwise the number of the latest round entered.
    pub fn current_round(&self) -> u32 {
        match self.phase {
            Phase::Lobby => 0,
            Phase::RoundActive(number) => number,
            Phase::Finished => self.config.rounds,
        }
    }

    pub fn round(&self, number: u32) -> Option<&Round> {
        self.rounds.iter().find(|r| r.number() == number)
    }

    pub fn active_round(&self) -> Option<&Round> {
        match self.phase {
            Phase::RoundActive(number) => self.round(number),
            _ => None,
        }
    }

    pub fn rounds(&self) -> &[Round] {
        &self.rounds
    }

    pub fn registry(&self) -> &PlayerRegistry {
        &self.registry
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }
}
