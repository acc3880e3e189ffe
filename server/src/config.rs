use shared::{LETTERS_PER_ROUND, MAX_PLAYERS, NUM_ROUNDS};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("max players must be at least 1")]
    NoPlayers,
    #[error("a game needs at least one round")]
    NoRounds,
    #[error("at least one letter must be dealt per round")]
    NoLetters,
}

/// Fixed parameters of one game
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameConfig {
    pub max_players: usize,
    pub rounds: u32,
    pub letters_per_round: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            max_players: MAX_PLAYERS,
            rounds: NUM_ROUNDS,
            letters_per_round: LETTERS_PER_ROUND,
        }
    }
}

impl GameConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_players == 0 {
            return Err(ConfigError::NoPlayers);
        }
        if self.rounds == 0 {
            return Err(ConfigError::NoRounds);
        }
        if self.letters_per_round == 0 {
            return Err(ConfigError::NoLetters);
        }
        Ok(())
    }
}
