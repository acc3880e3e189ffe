//! Letter pool generation

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use shared::ALPHABET;

/// Deals the letter pool for a round.
pub trait LetterSource: Send + Sync {
    fn draw(&mut self, count: usize) -> String;
}

/// Uniform draws over `A..=Z`
pub struct RandomLetters {
    rng: StdRng,
}

impl RandomLetters {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomLetters {
    fn default() -> Self {
        Self::new()
    }
}

impl LetterSource for RandomLetters {
    fn draw(&mut self, count: usize) -> String {
        (0..count)
            .map(|_| ALPHABET[self.rng.gen_range(0..ALPHABET.len())] as char)
            .collect()
    }
}

/// Replays a fixed list of pools in order, repeating the last one when exhausted.
///
/// The requested count is ignored; pools are dealt exactly as given.
pub struct ScriptedLetters {
    pools: Vec<String>,
    next: usize,
}

impl ScriptedLetters {
    pub fn new<I, S>(pools: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            pools: pools.into_iter().map(Into::into).collect(),
            next: 0,
        }
    }
}

impl LetterSource for ScriptedLetters {
    fn draw(&mut self, _count: usize) -> String {
        let pool = match self.pools.get(self.next) {
            Some(pool) => pool.clone(),
            None => self.pools.last().cloned().unwrap_or_default(),
        };
        self.next += 1;
        pool
    }
}
