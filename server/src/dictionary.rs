//! Word validation: letter-pool containment plus a dictionary lookup

use log::{debug, warn};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DictionaryError {
    #[error("failed to read word list {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("word list {0} contains no words")]
    Empty(PathBuf),
}

#[derive(Debug, Error)]
pub enum OracleError {
    #[error("word oracle unavailable: {0}")]
    Unavailable(String),
}

/// Answers whether a lowercase string is an acceptable word.
pub trait WordOracle: Send + Sync {
    fn is_word(&self, word: &str) -> Result<bool, OracleError>;
}

/// In-memory word list, one word per line, compared case-insensitively.
#[derive(Debug, Default)]
pub struct WordList {
    words: HashSet<String>,
}

impl WordList {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DictionaryError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| DictionaryError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let list = Self::from_words(contents.lines());
        if list.is_empty() {
            return Err(DictionaryError::Empty(path.to_path_buf()));
        }
        Ok(list)
    }

    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words = words
            .into_iter()
            .map(|w| w.as_ref().trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();
        Self { words }
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl WordOracle for WordList {
    fn is_word(&self, word: &str) -> Result<bool, OracleError> {
        Ok(self.words.contains(word))
    }
}

/// Checks that `word` can be spelled from `pool`, using each pool letter at most once.
///
/// Both sides are case-folded before comparing.
pub fn can_form_word(word: &str, pool: &str) -> bool {
    let mut available: HashMap<char, usize> = HashMap::new();
    for c in pool.chars().flat_map(char::to_lowercase) {
        *available.entry(c).or_insert(0) += 1;
    }

    for c in word.chars().flat_map(char::to_lowercase) {
        match available.get_mut(&c) {
            Some(count) if *count > 0 => *count -= 1,
            _ => return false,
        }
    }
    true
}

/// Combines the pool check with the dictionary oracle.
#[derive(Clone)]
pub struct WordValidator {
    oracle: Arc<dyn WordOracle>,
}

impl WordValidator {
    pub fn new(oracle: Arc<dyn WordOracle>) -> Self {
        Self { oracle }
    }

    /// A word is valid when it is non-empty, formable from the pool and known to
    /// the oracle. Oracle failures count as invalid.
    pub fn is_valid(&self, word: &str, pool: &str) -> bool {
        let folded = word.to_lowercase();
        if folded.is_empty() {
            return false;
        }

        if !can_form_word(&folded, pool) {
            debug!("'{}' cannot be formed from {}", word, pool);
            return false;
        }

        match self.oracle.is_word(&folded) {
            Ok(valid) => valid,
            Err(e) => {
                warn!("Treating '{}' as invalid: {}", word, e);
                false
            }
        }
    }

    /// Points for a submission: its length in characters if valid, otherwise zero.
    pub fn score(&self, word: &str, pool: &str) -> u32 {
        if self.is_valid(word, pool) {
            word.chars().count() as u32
        } else {
            0
        }
    }
}
