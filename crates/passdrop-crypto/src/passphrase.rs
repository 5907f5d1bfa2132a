//! Passphrase generation from a dictionary word list
//!
//! A passphrase is `N` words drawn independently and uniformly (with
//! replacement) from a newline-delimited word list, joined with `-`. The list
//! is re-read on every generation so it can be swapped without a restart.

use crate::{CryptoError, Result};
use rand::{Rng, rngs::OsRng};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Smallest allowed number of words
pub const MIN_WORDS: usize = 1;

/// Largest allowed number of words
pub const MAX_WORDS: usize = 10;

/// Separator between words
pub const SEPARATOR: &str = "-";

/// Clamp a configured word count to `[MIN_WORDS, MAX_WORDS]`
pub fn clamp_word_count(words: usize) -> usize {
    words.clamp(MIN_WORDS, MAX_WORDS)
}

/// Mints passphrases from a word list file
#[derive(Clone, Debug)]
pub struct PassphraseGenerator {
    word_list: PathBuf,
    words: usize,
}

impl PassphraseGenerator {
    /// Open a generator, failing if the word list is missing, unreadable or blank
    pub fn open(word_list: impl Into<PathBuf>, words: usize) -> Result<Self> {
        let generator = Self {
            word_list: word_list.into(),
            words: clamp_word_count(words),
        };
        generator.load()?;
        debug!(path = %generator.word_list.display(), words = generator.words, "Word list ready");
        Ok(generator)
    }

    /// Number of words per passphrase
    pub fn word_count(&self) -> usize {
        self.words
    }

    /// Path of the backing word list
    pub fn word_list(&self) -> &Path {
        &self.word_list
    }

    /// Generate a fresh passphrase
    pub fn generate(&self) -> Result<String> {
        let contents = self.load()?;
        let lines: Vec<&str> = contents.lines().collect();
        debug!(words = self.words, candidates = lines.len(), "Generating passphrase");
        Ok(draw(&lines, self.words, &mut OsRng))
    }

    fn load(&self) -> Result<String> {
        let contents = std::fs::read_to_string(&self.word_list).map_err(|e| {
            CryptoError::WordList {
                path: self.word_list.clone(),
                reason: e.to_string(),
            }
        })?;
        if !contents.lines().any(|line| !line.trim().is_empty()) {
            return Err(CryptoError::WordList {
                path: self.word_list.clone(),
                reason: "no usable words".to_string(),
            });
        }
        Ok(contents)
    }
}

/// Draw `words` non-empty lines, retrying on blank ones
///
/// `lines` must contain at least one non-blank entry.
fn draw<R: Rng + ?Sized>(lines: &[&str], words: usize, rng: &mut R) -> String {
    let mut picked = Vec::with_capacity(words);
    while picked.len() < words {
        let word = lines[rng.gen_range(0..lines.len())].trim();
        if !word.is_empty() {
            picked.push(word);
        }
    }
    picked.join(SEPARATOR)
}

/// Render a passphrase for log output without revealing it
pub fn mask(passphrase: &str) -> String {
    match passphrase.split_once(SEPARATOR) {
        Some((first, _)) => format!("{}{}***", first, SEPARATOR),
        None => "***".to_string(),
    }
}
