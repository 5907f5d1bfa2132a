//! Error types for the passdrop-crypto crate

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using `CryptoError`
pub type Result<T> = std::result::Result<T, CryptoError>;

/// Errors that can occur while handling passphrases and payload secrets
#[derive(Error, Debug)]
pub enum CryptoError {
    /// The word list cannot be used to mint passphrases
    #[error("word list {path} is unusable: {reason}")]
    WordList { path: PathBuf, reason: String },

    /// Encryption failed
    #[error("encryption failed: {0}")]
    Encryption(String),

    /// Decryption failed (wrong key or tampered ciphertext)
    #[error("decryption failed: {0}")]
    Decryption(String),

    /// Invalid ciphertext format
    #[error("invalid ciphertext: {0}")]
    InvalidCiphertext(String),

    /// Invalid key format or length
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Hex decode error
    #[error("hex decode error: {0}")]
    HexDecode(#[from] hex::FromHexError),
}

impl CryptoError {
    /// Whether this error means the ciphertext could not be opened with the given key
    pub fn is_decryption_failure(&self) -> bool {
        matches!(self, Self::Decryption(_) | Self::InvalidCiphertext(_))
    }
}
