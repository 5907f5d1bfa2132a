//! Error types for the passdrop-store crate

use passdrop_crypto::{CryptoError, UploadHash};
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using `StoreError`
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// No payload exists for the hash
    #[error("object not found: {0}")]
    NotFound(UploadHash),

    /// The payload existed but its lifetime has elapsed; it has been evicted
    #[error("object expired: {0}")]
    Expired(UploadHash),

    /// Bucket directory could not be created
    #[error("cannot create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Payload could not be written
    #[error("cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Storage root or a bucket could not be listed during a sweep
    #[error("cannot scan {path}: {source}")]
    Scan {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Payload could not be decoded
    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),

    /// Background task failed
    #[error("task failed: {0}")]
    Task(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// Whether the object is unreachable (missing or expired)
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::Expired(_))
    }

    /// Whether the payload failed to decrypt
    pub fn is_decryption_failure(&self) -> bool {
        matches!(self, Self::Crypto(e) if e.is_decryption_failure())
    }
}

impl From<tokio::task::JoinError> for StoreError {
    fn from(err: tokio::task::JoinError) -> Self {
        StoreError::Task(err.to_string())
    }
}
