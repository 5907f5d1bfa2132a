//! Error types for the passdrop-core crate

use passdrop_store::StoreError;
use thiserror::Error;

/// Result type alias using `DropError`
pub type Result<T> = std::result::Result<T, DropError>;

/// Problems with an upload request; nothing has been stored
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// No upload name in the request path
    #[error("Please specify the name of your upload using the path. Ex: /myupload.gif")]
    MissingName,

    /// Request carried no file
    #[error("No file has been provided.")]
    NoFile,

    /// Request carried more than one file
    #[error("Only one file is allowed per call.")]
    TooManyFiles,

    /// Payload exceeds the configured ceiling
    #[error("File is too big!")]
    PayloadTooLarge { max: u64 },
}

/// Errors that can occur in drop operations
#[derive(Error, Debug)]
pub enum DropError {
    /// Unusable word list or storage root
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Rejected upload
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Upload could not be persisted
    #[error("storage write failed: {0}")]
    StorageWrite(#[source] StoreError),

    /// Missing, expired, or unknown passphrase
    #[error("object not found")]
    NotFound,

    /// Payload could not be decrypted with the derived key
    #[error("payload could not be decrypted")]
    Decryption,

    /// A live object could not be removed
    #[error("could not delete object {0}")]
    StorageDelete(String),

    /// Unexpected storage failure
    #[error("storage error: {0}")]
    Storage(#[from] StoreError),

    /// A blocking helper task panicked or was cancelled
    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl DropError {
    /// Whether the caller should only ever see "not found"
    ///
    /// Decryption failures are indistinguishable from a wrong passphrase.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound | Self::Decryption)
    }
}
