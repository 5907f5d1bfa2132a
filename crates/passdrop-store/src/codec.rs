//! Policy-gated payload encryption
//!
//! With encryption enabled, payloads are sealed with the passphrase-derived
//! key before they reach the disk and opened fully in memory on read. With it
//! disabled, payloads are stored verbatim and streamed straight from the file.
//! The sidecar's `encryption_enabled` flag, not the current policy, decides
//! how an existing payload is read back.

use crate::{Result, filesystem::StoredObject};
use bytes::Bytes;
use passdrop_crypto::{EncryptionKey, symmetric};
use tokio::io::AsyncReadExt;
use tracing::debug;

/// Payload bytes ready to be written
#[derive(Debug)]
pub struct Encoded {
    /// Bytes for the payload file
    pub bytes: Bytes,
    /// Whether `bytes` is sealed
    pub encryption_enabled: bool,
}

/// Readable plaintext of a stored object
#[derive(Debug)]
pub enum Payload {
    /// Unencrypted payload read directly from disk
    File {
        file: tokio::fs::File,
        len: u64,
    },
    /// Decrypted payload held in memory
    Memory(Bytes),
}

impl Payload {
    /// Plaintext length in bytes
    pub fn len(&self) -> u64 {
        match self {
            Self::File { len, .. } => *len,
            Self::Memory(bytes) => bytes.len() as u64,
        }
    }

    /// Whether the plaintext is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Read the whole plaintext into memory
    pub async fn into_bytes(self) -> Result<Bytes> {
        match self {
            Self::File { mut file, len } => {
                let mut buf = Vec::with_capacity(len as usize);
                file.read_to_end(&mut buf).await?;
                Ok(Bytes::from(buf))
            }
            Self::Memory(bytes) => Ok(bytes),
        }
    }
}

/// Encrypts or passes through payloads according to the server policy
#[derive(Clone, Copy, Debug, Default)]
pub struct PayloadCodec {
    encryption_enabled: bool,
}

impl PayloadCodec {
    /// Create a codec for the given policy
    pub fn new(encryption_enabled: bool) -> Self {
        Self { encryption_enabled }
    }

    /// Whether new uploads are encrypted
    pub fn encryption_enabled(&self) -> bool {
        self.encryption_enabled
    }

    /// Prepare plaintext for storage
    pub async fn encode(&self, plaintext: Bytes, key: &EncryptionKey) -> Result<Encoded> {
        if !self.encryption_enabled {
            return Ok(Encoded {
                bytes: plaintext,
                encryption_enabled: false,
            });
        }

        let key = key.clone();
        let sealed =
            tokio::task::spawn_blocking(move || symmetric::seal(&key, &plaintext)).await??;
        Ok(Encoded {
            bytes: Bytes::from(sealed),
            encryption_enabled: true,
        })
    }

    /// Turn a stored object back into plaintext
    ///
    /// Objects without a readable sidecar are assumed to follow the current
    /// policy.
    pub async fn decode(&self, object: StoredObject, key: &EncryptionKey) -> Result<Payload> {
        let encrypted = object
            .metadata
            .as_ref()
            .map(|m| m.encryption_enabled)
            .unwrap_or(self.encryption_enabled);

        let StoredObject {
            hash,
            mut file,
            len,
            ..
        } = object;

        if !encrypted {
            return Ok(Payload::File { file, len });
        }

        let mut sealed = Vec::with_capacity(len as usize);
        file.read_to_end(&mut sealed).await?;
        drop(file);

        let key = key.clone();
        let plaintext =
            tokio::task::spawn_blocking(move || symmetric::open(&key, &sealed)).await??;
        debug!(hash = %hash, size = plaintext.len(), "Decrypted payload");
        Ok(Payload::Memory(Bytes::from(plaintext)))
    }
}
