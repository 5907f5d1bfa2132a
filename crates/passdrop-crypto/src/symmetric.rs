//! Password-based authenticated encryption for stored payloads
//!
//! Sealed layout (all lengths in bytes):
//!
//! ```text
//! ┌─────────┬──────────┬───────────┬─────────────────────────────┐
//! │ version │   salt   │   nonce   │ AES-256-GCM ciphertext + tag │
//! │    1    │    16    │    12     │        plaintext + 16        │
//! └─────────┴──────────┴───────────┴─────────────────────────────┘
//! ```
//!
//! The version byte and salt are authenticated as associated data.

use crate::{
    CryptoError, Result,
    keys::{EncryptionKey, NONCE_SIZE, PayloadKey},
};
use aes_gcm::{
    Aes256Gcm, KeyInit, Nonce,
    aead::{Aead, Payload},
};
use rand::{RngCore, rngs::OsRng};

/// Current sealed-payload format version
pub const FORMAT_VERSION: u8 = 1;

/// Size of the per-payload HKDF salt
pub const SALT_SIZE: usize = 16;

/// Size of the GCM authentication tag
pub const TAG_SIZE: usize = 16;

/// Bytes preceding the ciphertext
pub const HEADER_SIZE: usize = 1 + SALT_SIZE + NONCE_SIZE;

/// Total bytes a sealed payload adds to its plaintext
pub const OVERHEAD: usize = HEADER_SIZE + TAG_SIZE;

/// Encrypt a payload under a passphrase-derived key
pub fn seal(secret: &EncryptionKey, plaintext: &[u8]) -> Result<Vec<u8>> {
    let mut header = [0u8; 1 + SALT_SIZE];
    header[0] = FORMAT_VERSION;
    OsRng.fill_bytes(&mut header[1..]);

    let mut nonce = [0u8; NONCE_SIZE];
    OsRng.fill_bytes(&mut nonce);

    let key = PayloadKey::derive(secret, &header[1..])?;
    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| CryptoError::Encryption(e.to_string()))?;
    let ciphertext = cipher
        .encrypt(
            Nonce::from_slice(&nonce),
            Payload {
                msg: plaintext,
                aad: &header,
            },
        )
        .map_err(|e| CryptoError::Encryption(e.to_string()))?;

    let mut sealed = Vec::with_capacity(HEADER_SIZE + ciphertext.len());
    sealed.extend_from_slice(&header);
    sealed.extend_from_slice(&nonce);
    sealed.extend_from_slice(&ciphertext);
    Ok(sealed)
}

/// Decrypt a payload produced by [`seal`]
pub fn open(secret: &EncryptionKey, sealed: &[u8]) -> Result<Vec<u8>> {
    if sealed.len() < OVERHEAD {
        return Err(CryptoError::InvalidCiphertext(format!(
            "sealed payload too short ({} < {} bytes)",
            sealed.len(),
            OVERHEAD
        )));
    }
    if sealed[0] != FORMAT_VERSION {
        return Err(CryptoError::InvalidCiphertext(format!(
            "unsupported format version {}",
            sealed[0]
        )));
    }

    let (header, rest) = sealed.split_at(1 + SALT_SIZE);
    let (nonce, ciphertext) = rest.split_at(NONCE_SIZE);

    let key = PayloadKey::derive(secret, &header[1..])?;
    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| CryptoError::Decryption(e.to_string()))?;
    cipher
        .decrypt(
            Nonce::from_slice(nonce),
            Payload {
                msg: ciphertext,
                aad: header,
            },
        )
        .map_err(|e| CryptoError::Decryption(e.to_string()))
}

/// Plaintext length of a sealed payload of the given size
pub fn plaintext_len(sealed_len: u64) -> Option<u64> {
    sealed_len.checked_sub(OVERHEAD as u64)
}
