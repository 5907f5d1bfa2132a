//! Key material derived from passphrases
//!
//! Two layers of keys exist, and neither is ever written to disk:
//! - `EncryptionKey`: the salted digest of the reversed passphrase, rendered as
//!   40 hex characters. It plays the role of a password for the payload cipher.
//! - `PayloadKey`: the 256-bit AES key stretched from an `EncryptionKey` and a
//!   random per-object salt with HKDF-SHA256.

use crate::{CryptoError, Result};
use hkdf::Hkdf;
use sha2::Sha256;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Size of a symmetric key in bytes (256 bits)
pub const KEY_SIZE: usize = 32;

/// Size of a nonce in bytes (96 bits for AES-GCM)
pub const NONCE_SIZE: usize = 12;

/// Length of an `EncryptionKey` in hex characters
pub const ENCRYPTION_KEY_HEX_LEN: usize = 40;

/// Info string binding HKDF output to payload encryption
const PAYLOAD_KEY_INFO: &[u8] = b"passdrop-payload-key-v1";

/// Password-like secret used to encrypt a single stored payload
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct EncryptionKey {
    hex: [u8; ENCRYPTION_KEY_HEX_LEN],
}

impl EncryptionKey {
    /// Build the key from a raw 20-byte digest
    pub fn from_digest(digest: &[u8; 20]) -> Self {
        let mut hex = [0u8; ENCRYPTION_KEY_HEX_LEN];
        // Infallible: the output buffer is exactly twice the input length.
        let _ = hex::encode_to_slice(digest, &mut hex);
        Self { hex }
    }

    /// Create from a 40-character lowercase hex string
    pub fn from_hex(s: &str) -> Result<Self> {
        let mut digest = [0u8; 20];
        hex::decode_to_slice(s, &mut digest)?;
        Ok(Self::from_digest(&digest))
    }

    /// The key as ASCII hex bytes
    pub fn as_bytes(&self) -> &[u8; ENCRYPTION_KEY_HEX_LEN] {
        &self.hex
    }
}

impl std::fmt::Debug for EncryptionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("EncryptionKey([REDACTED])")
    }
}

/// AES-256 key for one payload
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct PayloadKey {
    key: [u8; KEY_SIZE],
}

impl PayloadKey {
    /// Stretch an `EncryptionKey` with the object's salt
    pub fn derive(secret: &EncryptionKey, salt: &[u8]) -> Result<Self> {
        let hk = Hkdf::<Sha256>::new(Some(salt), secret.as_bytes());
        let mut key = [0u8; KEY_SIZE];
        hk.expand(PAYLOAD_KEY_INFO, &mut key)
            .map_err(|e| CryptoError::InvalidKey(e.to_string()))?;
        Ok(Self { key })
    }

    /// Get the key bytes
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.key
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encryption_key_hex_roundtrip() {
        let key = EncryptionKey::from_digest(&[0xab; 20]);
        assert_eq!(key.as_bytes(), "ab".repeat(20).as_bytes());

        let parsed = EncryptionKey::from_hex(&"ab".repeat(20)).unwrap();
        assert_eq!(parsed.as_bytes(), key.as_bytes());
    }

    #[test]
    fn test_encryption_key_rejects_bad_hex() {
        assert!(EncryptionKey::from_hex("not hex").is_err());
        assert!(EncryptionKey::from_hex("abcd").is_err());
    }

    #[test]
    fn test_debug_does_not_leak() {
        let key = EncryptionKey::from_digest(&[0x11; 20]);
        assert!(!format!("{:?}", key).contains("11"));
    }

    #[test]
    fn test_payload_key_depends_on_salt() {
        let secret = EncryptionKey::from_digest(&[7; 20]);
        let k1 = PayloadKey::derive(&secret, b"salt-one").unwrap();
        let k2 = PayloadKey::derive(&secret, b"salt-one").unwrap();
        let k3 = PayloadKey::derive(&secret, b"salt-two").unwrap();

        assert_eq!(k1.as_bytes(), k2.as_bytes());
        assert_ne!(k1.as_bytes(), k3.as_bytes());
    }
}
