//! Salted address and key derivation
//!
//! A passphrase is turned into two values with the same primitive and salt:
//! - the upload hash, `SHA-1(salt ‖ passphrase)`, which addresses the payload on disk
//! - the encryption key, `SHA-1(salt ‖ reverse(passphrase))`, which stays in memory
//!
//! Reversing the passphrase only decorrelates the two digests, it is not a
//! real key derivation. It is kept so objects written by earlier deployments
//! can still be decrypted.

use crate::{CryptoError, Result, keys::EncryptionKey};
use sha1::{Digest, Sha1};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Length of an upload hash in hex characters
pub const UPLOAD_HASH_HEX_LEN: usize = 40;

/// Storage address of an uploaded object
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct UploadHash(String);

impl UploadHash {
    /// Parse a hash, accepting only 40 lowercase hex characters
    pub fn from_hex(s: &str) -> Result<Self> {
        if is_upload_hash(s) {
            Ok(Self(s.to_string()))
        } else {
            Err(CryptoError::InvalidKey(format!(
                "upload hash must be {} lowercase hex characters",
                UPLOAD_HASH_HEX_LEN
            )))
        }
    }

    /// Get the hash as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The two directory levels the object is sharded under
    pub fn shard(&self) -> (&str, &str) {
        (&self.0[0..2], &self.0[2..4])
    }
}

impl fmt::Debug for UploadHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UploadHash({})", self.0)
    }
}

impl fmt::Display for UploadHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for UploadHash {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Check whether a file name is a well-formed upload hash
pub fn is_upload_hash(s: &str) -> bool {
    s.len() == UPLOAD_HASH_HEX_LEN
        && s.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}

/// Derives upload hashes and encryption keys with the server-wide salt
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Deriver {
    salt: Vec<u8>,
}

impl Deriver {
    /// Create a deriver for the given salt
    pub fn new(salt: impl Into<Vec<u8>>) -> Self {
        Self { salt: salt.into() }
    }

    /// `SHA-1(salt ‖ passphrase)` as 40 hex characters
    pub fn upload_hash(&self, passphrase: &str) -> UploadHash {
        UploadHash(hex::encode(self.digest(passphrase.as_bytes())))
    }

    /// `SHA-1(salt ‖ reverse(passphrase))`, reversed byte-wise
    pub fn encryption_key(&self, passphrase: &str) -> EncryptionKey {
        let mut reversed = passphrase.as_bytes().to_vec();
        reversed.reverse();
        let digest = self.digest(&reversed);
        reversed.zeroize();
        EncryptionKey::from_digest(&digest)
    }

    fn digest(&self, input: &[u8]) -> [u8; 20] {
        let mut hasher = Sha1::new();
        hasher.update(&self.salt);
        hasher.update(input);
        hasher.finalize().into()
    }
}

impl fmt::Debug for Deriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Deriver")
            .field("salt", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_upload_hash_known_vector() {
        // sha1("abc")
        let deriver = Deriver::new("");
        assert_eq!(
            deriver.upload_hash("abc").as_str(),
            "a9993e364706816aba3e25717850c26c9cd0d89d"
        );
    }

    #[test]
    fn test_salt_is_prefixed() {
        let salted = Deriver::new("ab");
        let unsalted = Deriver::new("");
        assert_eq!(salted.upload_hash("c"), unsalted.upload_hash("abc"));
    }

    #[test]
    fn test_key_uses_reversed_passphrase() {
        let deriver = Deriver::new("salt");
        let key = deriver.encryption_key("apple-pear");
        let expected = deriver.upload_hash("raep-elppa");
        assert_eq!(key.as_bytes(), expected.as_str().as_bytes());
    }

    #[test]
    fn test_hash_and_key_differ() {
        let deriver = Deriver::new("salt");
        let hash = deriver.upload_hash("apple-pear-plum");
        let key = deriver.encryption_key("apple-pear-plum");
        assert_ne!(hash.as_str().as_bytes(), key.as_bytes());
    }

    #[test]
    fn test_shard() {
        let hash = UploadHash::from_hex("a9993e364706816aba3e25717850c26c9cd0d89d").unwrap();
        assert_eq!(hash.shard(), ("a9", "99"));
    }

    #[test]
    fn test_from_hex_validation() {
        assert!(UploadHash::from_hex("A9993E364706816ABA3E25717850C26C9CD0D89D").is_err());
        assert!(UploadHash::from_hex("a9993e").is_err());
        assert!(UploadHash::from_hex("../../../../../../../../../../etc/passwd").is_err());
    }

    proptest! {
        #[test]
        fn prop_upload_hash_is_deterministic(pass in "[a-z]{1,12}(-[a-z]{1,12}){0,9}") {
            let deriver = Deriver::new("pepper");
            let h1 = deriver.upload_hash(&pass);
            let h2 = deriver.upload_hash(&pass);
            prop_assert!(is_upload_hash(h1.as_str()));
            prop_assert_eq!(h1, h2);
        }

        #[test]
        fn prop_distinct_passphrases_distinct_hashes(
            a in "[a-z]{1,12}(-[a-z]{1,12}){0,4}",
            b in "[a-z]{1,12}(-[a-z]{1,12}){0,4}",
        ) {
            prop_assume!(a != b);
            let deriver = Deriver::new("pepper");
            prop_assert_ne!(deriver.upload_hash(&a), deriver.upload_hash(&b));
        }
    }
}
