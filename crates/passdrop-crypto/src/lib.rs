//! # Passdrop Crypto
//!
//! Secret handling for the Passdrop file drop.
//!
//! This crate provides:
//! - **Passphrases**: human-typable secrets drawn from a word list
//! - **Derivation**: salted SHA-1 upload hashes and encryption keys
//! - **Payload encryption**: HKDF-SHA256 stretched AES-256-GCM
//!
//! ## Security Model
//!
//! The passphrase is the only credential. The server stores nothing that
//! lets it recover the passphrase or the encryption key: the upload hash is
//! a one-way digest and the key exists only while a request is served.
//!
//! ## Example
//!
//! ```rust,ignore
//! use passdrop_crypto::{Deriver, PassphraseGenerator, symmetric};
//!
//! let passphrase = PassphraseGenerator::open("wordslist.txt", 3)?.generate()?;
//! let deriver = Deriver::new("server-salt");
//! let hash = deriver.upload_hash(&passphrase);
//! let sealed = symmetric::seal(&deriver.encryption_key(&passphrase), b"data")?;
//! ```

pub mod error;
pub mod hashing;
pub mod keys;
pub mod passphrase;
pub mod symmetric;

pub use error::{CryptoError, Result};
pub use hashing::{Deriver, UploadHash, is_upload_hash};
pub use keys::{EncryptionKey, PayloadKey};
pub use passphrase::PassphraseGenerator;
