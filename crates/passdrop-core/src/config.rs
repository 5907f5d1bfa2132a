//! Drop service configuration

use passdrop_store::{DEFAULT_DIR_MODE, ExpiryPolicy};
use serde::Serialize;
use std::path::PathBuf;

/// Immutable settings for a [`DropService`](crate::DropService)
#[derive(Clone, Serialize)]
pub struct DropConfig {
    /// Server-wide salt for upload hashes and encryption keys
    pub hash_salt: String,
    /// Object lifetime in seconds, 0 to keep forever
    pub ttl_secs: u64,
    /// Largest accepted payload (bytes)
    pub max_upload_size: u64,
    /// Words per minted passphrase, clamped to [1, 10]
    pub pass_words_count: usize,
    /// Directory holding the bucket tree
    pub storage_root: PathBuf,
    /// Newline-delimited word list
    pub word_list: PathBuf,
    /// Encrypt new uploads at rest
    pub encryption_enabled: bool,
    /// Mode for created bucket directories
    #[serde(serialize_with = "serialize_mode")]
    pub dir_mode: u32,
    /// Upload names are truncated to this many characters
    pub upload_name_max_len: usize,
    /// Record client address and user agent in sidecars
    pub trace_client_info: bool,
    /// Log one line per upload, download and delete
    pub log_activity: bool,
    /// Log passphrases in clear text
    pub log_passwords: bool,
}

impl Default for DropConfig {
    fn default() -> Self {
        Self {
            hash_salt: String::new(),
            ttl_secs: 24 * 60 * 60, // 1 day
            max_upload_size: 1024 * 1024, // 1 MiB
            pass_words_count: 3,
            storage_root: PathBuf::from("/tmp"),
            word_list: PathBuf::from("./wordslist.txt"),
            encryption_enabled: false,
            dir_mode: DEFAULT_DIR_MODE,
            upload_name_max_len: 255,
            trace_client_info: true,
            log_activity: true,
            log_passwords: false,
        }
    }
}

impl DropConfig {
    /// Expiry policy derived from `ttl_secs`
    pub fn policy(&self) -> ExpiryPolicy {
        ExpiryPolicy::from_secs(self.ttl_secs)
    }

    /// Copy suitable for display, with the salt hidden
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if !copy.hash_salt.is_empty() {
            copy.hash_salt = "***".to_string();
        }
        copy
    }
}

impl std::fmt::Debug for DropConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DropConfig")
            .field("hash_salt", &"[redacted]")
            .field("ttl_secs", &self.ttl_secs)
            .field("max_upload_size", &self.max_upload_size)
            .field("pass_words_count", &self.pass_words_count)
            .field("storage_root", &self.storage_root)
            .field("word_list", &self.word_list)
            .field("encryption_enabled", &self.encryption_enabled)
            .field("dir_mode", &format_args!("{:o}", self.dir_mode))
            .field("upload_name_max_len", &self.upload_name_max_len)
            .field("trace_client_info", &self.trace_client_info)
            .field("log_activity", &self.log_activity)
            .field("log_passwords", &self.log_passwords)
            .finish()
    }
}

fn serialize_mode<S: serde::Serializer>(mode: &u32, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format!("{:04o}", mode))
}
