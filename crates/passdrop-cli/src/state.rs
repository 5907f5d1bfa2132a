//! Application state

use crate::config::ServerConfig;
use passdrop_core::DropService;
use passdrop_store::FsObjectStore;
use tracing::{info, warn};

/// Application state shared across handlers
pub struct AppState {
    /// Server configuration
    pub config: ServerConfig,
    /// Drop service over the configured storage root
    pub drop: DropService<FsObjectStore>,
}

impl AppState {
    /// Validate the configuration and open the storage root
    pub fn new(config: ServerConfig) -> anyhow::Result<Self> {
        let drop = DropService::open(config.drop.clone())?;

        info!(
            root = %config.drop.storage_root.display(),
            ttl_secs = config.drop.ttl_secs,
            max_upload_size = config.drop.max_upload_size,
            words = drop.pass_words_count(),
            encryption = config.drop.encryption_enabled,
            "Storage ready"
        );
        if config.drop.hash_salt.is_empty() {
            warn!("HASH_SALT is empty, upload addresses only depend on the passphrase");
        }
        if config.drop.log_passwords {
            warn!("Passphrases will be written to the log in clear text");
        }

        Ok(Self { config, drop })
    }
}
