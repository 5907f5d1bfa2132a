//! Upload, fetch and delete by passphrase

use crate::{
    DropConfig, DropError, Result, ValidationError,
    naming::{resolve_file_name, sanitize_upload_name},
};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use passdrop_crypto::{Deriver, PassphraseGenerator, passphrase::mask};
use passdrop_store::{
    BucketLayout, ClientInfo, ExpiryPolicy, FsObjectStore, ObjectMetadata, ObjectStore, Payload,
    PayloadCodec, StoreError,
};
use std::path::Path;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, info, instrument, warn};

/// What the uploader gets back
#[derive(Clone, Debug)]
pub struct UploadReceipt {
    /// The only credential for the object
    pub passphrase: String,
    /// Sanitized display name
    pub upload_name: String,
    /// `/<passphrase>/<upload name>`
    pub retrieval_path: String,
    /// Plaintext size in bytes
    pub size: u64,
    /// When the object stops being served, if it ever does
    pub expires_at: Option<DateTime<Utc>>,
}

/// A payload ready to be sent
#[derive(Debug)]
pub struct Download {
    pub payload: Payload,
    pub file_name: String,
    pub content_type: String,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Result of a fetch
///
/// Missing, expired and undecryptable objects all come back as `NotFound`.
#[derive(Debug)]
pub enum Lookup {
    Found(Download),
    NotFound,
}

/// Result of a delete
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    NotFound,
}

/// Passphrase-addressed drop over an object store
pub struct DropService<S: ObjectStore> {
    config: DropConfig,
    store: Arc<S>,
    deriver: Deriver,
    generator: PassphraseGenerator,
    codec: PayloadCodec,
    policy: ExpiryPolicy,
}

impl DropService<FsObjectStore> {
    /// Build a service over the configured storage root
    ///
    /// Fails if the word list or storage root is unusable.
    pub fn open(config: DropConfig) -> Result<Self> {
        check_storage_root(&config.storage_root)?;
        let store = FsObjectStore::new(
            BucketLayout::new(&config.storage_root),
            config.policy(),
            config.dir_mode,
        );
        Self::with_store(config, Arc::new(store))
    }
}

impl<S: ObjectStore> DropService<S> {
    /// Build a service over an existing store
    pub fn with_store(config: DropConfig, store: Arc<S>) -> Result<Self> {
        let generator = PassphraseGenerator::open(&config.word_list, config.pass_words_count)
            .map_err(|e| DropError::Configuration(e.to_string()))?;

        Ok(Self {
            deriver: Deriver::new(config.hash_salt.as_bytes()),
            codec: PayloadCodec::new(config.encryption_enabled),
            policy: config.policy(),
            generator,
            store,
            config,
        })
    }

    /// Effective configuration
    pub fn config(&self) -> &DropConfig {
        &self.config
    }

    /// Expiry policy in force
    pub fn policy(&self) -> ExpiryPolicy {
        self.policy
    }

    /// Words per minted passphrase after clamping
    pub fn pass_words_count(&self) -> usize {
        self.generator.word_count()
    }

    /// Store a single uploaded file under a freshly minted passphrase
    #[instrument(skip(self, files, client), fields(files = files.len()))]
    pub async fn upload(
        &self,
        name: &str,
        mut files: Vec<Bytes>,
        client: ClientInfo,
    ) -> Result<UploadReceipt> {
        let upload_name = sanitize_upload_name(name, self.config.upload_name_max_len);
        if upload_name.is_empty() {
            return Err(ValidationError::MissingName.into());
        }
        let payload = match files.len() {
            0 => return Err(ValidationError::NoFile.into()),
            1 => files.remove(0),
            _ => return Err(ValidationError::TooManyFiles.into()),
        };
        let size = payload.len() as u64;
        if size > self.config.max_upload_size {
            debug!(size, max = self.config.max_upload_size, "Rejected oversized upload");
            return Err(ValidationError::PayloadTooLarge {
                max: self.config.max_upload_size,
            }
            .into());
        }

        // The word list is re-read on every draw.
        let generator = self.generator.clone();
        let passphrase = tokio::task::spawn_blocking(move || generator.generate())
            .await?
            .map_err(|e| DropError::Configuration(e.to_string()))?;
        let hash = self.deriver.upload_hash(&passphrase);
        let key = self.deriver.encryption_key(&passphrase);

        let encoded = self
            .codec
            .encode(payload, &key)
            .await
            .map_err(DropError::StorageWrite)?;

        let mut metadata =
            ObjectMetadata::new(upload_name.clone(), size).with_encryption(encoded.encryption_enabled);
        if self.config.trace_client_info {
            metadata = metadata.with_client(client);
        }

        self.store
            .put(&hash, encoded.bytes, &metadata)
            .await
            .map_err(DropError::StorageWrite)?;

        if self.config.log_activity {
            info!(
                hash = %hash,
                passphrase = %self.loggable(&passphrase),
                name = %upload_name,
                size,
                encrypted = metadata.encryption_enabled,
                remote_ip = metadata.remote_ip.as_deref().unwrap_or("-"),
                "Stored upload"
            );
        }

        Ok(UploadReceipt {
            retrieval_path: format!("/{}/{}", passphrase, upload_name),
            expires_at: self.policy.expires_at(SystemTime::now()).and_then(to_utc),
            passphrase,
            upload_name,
            size,
        })
    }

    /// Look up an object by passphrase
    ///
    /// `requested_name` overrides the stored display name.
    #[instrument(skip_all)]
    pub async fn fetch(&self, passphrase: &str, requested_name: Option<&str>) -> Result<Lookup> {
        match self.locate(passphrase, requested_name).await {
            Ok(download) => Ok(Lookup::Found(download)),
            Err(e) if e.is_not_found() => {
                debug!(reason = %e, "Fetch resolved to not found");
                Ok(Lookup::NotFound)
            }
            Err(e) => Err(e),
        }
    }

    async fn locate(&self, passphrase: &str, requested_name: Option<&str>) -> Result<Download> {
        if passphrase.is_empty() {
            return Err(DropError::NotFound);
        }
        let hash = self.deriver.upload_hash(passphrase);
        let object = self.store.get(&hash).await.map_err(read_error)?;

        let stored_name = object
            .metadata
            .as_ref()
            .and_then(|m| m.upload_name.clone());
        let expires_at = object.expires_at.and_then(to_utc);

        let key = self.deriver.encryption_key(passphrase);
        let payload = self
            .codec
            .decode(object, &key)
            .await
            .map_err(read_error)?;

        let file_name = resolve_file_name(
            requested_name,
            stored_name.as_deref(),
            self.config.upload_name_max_len,
            Utc::now(),
        );
        let content_type = mime_guess::from_path(&file_name)
            .first_or_octet_stream()
            .to_string();

        if self.config.log_activity {
            info!(
                hash = %hash,
                passphrase = %self.loggable(passphrase),
                name = %file_name,
                size = payload.len(),
                "Serving download"
            );
        }

        Ok(Download {
            payload,
            file_name,
            content_type,
            expires_at,
        })
    }

    /// Delete an object by passphrase
    #[instrument(skip_all)]
    pub async fn delete(&self, passphrase: &str) -> Result<DeleteOutcome> {
        if passphrase.is_empty() {
            return Ok(DeleteOutcome::NotFound);
        }
        let hash = self.deriver.upload_hash(passphrase);

        match self.store.delete(&hash).await {
            Ok(true) => {
                if self.config.log_activity {
                    info!(
                        hash = %hash,
                        passphrase = %self.loggable(passphrase),
                        "Deleted upload"
                    );
                }
                Ok(DeleteOutcome::Deleted)
            }
            Ok(false) => Err(DropError::StorageDelete(hash.to_string())),
            Err(e) if e.is_not_found() => {
                debug!(reason = %e, "Delete resolved to not found");
                Ok(DeleteOutcome::NotFound)
            }
            Err(e) => Err(DropError::Storage(e)),
        }
    }

    fn loggable(&self, passphrase: &str) -> String {
        if self.config.log_passwords {
            passphrase.to_string()
        } else {
            mask(passphrase)
        }
    }
}

/// Convert to a calendar instant, `None` when chrono cannot represent it
fn to_utc(instant: SystemTime) -> Option<DateTime<Utc>> {
    let since_epoch = instant.duration_since(UNIX_EPOCH).ok()?;
    let secs = i64::try_from(since_epoch.as_secs()).ok()?;
    DateTime::from_timestamp(secs, since_epoch.subsec_nanos())
}

fn read_error(err: StoreError) -> DropError {
    if err.is_not_found() {
        DropError::NotFound
    } else if err.is_decryption_failure() {
        DropError::Decryption
    } else {
        DropError::Storage(err)
    }
}

/// The storage root must be an existing directory we can create files in
fn check_storage_root(root: &Path) -> Result<()> {
    let meta = std::fs::metadata(root).map_err(|e| {
        DropError::Configuration(format!("storage root {} is unusable: {}", root.display(), e))
    })?;
    if !meta.is_dir() {
        return Err(DropError::Configuration(format!(
            "storage root {} is not a directory",
            root.display()
        )));
    }

    let probe = root.join(format!(".passdrop-probe-{}", std::process::id()));
    std::fs::write(&probe, b"").map_err(|e| {
        DropError::Configuration(format!("storage root {} is not writable: {}", root.display(), e))
    })?;
    if let Err(e) = std::fs::remove_file(&probe) {
        warn!(path = %probe.display(), error = %e, "Could not remove write probe");
    }
    Ok(())
}
