//! Hash-bucketed filesystem object store
//!
//! The filesystem is the only index: an object is reachable exactly when its
//! upload hash is known. Nothing here lists buckets on behalf of a client.

use crate::{
    ObjectStore, Result, StoreError,
    layout::BucketLayout,
    lifecycle::{ExpiryPolicy, ObjectState},
    metadata::ObjectMetadata,
};
use async_trait::async_trait;
use bytes::Bytes;
use passdrop_crypto::UploadHash;
use std::io::ErrorKind;
use std::path::Path;
use std::time::SystemTime;
use tokio::fs;
use tracing::{debug, error, instrument, warn};

/// An opened payload together with its sidecar
#[derive(Debug)]
pub struct StoredObject {
    /// Address of the object
    pub hash: UploadHash,
    /// Open handle on the payload; survives a concurrent unlink
    pub file: fs::File,
    /// Size of the payload on disk
    pub len: u64,
    /// Payload modification time
    pub modified: SystemTime,
    /// Expiry instant, if a TTL is configured
    pub expires_at: Option<SystemTime>,
    /// Parsed sidecar, absent if missing or unreadable
    pub metadata: Option<ObjectMetadata>,
}

/// Object store over a two-level bucket tree
#[derive(Clone, Debug)]
pub struct FsObjectStore {
    layout: BucketLayout,
    policy: ExpiryPolicy,
    dir_mode: u32,
}

impl FsObjectStore {
    /// Create a store; `dir_mode` applies to bucket directories it creates
    pub fn new(layout: BucketLayout, policy: ExpiryPolicy, dir_mode: u32) -> Self {
        Self {
            layout,
            policy,
            dir_mode,
        }
    }

    /// Bucket layout in use
    pub fn layout(&self) -> &BucketLayout {
        &self.layout
    }

    /// Expiry policy in use
    pub fn policy(&self) -> ExpiryPolicy {
        self.policy
    }

    /// Remove both files of an expired object, ignoring failures
    async fn evict(&self, hash: &UploadHash) {
        for path in [self.layout.payload_path(hash), self.layout.sidecar_path(hash)] {
            if let Err(e) = fs::remove_file(&path).await {
                if e.kind() != ErrorKind::NotFound {
                    debug!(path = %path.display(), error = %e, "Eviction left a file behind");
                }
            }
        }
        debug!(hash = %hash, "Evicted expired object");
    }

    /// Check that a live payload exists, evicting it if it has expired
    async fn check_live(&self, hash: &UploadHash) -> Result<std::fs::Metadata> {
        let path = self.layout.payload_path(hash);
        let meta = match fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => meta,
            Ok(_) => return Err(StoreError::NotFound(hash.clone())),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StoreError::NotFound(hash.clone()));
            }
            Err(e) => return Err(e.into()),
        };

        if self.policy.state(meta.modified()?) == ObjectState::Expired {
            self.evict(hash).await;
            return Err(StoreError::Expired(hash.clone()));
        }
        Ok(meta)
    }

    /// Read the sidecar; a missing or corrupt sidecar yields `None`
    async fn read_metadata(&self, hash: &UploadHash) -> Option<ObjectMetadata> {
        let path = self.layout.sidecar_path(hash);
        let raw = match fs::read(&path).await {
            Ok(raw) => raw,
            Err(e) => {
                if e.kind() != ErrorKind::NotFound {
                    warn!(hash = %hash, error = %e, "Cannot read metadata sidecar");
                }
                return None;
            }
        };
        match serde_json::from_slice(&raw) {
            Ok(meta) => Some(meta),
            Err(e) => {
                warn!(hash = %hash, error = %e, "Ignoring malformed metadata sidecar");
                None
            }
        }
    }

    async fn write_payload(&self, hash: &UploadHash, payload: &[u8]) -> Result<()> {
        let partial = self.layout.partial_path(hash);
        let target = self.layout.payload_path(hash);

        if let Err(source) = fs::write(&partial, payload).await {
            let _ = fs::remove_file(&partial).await;
            return Err(StoreError::Write {
                path: partial,
                source,
            });
        }
        // A sidecar from an earlier object under this hash must not outlive it.
        let stale = self.layout.sidecar_path(hash);
        if let Err(e) = fs::remove_file(&stale).await {
            if e.kind() != ErrorKind::NotFound {
                warn!(hash = %hash, error = %e, "Could not remove previous metadata sidecar");
            }
        }

        // Rename keeps readers from ever seeing a half-written payload.
        if let Err(source) = fs::rename(&partial, &target).await {
            let _ = fs::remove_file(&partial).await;
            return Err(StoreError::Write {
                path: target,
                source,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl ObjectStore for FsObjectStore {
    #[instrument(skip(self, payload, metadata), fields(size = payload.len()))]
    async fn put(&self, hash: &UploadHash, payload: Bytes, metadata: &ObjectMetadata) -> Result<()> {
        let dir = self.layout.bucket_dir(hash);
        create_bucket_dir(&dir, self.dir_mode)
            .await
            .map_err(|source| {
                error!(path = %dir.display(), error = %source, "Cannot create bucket directory");
                StoreError::CreateDir {
                    path: dir.clone(),
                    source,
                }
            })?;

        self.write_payload(hash, &payload).await?;

        // A lost sidecar only degrades the download name; the upload stands.
        let sidecar = self.layout.sidecar_path(hash);
        match serde_json::to_vec(metadata) {
            Ok(json) => {
                if let Err(e) = fs::write(&sidecar, json).await {
                    error!(hash = %hash, error = %e, "Could not write metadata sidecar");
                }
            }
            Err(e) => error!(hash = %hash, error = %e, "Could not serialize metadata"),
        }

        debug!(hash = %hash, "Stored object");
        Ok(())
    }

    async fn exists(&self, hash: &UploadHash) -> Result<bool> {
        match self.check_live(hash).await {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    #[instrument(skip(self))]
    async fn get(&self, hash: &UploadHash) -> Result<StoredObject> {
        let path = self.layout.payload_path(hash);
        let file = match fs::File::open(&path).await {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StoreError::NotFound(hash.clone()));
            }
            Err(e) => return Err(e.into()),
        };

        // Stat the open handle so size and mtime describe what will be read.
        let stat = file.metadata().await?;
        if !stat.is_file() {
            return Err(StoreError::NotFound(hash.clone()));
        }
        let modified = stat.modified()?;
        if self.policy.state(modified) == ObjectState::Expired {
            drop(file);
            self.evict(hash).await;
            return Err(StoreError::Expired(hash.clone()));
        }

        Ok(StoredObject {
            hash: hash.clone(),
            file,
            len: stat.len(),
            modified,
            expires_at: self.policy.expires_at(modified),
            metadata: self.read_metadata(hash).await,
        })
    }

    #[instrument(skip(self))]
    async fn delete(&self, hash: &UploadHash) -> Result<bool> {
        self.check_live(hash).await?;

        if let Err(e) = fs::remove_file(self.layout.payload_path(hash)).await {
            if e.kind() == ErrorKind::NotFound {
                // Lost a race with another delete or the purge sweep.
                return Err(StoreError::NotFound(hash.clone()));
            }
            error!(hash = %hash, error = %e, "Could not delete payload");
            return Ok(false);
        }

        if let Err(e) = fs::remove_file(self.layout.sidecar_path(hash)).await {
            if e.kind() != ErrorKind::NotFound {
                warn!(hash = %hash, error = %e, "Could not delete metadata sidecar");
            }
        }
        Ok(true)
    }
}

async fn create_bucket_dir(dir: &Path, mode: u32) -> std::io::Result<()> {
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    builder.mode(mode);
    #[cfg(not(unix))]
    let _ = mode;
    builder.create(dir).await
}
