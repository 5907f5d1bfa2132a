//! # Passdrop Store
//!
//! Filesystem storage layer for Passdrop.
//!
//! This crate provides:
//! - **Object store**: Put, get, and delete payloads addressed by upload hash
//! - **Bucketing**: Two-level `aa/bb/` directory sharding of the hash space
//! - **Sidecars**: JSON metadata stored next to each payload
//! - **Expiry**: Modification-time based TTL with lazy eviction
//! - **Purge**: Bulk sweep of expired objects
//! - **Codec**: Optional encryption at rest
//!
//! ## Layout
//!
//! ```text
//! <root>/
//! └── 3f/
//!     └── a9/
//!         ├── 3fa9...c1        payload
//!         └── 3fa9...c1.json   sidecar
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use passdrop_store::{BucketLayout, ExpiryPolicy, FsObjectStore, ObjectStore};
//!
//! let store = FsObjectStore::new(BucketLayout::new("/tmp"), ExpiryPolicy::from_secs(86400), 0o700);
//! store.put(&hash, payload, &metadata).await?;
//! let object = store.get(&hash).await?;
//! ```

pub mod codec;
pub mod error;
pub mod filesystem;
pub mod layout;
pub mod lifecycle;
pub mod metadata;
pub mod purge;

pub use codec::{Encoded, Payload, PayloadCodec};
pub use error::{Result, StoreError};
pub use filesystem::{FsObjectStore, StoredObject};
pub use layout::BucketLayout;
pub use lifecycle::{ExpiryPolicy, ObjectState};
pub use metadata::{ClientInfo, ObjectMetadata};
pub use purge::{PurgeReport, purge_expired};

use async_trait::async_trait;
use bytes::Bytes;
use passdrop_crypto::UploadHash;

/// Default permissions for bucket directories
pub const DEFAULT_DIR_MODE: u32 = 0o700;

/// Trait for object storage backends
///
/// Expired objects behave as absent: every operation that touches one
/// removes it and reports [`StoreError::Expired`] or `false`.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store a payload and its sidecar, replacing any previous object
    async fn put(&self, hash: &UploadHash, payload: Bytes, metadata: &ObjectMetadata) -> Result<()>;

    /// Check if a live object exists
    async fn exists(&self, hash: &UploadHash) -> Result<bool>;

    /// Open a live object for reading
    async fn get(&self, hash: &UploadHash) -> Result<StoredObject>;

    /// Delete a live object
    ///
    /// Returns `Ok(false)` if the object exists but could not be removed.
    async fn delete(&self, hash: &UploadHash) -> Result<bool>;
}
