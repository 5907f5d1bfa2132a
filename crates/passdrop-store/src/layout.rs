//! On-disk layout of the bucket tree
//!
//! ```text
//! <root>/<hash[0:2]>/<hash[2:4]>/<hash>               payload
//! <root>/<hash[0:2]>/<hash[2:4]>/<hash>.json          metadata sidecar
//! <root>/<hash[0:2]>/<hash[2:4]>/<hash>.<uuid>.part   write in progress
//! ```

use passdrop_crypto::{UploadHash, is_upload_hash};
use std::path::{Path, PathBuf};

/// Extension of the metadata sidecar
pub const SIDECAR_EXTENSION: &str = "json";

/// Extension of a payload that is still being written
pub const PARTIAL_EXTENSION: &str = "part";

/// Maps upload hashes to paths under a storage root
#[derive(Clone, Debug)]
pub struct BucketLayout {
    root: PathBuf,
}

impl BucketLayout {
    /// Create a layout rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The storage root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `<root>/aa/bb` for a hash starting with `aabb`
    pub fn bucket_dir(&self, hash: &UploadHash) -> PathBuf {
        let (first, second) = hash.shard();
        self.root.join(first).join(second)
    }

    /// Path of the payload file
    pub fn payload_path(&self, hash: &UploadHash) -> PathBuf {
        self.bucket_dir(hash).join(hash.as_str())
    }

    /// Path of the metadata sidecar
    pub fn sidecar_path(&self, hash: &UploadHash) -> PathBuf {
        self.bucket_dir(hash)
            .join(format!("{}.{}", hash, SIDECAR_EXTENSION))
    }

    /// A unique temporary path next to the payload
    pub fn partial_path(&self, hash: &UploadHash) -> PathBuf {
        self.bucket_dir(hash).join(format!(
            "{}.{}.{}",
            hash,
            uuid::Uuid::new_v4().simple(),
            PARTIAL_EXTENSION
        ))
    }
}

/// Kind of file found inside a bucket
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EntryKind {
    /// `<hash>`
    Payload(UploadHash),
    /// `<hash>.json`
    Sidecar(UploadHash),
    /// `<hash>.<uuid>.part`
    Partial,
}

/// Classify a bucket entry by file name; foreign files yield `None`
pub fn classify(file_name: &str) -> Option<EntryKind> {
    if is_upload_hash(file_name) {
        return UploadHash::from_hex(file_name).ok().map(EntryKind::Payload);
    }

    let (stem, extension) = file_name.rsplit_once('.')?;
    match extension {
        SIDECAR_EXTENSION if is_upload_hash(stem) => {
            UploadHash::from_hex(stem).ok().map(EntryKind::Sidecar)
        }
        PARTIAL_EXTENSION => {
            let (hash, id) = stem.split_once('.')?;
            (is_upload_hash(hash) && uuid::Uuid::try_parse(id).is_ok()).then_some(EntryKind::Partial)
        }
        _ => None,
    }
}

/// Whether a directory name is a valid shard level (two lowercase hex characters)
pub fn is_shard_component(name: &str) -> bool {
    name.len() == 2 && name.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}
