//! Bulk purge of expired objects
//!
//! Walks `<root>/<aa>/<bb>/` and removes every payload whose modification
//! time is past the TTL, together with its sidecar. Stale partial writes and
//! sidecars whose payload is gone are removed once they are old enough too.
//!
//! The sweep is safe next to live traffic: readers keep their open handles
//! across an unlink, and files that vanish mid-sweep are skipped. Running it
//! twice is harmless.

use crate::{
    Result, StoreError,
    layout::{BucketLayout, EntryKind, classify, is_shard_component},
    lifecycle::{ExpiryPolicy, ObjectState},
};
use serde::Serialize;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::time::SystemTime;
use tracing::{debug, info, warn};

/// Outcome of a sweep
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PurgeReport {
    /// Payload files examined
    pub scanned: usize,
    /// Expired payloads removed
    pub purged: usize,
    /// Stale partial writes and orphaned sidecars removed
    pub leftovers: usize,
    /// Files or directories that could not be read or removed
    pub failures: usize,
}

impl PurgeReport {
    /// Whether every expired file was dealt with
    pub fn is_clean(&self) -> bool {
        self.failures == 0
    }
}

/// Remove everything that has expired as of `now`
///
/// Fails only if the storage root itself cannot be listed; per-file problems
/// are counted in [`PurgeReport::failures`].
pub fn purge_expired(
    layout: &BucketLayout,
    policy: ExpiryPolicy,
    now: SystemTime,
) -> Result<PurgeReport> {
    let mut report = PurgeReport::default();
    if policy.ttl().is_none() {
        debug!("Expiry disabled, nothing to purge");
        return Ok(report);
    }

    let root = layout.root();
    let top = fs::read_dir(root).map_err(|source| StoreError::Scan {
        path: root.to_path_buf(),
        source,
    })?;

    for first in shard_dirs(top, &mut report) {
        let Some(second_level) = read_dir_counted(&first, &mut report) else {
            continue;
        };
        for bucket in shard_dirs(second_level, &mut report) {
            sweep_bucket(layout, &bucket, policy, now, &mut report);
        }
    }

    info!(
        scanned = report.scanned,
        purged = report.purged,
        leftovers = report.leftovers,
        failures = report.failures,
        "Purge complete"
    );
    Ok(report)
}

fn shard_dirs(entries: fs::ReadDir, report: &mut PurgeReport) -> Vec<std::path::PathBuf> {
    let mut dirs = Vec::new();
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "Cannot read directory entry");
                report.failures += 1;
                continue;
            }
        };
        let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
        let name = entry.file_name();
        if is_dir && name.to_str().is_some_and(is_shard_component) {
            dirs.push(entry.path());
        }
    }
    dirs
}

fn read_dir_counted(dir: &Path, report: &mut PurgeReport) -> Option<fs::ReadDir> {
    match fs::read_dir(dir) {
        Ok(entries) => Some(entries),
        Err(e) if e.kind() == ErrorKind::NotFound => None,
        Err(e) => {
            warn!(path = %dir.display(), error = %e, "Cannot scan bucket");
            report.failures += 1;
            None
        }
    }
}

fn sweep_bucket(
    layout: &BucketLayout,
    bucket: &Path,
    policy: ExpiryPolicy,
    now: SystemTime,
    report: &mut PurgeReport,
) {
    let Some(entries) = read_dir_counted(bucket, report) else {
        return;
    };

    for entry in entries.flatten() {
        let name = entry.file_name();
        let Some(kind) = name.to_str().and_then(classify) else {
            continue;
        };
        let path = entry.path();

        let modified = match entry.metadata().and_then(|m| m.modified()) {
            Ok(modified) => modified,
            Err(e) if e.kind() == ErrorKind::NotFound => continue,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Cannot stat file");
                report.failures += 1;
                continue;
            }
        };
        if matches!(kind, EntryKind::Payload(_)) {
            report.scanned += 1;
        }
        if policy.state_at(modified, now) != ObjectState::Expired {
            continue;
        }

        match kind {
            EntryKind::Payload(hash) => {
                if remove(&path, report) {
                    report.purged += 1;
                    debug!(hash = %hash, "Purged expired object");
                }
                remove(&layout.sidecar_path(&hash), report);
            }
            EntryKind::Sidecar(hash) => {
                if !layout.payload_path(&hash).exists() && remove(&path, report) {
                    report.leftovers += 1;
                }
            }
            EntryKind::Partial => {
                if remove(&path, report) {
                    report.leftovers += 1;
                }
            }
        }
    }
}

/// Unlink a file; returns whether this call removed it
fn remove(path: &Path, report: &mut PurgeReport) -> bool {
    match fs::remove_file(path) {
        Ok(()) => true,
        Err(e) if e.kind() == ErrorKind::NotFound => false,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Cannot delete file");
            report.failures += 1;
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{backdate, hash};
    use crate::{FsObjectStore, ObjectMetadata, ObjectStore};
    use bytes::Bytes;
    use std::time::Duration;
    use tempfile::TempDir;

    const TTL: u64 = 3600;

    async fn seeded(root: &TempDir, passphrases: &[&str]) -> FsObjectStore {
        let store = FsObjectStore::new(
            BucketLayout::new(root.path()),
            ExpiryPolicy::from_secs(TTL),
            0o700,
        );
        for p in passphrases {
            store
                .put(&hash(p), Bytes::from_static(b"payload"), &ObjectMetadata::new(*p, 7))
                .await
                .unwrap();
        }
        store
    }

    #[tokio::test]
    async fn test_purges_only_expired() {
        let root = TempDir::new().unwrap();
        let store = seeded(&root, &["old-one", "new-one"]).await;
        let layout = store.layout().clone();

        backdate(&layout.payload_path(&hash("old-one")), TTL + 1);
        backdate(&layout.payload_path(&hash("new-one")), TTL - 1);

        let report =
            purge_expired(&layout, ExpiryPolicy::from_secs(TTL), SystemTime::now()).unwrap();

        assert_eq!(report.scanned, 2);
        assert_eq!(report.purged, 1);
        assert!(report.is_clean());
        assert!(!layout.payload_path(&hash("old-one")).exists());
        assert!(!layout.sidecar_path(&hash("old-one")).exists());
        assert!(layout.payload_path(&hash("new-one")).exists());
        assert!(layout.sidecar_path(&hash("new-one")).exists());
    }

    #[tokio::test]
    async fn test_is_idempotent() {
        let root = TempDir::new().unwrap();
        let store = seeded(&root, &["gone"]).await;
        let layout = store.layout().clone();
        backdate(&layout.payload_path(&hash("gone")), TTL * 2);

        let policy = ExpiryPolicy::from_secs(TTL);
        let first = purge_expired(&layout, policy, SystemTime::now()).unwrap();
        let second = purge_expired(&layout, policy, SystemTime::now()).unwrap();

        assert_eq!(first.purged, 1);
        assert_eq!(second.purged, 0);
        assert!(second.is_clean());
    }

    #[tokio::test]
    async fn test_future_mtime_survives() {
        let root = TempDir::new().unwrap();
        let store = seeded(&root, &["skewed"]).await;
        let layout = store.layout().clone();

        // Sweep host clock runs behind the writer's.
        let lagging_now = SystemTime::now() - Duration::from_secs(600);
        let report = purge_expired(&layout, ExpiryPolicy::from_secs(1), lagging_now).unwrap();

        assert_eq!(report.purged, 0);
        assert!(layout.payload_path(&hash("skewed")).exists());
    }

    #[tokio::test]
    async fn test_zero_ttl_is_noop() {
        let root = TempDir::new().unwrap();
        let store = seeded(&root, &["kept"]).await;
        let layout = store.layout().clone();
        backdate(&layout.payload_path(&hash("kept")), TTL * 100);

        let report = purge_expired(&layout, ExpiryPolicy::never(), SystemTime::now()).unwrap();

        assert_eq!(report, PurgeReport::default());
        assert!(layout.payload_path(&hash("kept")).exists());
    }

    #[tokio::test]
    async fn test_removes_leftovers_and_ignores_foreign_files() {
        let root = TempDir::new().unwrap();
        let store = seeded(&root, &["orphan"]).await;
        let layout = store.layout().clone();
        let h = hash("orphan");

        std::fs::remove_file(layout.payload_path(&h)).unwrap();
        backdate(&layout.sidecar_path(&h), TTL + 5);

        let partial = layout.partial_path(&h);
        std::fs::write(&partial, b"half").unwrap();
        backdate(&partial, TTL + 5);

        let foreign = layout.bucket_dir(&h).join("README");
        std::fs::write(&foreign, b"keep me").unwrap();
        backdate(&foreign, TTL + 5);
        std::fs::create_dir(root.path().join("lost+found")).unwrap();

        let report =
            purge_expired(&layout, ExpiryPolicy::from_secs(TTL), SystemTime::now()).unwrap();

        assert_eq!(report.leftovers, 2);
        assert!(!layout.sidecar_path(&h).exists());
        assert!(!partial.exists());
        assert!(foreign.exists());
    }

    #[test]
    fn test_missing_root_fails() {
        let layout = BucketLayout::new("/nonexistent/passdrop-root");
        let err = purge_expired(&layout, ExpiryPolicy::from_secs(TTL), SystemTime::now());
        assert!(matches!(err, Err(StoreError::Scan { .. })));
    }
}
