//! Administrative commands

use crate::ServerConfig;
use passdrop_core::DropConfig;
use passdrop_store::{BucketLayout, PurgeReport, purge_expired};
use std::time::SystemTime;

/// Sweep expired objects from the storage root
pub fn purge(config: &DropConfig) -> anyhow::Result<PurgeReport> {
    let layout = BucketLayout::new(&config.storage_root);
    Ok(purge_expired(&layout, config.policy(), SystemTime::now())?)
}

/// One-paragraph summary of a sweep
pub fn purge_summary(config: &DropConfig, report: &PurgeReport) -> String {
    if config.ttl_secs == 0 {
        return "Expiration is disabled, nothing to purge.".to_string();
    }
    let mut summary = format!(
        "Purged {} of {} file(s) older than {} second(s) under {}",
        report.purged,
        report.scanned,
        config.ttl_secs,
        config.storage_root.display(),
    );
    if report.leftovers > 0 {
        summary.push_str(&format!(", removed {} leftover file(s)", report.leftovers));
    }
    if report.failures > 0 {
        summary.push_str(&format!(", {} failure(s)", report.failures));
    }
    summary.push('.');
    summary
}

/// Effective configuration as pretty JSON, with secrets hidden
pub fn config_json(config: &ServerConfig) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(&config.redacted())?)
}
