//! Display names for uploads and downloads

use chrono::{DateTime, Utc};

/// Prefix of generated download names
pub const DEFAULT_NAME_PREFIX: &str = "passdrop-file-";

/// Reduce a client-supplied name to a display label
///
/// The name is cut to `max_len` characters and then stripped of any
/// directory components. Returns an empty string if nothing usable remains.
pub fn sanitize_upload_name(name: &str, max_len: usize) -> String {
    let truncated = match name.char_indices().nth(max_len) {
        Some((end, _)) => &name[..end],
        None => name,
    };
    let trimmed = truncated.trim_end_matches('/');
    let base = trimmed.rsplit('/').next().unwrap_or(trimmed);
    base.trim().to_string()
}

/// Name used when neither the request nor the sidecar provides one
pub fn default_download_name(now: DateTime<Utc>) -> String {
    format!("{}{}", DEFAULT_NAME_PREFIX, now.format("%Y%m%d%H%M%S%3f"))
}

/// Pick the download name: explicit override, then stored name, then a generated one
pub fn resolve_file_name(
    requested: Option<&str>,
    stored: Option<&str>,
    max_len: usize,
    now: DateTime<Utc>,
) -> String {
    [requested, stored]
        .into_iter()
        .flatten()
        .map(|name| sanitize_upload_name(name, max_len))
        .find(|name| !name.is_empty())
        .unwrap_or_else(|| default_download_name(now))
}
