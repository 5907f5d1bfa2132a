//! Metadata sidecar stored next to each payload

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who uploaded an object, when client tracing is enabled
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClientInfo {
    /// Client address as seen through the reverse proxy
    pub remote_ip: Option<String>,
    /// `User-Agent` request header
    pub user_agent: Option<String>,
}

/// Contents of `<hash>.json`
///
/// Sidecars written by older deployments may lack fields; they default
/// explicitly rather than failing the read.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectMetadata {
    /// Display name given at upload time
    #[serde(default)]
    pub upload_name: Option<String>,

    /// Upload timestamp
    pub created_at: DateTime<Utc>,

    /// Plaintext size in bytes
    #[serde(default)]
    pub size: u64,

    /// Whether the payload on disk is sealed with the passphrase key
    #[serde(default)]
    pub encryption_enabled: bool,

    /// Client address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_ip: Option<String>,

    /// Client user agent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

impl ObjectMetadata {
    /// Metadata for a new upload, stamped now
    pub fn new(upload_name: impl Into<String>, size: u64) -> Self {
        Self {
            upload_name: Some(upload_name.into()),
            created_at: Utc::now(),
            size,
            encryption_enabled: false,
            remote_ip: None,
            user_agent: None,
        }
    }

    /// Attach client information
    pub fn with_client(mut self, client: ClientInfo) -> Self {
        self.remote_ip = client.remote_ip;
        self.user_agent = client.user_agent;
        self
    }

    /// Record whether the payload is encrypted
    pub fn with_encryption(mut self, enabled: bool) -> Self {
        self.encryption_enabled = enabled;
        self
    }

    /// Client information, if any was recorded
    pub fn client(&self) -> Option<ClientInfo> {
        if self.remote_ip.is_none() && self.user_agent.is_none() {
            return None;
        }
        Some(ClientInfo {
            remote_ip: self.remote_ip.clone(),
            user_agent: self.user_agent.clone(),
        })
    }
}
