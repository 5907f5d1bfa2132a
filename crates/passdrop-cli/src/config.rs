//! Server configuration

use passdrop_core::DropConfig;
use serde::Serialize;

/// HTTP server configuration
#[derive(Clone, Debug, Serialize)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Path prefix the routes are mounted under, empty for the root
    pub base_path: String,
    /// Drop service settings
    pub drop: DropConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            base_path: String::new(),
            drop: DropConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Get the bind address
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Base path with one leading slash and no trailing one; empty for the root
    pub fn normalized_base_path(&self) -> String {
        let trimmed = self.base_path.trim_matches('/');
        if trimmed.is_empty() {
            String::new()
        } else {
            format!("/{}", trimmed)
        }
    }

    /// Copy suitable for display, with secrets hidden
    pub fn redacted(&self) -> Self {
        Self {
            drop: self.drop.redacted(),
            ..self.clone()
        }
    }
}
