//! # Passdrop Core
//!
//! Orchestration for the Passdrop ephemeral file drop.
//!
//! This crate provides:
//! - **Drop service**: Upload, fetch and delete objects by passphrase
//! - **Configuration**: One immutable settings value built at startup
//! - **Error taxonomy**: Validation, storage and not-found outcomes
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │               HTTP Layer                │
//! ├─────────────────────────────────────────┤
//! │              DropService                │
//! ├───────────────────┬─────────────────────┤
//! │  Deriver/Words    │   PayloadCodec      │
//! ├───────────────────┴─────────────────────┤
//! │              ObjectStore                │
//! └─────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod naming;
pub mod service;

pub use config::DropConfig;
pub use error::{DropError, Result, ValidationError};
pub use naming::{default_download_name, resolve_file_name, sanitize_upload_name};
pub use service::{DeleteOutcome, Download, DropService, Lookup, UploadReceipt};

/// Version reported to clients
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
