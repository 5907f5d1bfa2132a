//! # Passdrop
//!
//! HTTP server for Passdrop, a password-addressed ephemeral file drop.
//!
//! This crate provides:
//! - **HTTP API**: Upload, download and delete by passphrase
//! - **Policy discovery**: `HEAD /` advertises size and lifetime limits
//! - **Admin commands**: Bulk purge of expired files, configuration dump
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │              HTTP Clients               │
//! │            (curl, wget, ...)            │
//! └────────────────────┬────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────┐
//! │  Request ID │ Access Log │ Body Limit   │
//! ├─────────────────────────────────────────┤
//! │     Upload / Download / Delete          │
//! ├─────────────────────────────────────────┤
//! │             passdrop-core               │
//! ├─────────────────────────────────────────┤
//! │            passdrop-store               │
//! └─────────────────────────────────────────┘
//! ```

pub mod admin;
pub mod client;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use error::ApiError;
pub use server::{run_server, run_server_with_shutdown, serve};
pub use state::AppState;
