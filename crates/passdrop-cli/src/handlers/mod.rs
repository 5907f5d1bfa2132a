//! HTTP request handlers

pub mod delete;
pub mod download;
pub mod service;
pub mod upload;

pub use delete::*;
pub use download::*;
pub use service::*;
pub use upload::*;

use axum::http::{HeaderName, HeaderValue};
use std::borrow::Cow;

/// Server version (policy headers)
pub const HEADER_VERSION: HeaderName = HeaderName::from_static("passdrop-version");
/// Object lifetime in seconds (policy headers)
pub const HEADER_EXPIRATION_TIME: HeaderName =
    HeaderName::from_static("passdrop-expiration-time");
/// Largest accepted upload (policy headers)
pub const HEADER_MAX_UPLOAD_SIZE: HeaderName =
    HeaderName::from_static("passdrop-max-upload-size");
/// Words per passphrase (policy headers)
pub const HEADER_PASS_WORDS_COUNT: HeaderName =
    HeaderName::from_static("passdrop-pass-words-count");
pub const HEADER_UPLOAD_NAME: HeaderName = HeaderName::from_static("passdrop-upload-name");
pub const HEADER_FILE_PASSWORD: HeaderName = HeaderName::from_static("passdrop-file-password");
pub const HEADER_FILE_PATH: HeaderName = HeaderName::from_static("passdrop-file-path");
pub const HEADER_UPLOAD_EXPIRATION: HeaderName =
    HeaderName::from_static("passdrop-upload-expiration");

/// Text that can go in a header as is, percent-encoded otherwise
pub(crate) fn header_safe(text: &str) -> Cow<'_, str> {
    if text.chars().all(|c| c == '\t' || (' '..='~').contains(&c)) {
        Cow::Borrowed(text)
    } else {
        urlencoding::encode(text)
    }
}

pub(crate) fn header_value(text: &str) -> HeaderValue {
    HeaderValue::from_str(&header_safe(text)).unwrap_or_else(|_| HeaderValue::from_static(""))
}
