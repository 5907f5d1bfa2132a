//! Download handlers

use crate::handlers::{HEADER_UPLOAD_EXPIRATION, header_safe, header_value};
use crate::{ApiError, AppState};
use axum::{
    body::Body,
    extract::{Path, State},
    http::{StatusCode, header},
    response::Response,
};
use passdrop_core::{Download, Lookup};
use passdrop_store::Payload;
use std::sync::Arc;
use tokio_util::io::ReaderStream;

const STREAM_CHUNK: usize = 64 * 1024;

/// GET /{password}
pub async fn download(
    State(state): State<Arc<AppState>>,
    Path(passphrase): Path<String>,
) -> Result<Response, ApiError> {
    serve(&state, &passphrase, None).await
}

/// GET /{password}/{name} - download under a different name
pub async fn download_named(
    State(state): State<Arc<AppState>>,
    Path((passphrase, name)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    serve(&state, &passphrase, Some(&name)).await
}

async fn serve(state: &AppState, passphrase: &str, name: Option<&str>) -> Result<Response, ApiError> {
    match state.drop.fetch(passphrase, name).await? {
        Lookup::Found(download) => download_response(download),
        Lookup::NotFound => Err(ApiError::NotFound),
    }
}

fn download_response(download: Download) -> Result<Response, ApiError> {
    let len = download.payload.len();
    let body = match download.payload {
        Payload::File { file, .. } => {
            Body::from_stream(ReaderStream::with_capacity(file, STREAM_CHUNK))
        }
        Payload::Memory(bytes) => Body::from(bytes),
    };

    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, header_value(&download.content_type))
        .header(
            header::CONTENT_DISPOSITION,
            header_value(&format!(
                "attachment; filename={}",
                header_safe(&download.file_name)
            )),
        )
        .header(
            header::CACHE_CONTROL,
            "no-store, no-cache, must-revalidate, max-age=0",
        )
        .header(header::PRAGMA, "no-cache")
        .header(header::CONTENT_LENGTH, len);
    if let Some(expires_at) = download.expires_at {
        builder = builder.header(HEADER_UPLOAD_EXPIRATION, expires_at.to_rfc3339());
    }

    builder
        .body(body)
        .map_err(|e| ApiError::Internal(e.to_string()))
}
