//! Upload handlers

use crate::client::Client;
use crate::handlers::{HEADER_FILE_PASSWORD, HEADER_FILE_PATH, HEADER_UPLOAD_NAME, header_value};
use crate::{ApiError, AppState};
use axum::{
    body::Body,
    extract::{
        Multipart, Path, State,
        multipart::{MultipartError, MultipartRejection},
    },
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use bytes::{Bytes, BytesMut};
use futures::StreamExt;
use passdrop_core::{UploadReceipt, ValidationError};
use std::sync::Arc;

/// PUT /{name} - the request body is the file
pub async fn put_upload(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Client(client): Client,
    body: Body,
) -> Result<Response, ApiError> {
    let max = state.config.drop.max_upload_size;
    let mut stream = body.into_data_stream();
    let mut buf = BytesMut::new();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| ApiError::BadUpload(e.to_string()))?;
        append_capped(&mut buf, &chunk, max)?;
    }

    let receipt = state.drop.upload(&name, vec![buf.freeze()], client).await?;
    Ok(created(&receipt))
}

/// POST /{name} - multipart form carrying exactly one file
pub async fn post_upload(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Client(client): Client,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, ApiError> {
    let mut multipart = multipart.map_err(|e| ApiError::BadUpload(e.body_text()))?;
    let max = state.config.drop.max_upload_size;

    let mut files: Vec<Bytes> = Vec::new();
    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, max))?
    {
        // Plain form values are not files.
        if field.file_name().is_none() {
            continue;
        }
        let mut buf = BytesMut::new();
        while let Some(chunk) = field.chunk().await.map_err(|e| multipart_error(e, max))? {
            append_capped(&mut buf, &chunk, max)?;
        }
        files.push(buf.freeze());
    }

    let receipt = state.drop.upload(&name, files, client).await?;
    Ok(created(&receipt))
}

/// Grow `buf` by `chunk` unless that would pass `max` bytes
fn append_capped(buf: &mut BytesMut, chunk: &[u8], max: u64) -> Result<(), ApiError> {
    if (buf.len() + chunk.len()) as u64 > max {
        return Err(ValidationError::PayloadTooLarge { max }.into());
    }
    buf.extend_from_slice(chunk);
    Ok(())
}

fn multipart_error(err: MultipartError, max: u64) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ValidationError::PayloadTooLarge { max }.into()
    } else {
        ApiError::BadUpload(err.body_text())
    }
}

fn created(receipt: &UploadReceipt) -> Response {
    (
        StatusCode::CREATED,
        [
            (header::CONTENT_TYPE, header_value("text/plain; charset=utf-8")),
            (HEADER_UPLOAD_NAME, header_value(&receipt.upload_name)),
            (HEADER_FILE_PASSWORD, header_value(&receipt.passphrase)),
            (HEADER_FILE_PATH, header_value(&receipt.retrieval_path)),
        ],
        format!(
            "File uploaded successfully. The password for your file is:\n{}\n",
            receipt.passphrase
        ),
    )
        .into_response()
}
