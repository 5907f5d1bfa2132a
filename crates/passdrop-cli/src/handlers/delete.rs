//! Delete handler

use crate::{ApiError, AppState};
use axum::{
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use passdrop_core::DeleteOutcome;
use std::sync::Arc;

/// DELETE /{password}
pub async fn delete_upload(
    State(state): State<Arc<AppState>>,
    Path(passphrase): Path<String>,
) -> Result<Response, ApiError> {
    match state.drop.delete(&passphrase).await? {
        DeleteOutcome::Deleted => Ok((
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            "OK, the file has been deleted.\n",
        )
            .into_response()),
        DeleteOutcome::NotFound => Err(ApiError::NotFound),
    }
}
