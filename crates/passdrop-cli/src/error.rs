//! HTTP error responses

use axum::{
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use passdrop_core::{DropError, ValidationError};
use thiserror::Error;
use tracing::error;

/// Body sent for every missing, expired or unknown passphrase
pub const NOT_FOUND_MESSAGE: &str = "No file found with that password, or it has expired.";

/// API error type
#[derive(Error, Debug)]
pub enum ApiError {
    /// Upload rejected before anything was stored
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// Request body could not be read
    #[error("Upload has failed.")]
    BadUpload(String),

    /// Nothing to serve
    #[error("{}", NOT_FOUND_MESSAGE)]
    NotFound,

    /// The upload could not be stored
    #[error("Could not save file, sorry.")]
    UploadFailed(String),

    /// A live object could not be removed
    #[error("Sorry, unable to delete the file.")]
    DeleteFailed(String),

    #[error("Oops, got unexpected error! Try again?")]
    Internal(String),
}

impl ApiError {
    /// Get the HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(ValidationError::PayloadTooLarge { .. }) => {
                StatusCode::PAYLOAD_TOO_LARGE
            }
            Self::Validation(_) | Self::BadUpload(_) => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::UploadFailed(_) | Self::DeleteFailed(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<DropError> for ApiError {
    fn from(err: DropError) -> Self {
        match err {
            DropError::Validation(e) => Self::Validation(e),
            DropError::NotFound | DropError::Decryption => Self::NotFound,
            DropError::StorageWrite(e) => Self::UploadFailed(e.to_string()),
            DropError::StorageDelete(hash) => Self::DeleteFailed(hash),
            DropError::Configuration(msg) => Self::Internal(msg),
            DropError::Storage(e) => Self::Internal(e.to_string()),
            DropError::Task(e) => Self::Internal(e.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match &self {
            Self::UploadFailed(detail) | Self::DeleteFailed(detail) | Self::Internal(detail) => {
                error!(status = status.as_u16(), detail = %detail, "{}", self);
            }
            Self::BadUpload(detail) => {
                tracing::debug!(detail = %detail, "Unreadable upload");
            }
            _ => {}
        }

        (
            status,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            format!("ERROR: {}\n", self),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (ApiError::from(ValidationError::NoFile), StatusCode::BAD_REQUEST),
            (ApiError::from(ValidationError::TooManyFiles), StatusCode::BAD_REQUEST),
            (ApiError::from(ValidationError::MissingName), StatusCode::BAD_REQUEST),
            (
                ApiError::from(ValidationError::PayloadTooLarge { max: 1 }),
                StatusCode::PAYLOAD_TOO_LARGE,
            ),
            (ApiError::from(DropError::NotFound), StatusCode::NOT_FOUND),
            (ApiError::from(DropError::Decryption), StatusCode::NOT_FOUND),
            (
                ApiError::from(DropError::StorageDelete("ab".into())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(err.status_code(), status, "{:?}", err);
        }
    }

    #[test]
    fn test_not_found_and_decryption_share_a_body() {
        let a = ApiError::from(DropError::NotFound).to_string();
        let b = ApiError::from(DropError::Decryption).to_string();
        assert_eq!(a, b);
        assert_eq!(a, NOT_FOUND_MESSAGE);
    }

    #[test]
    fn test_response_is_plain_text() {
        let response = ApiError::NotFound.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/plain; charset=utf-8"
        );
    }

    #[tokio::test]
    async fn test_delete_failure_response() {
        let response = ApiError::from(DropError::StorageDelete("ab".into())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"ERROR: Sorry, unable to delete the file.\n");
    }
}
