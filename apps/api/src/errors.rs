use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        rejection::JsonRejection,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::uploads::MAX_UPLOAD_BYTES;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// Upstream model failures are deliberately absent: the gateway renders them
/// as text and they travel inside a 200 payload under `error`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Upload error: {0}")]
    Upload(#[from] MultipartError),

    #[error("Malformed form body: {0}")]
    MultipartBody(#[from] MultipartRejection),

    #[error("Malformed JSON body: {0}")]
    JsonBody(#[from] JsonRejection),

    #[error("AI service is not configured")]
    MissingCredentials,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    #[error("Template error: {0}")]
    Template(#[from] askama::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Upload(e) if e.status() == StatusCode::PAYLOAD_TOO_LARGE => (
                StatusCode::PAYLOAD_TOO_LARGE,
                format!(
                    "File too large. The limit is {} MB.",
                    MAX_UPLOAD_BYTES / (1024 * 1024)
                ),
            ),
            AppError::Upload(e) => (e.status(), e.body_text()),
            // Extractor rejections are client mistakes: 400 rather than 415/422, size cap aside.
            AppError::MultipartBody(e) => (client_status(e.status()), e.body_text()),
            AppError::JsonBody(e) => (client_status(e.status()), e.body_text()),
            AppError::MissingCredentials => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "AI service is not configured (missing GEMINI_API_KEY)".to_string(),
            ),
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "A database error occurred".to_string(),
                )
            }
            AppError::Session(e) => {
                tracing::error!("Session error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "A session error occurred".to_string(),
                )
            }
            AppError::Template(e) => {
                tracing::error!("Template error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "A page rendering error occurred".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal server error occurred".to_string(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

fn client_status(status: StatusCode) -> StatusCode {
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        status
    } else {
        StatusCode::BAD_REQUEST
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_maps_to_bad_request() {
        let response = AppError::Validation("No file uploaded".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_missing_credentials_maps_to_internal_error() {
        let response = AppError::MissingCredentials.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_internal_hides_details() {
        let response =
            AppError::Internal(anyhow::anyhow!("disk on fire at /var/secret")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_client_status_keeps_only_size_cap() {
        assert_eq!(
            client_status(StatusCode::UNPROCESSABLE_ENTITY),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            client_status(StatusCode::UNSUPPORTED_MEDIA_TYPE),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            client_status(StatusCode::PAYLOAD_TOO_LARGE),
            StatusCode::PAYLOAD_TOO_LARGE
        );
    }
}
