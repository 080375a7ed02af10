//! Error types for reelist-pb
//!
//! Maps the workflow error taxonomy onto the HTTP surface: client mistakes
//! are 400s, a failed conversion is a 500, and upstream service failures
//! (fingerprinting vendor, playlist provider) are 502s.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::services::spotify::PlaylistError;
use crate::services::workflow::WorkflowError;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Pipeline failure (5xx, mapped per stage)
    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::Workflow(WorkflowError::Conversion(ref err)) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "CONVERSION_ERROR",
                err.to_string(),
            ),
            ApiError::Workflow(WorkflowError::Fingerprint(ref err)) => (
                StatusCode::BAD_GATEWAY,
                "FINGERPRINT_ERROR",
                err.to_string(),
            ),
            ApiError::Workflow(WorkflowError::Playlist(PlaylistError::Unauthorized(msg))) => {
                (StatusCode::BAD_GATEWAY, "AUTHORIZATION_ERROR", msg)
            }
            ApiError::Workflow(WorkflowError::Playlist(ref err)) => {
                (StatusCode::BAD_GATEWAY, "PLAYLIST_ERROR", err.to_string())
            }
            ApiError::Io(ref err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "IO_ERROR",
                err.to_string(),
            ),
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
