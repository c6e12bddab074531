//! Error types for wsr-app

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::capture::CaptureError;
use crate::shell::ShellError;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Action not valid in the current state (409)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),

    /// wsr-common error
    #[error("Common error: {0}")]
    Common(#[from] wsr_common::Error),
}

impl From<ShellError> for ApiError {
    fn from(err: ShellError) -> Self {
        match err {
            ShellError::UnknownSnap(_) => ApiError::NotFound(err.to_string()),
            ShellError::NoSession | ShellError::NoCaptureFlow => {
                ApiError::Conflict(err.to_string())
            }
            ShellError::Capture(CaptureError::InvalidTransition { .. }) => {
                ApiError::Conflict(err.to_string())
            }
            ShellError::Capture(CaptureError::Device(_)) => ApiError::BadRequest(err.to_string()),
        }
    }
}

impl From<wsr_common::GeoError> for ApiError {
    fn from(err: wsr_common::GeoError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg),
            ApiError::Common(ref err) => match err {
                wsr_common::Error::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND", err.to_string()),
                wsr_common::Error::InvalidInput(_) => {
                    (StatusCode::BAD_REQUEST, "BAD_REQUEST", err.to_string())
                }
                _ => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "COMMON_ERROR",
                    err.to_string(),
                ),
            },
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::DeviceError;

    #[test]
    fn test_shell_error_status_mapping() {
        let status = |e: ShellError| ApiError::from(e).into_response().status();

        assert_eq!(status(ShellError::UnknownSnap("x".into())), StatusCode::NOT_FOUND);
        assert_eq!(status(ShellError::NoSession), StatusCode::CONFLICT);
        assert_eq!(
            status(ShellError::Capture(CaptureError::InvalidTransition {
                state: "Idle",
                action: "send"
            })),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status(ShellError::Capture(DeviceError::NoFrame.into())),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_common_error_mapping() {
        let response = ApiError::from(wsr_common::Error::Internal("boom".into())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
