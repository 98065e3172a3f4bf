//! Error responses and startup failures.
//!
//! Every failed request gets the same body:
//!
//! ```text
//! { "ok": false, "error": "<message>", "code": <numeric> }
//! ```
//!
//! `code` is the core error code, so clients can branch on it without
//! parsing messages.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use soulsafe_core::Error;

/// Code reported for malformed requests (matches `Error::InvalidArgument`).
const BAD_REQUEST_CODE: i32 = 100;

#[derive(Serialize)]
struct ErrorBody {
    ok: bool,
    error: String,
    code: i32,
}

/// A failed request, ready to be turned into a response.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: i32,
    pub message: String,
}

impl ApiError {
    /// 400 with the invalid-argument code
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            code: BAD_REQUEST_CODE,
            message: message.into(),
        }
    }

    /// 400 for a field the request omitted
    pub fn missing_field(name: &str) -> Self {
        Self::bad_request(format!("Missing required field: {}", name))
    }
}

/// HTTP status for a core error
pub fn status_for(error: &Error) -> StatusCode {
    match error {
        Error::InvalidArgument(_) | Error::Serialization(_) => StatusCode::BAD_REQUEST,
        Error::AuthenticationFailed => StatusCode::UNAUTHORIZED,
        Error::RandomnessUnavailable
        | Error::KeyDerivationFailed(_)
        | Error::EncryptionFailed(_)
        | Error::Configuration(_)
        | Error::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        let status = status_for(&error);
        if status.is_server_error() {
            tracing::error!(code = error.code(), error = %error, "Crypto operation failed");
        } else if matches!(error, Error::AuthenticationFailed) {
            tracing::warn!("Rejected envelope that failed authentication");
        }

        Self {
            status,
            code: error.code(),
            message: error.to_string(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            ok: false,
            error: self.message,
            code: self.code,
        };
        (self.status, Json(body)).into_response()
    }
}

/// Failures that stop the server from starting.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] Error),

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_for(&Error::InvalidArgument("x".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(status_for(&Error::AuthenticationFailed), StatusCode::UNAUTHORIZED);
        assert_eq!(
            status_for(&Error::RandomnessUnavailable),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_for(&Error::KeyDerivationFailed("x".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_api_error_keeps_core_code() {
        let err = ApiError::from(Error::AuthenticationFailed);
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
        assert_eq!(err.code, 200);
    }

    #[test]
    fn test_missing_field_message() {
        let err = ApiError::missing_field("key");
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "Missing required field: key");
    }
}
