//! Gateway error type and HTTP status mapping.
//!
//! No raw lower-level fault escapes this boundary: every failure becomes
//! one of the taxonomy kinds, internals are logged server-side, and the
//! response body carries only a generic message.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use quill_auth::AuthError;

/// Gateway errors.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Malformed request shape. Locally correctable by the caller.
    #[error("Validation failed")]
    Validation { details: Vec<String> },

    /// Duplicate registration.
    #[error("An account with this email already exists")]
    Conflict,

    /// Login rejected; identical for unknown email and wrong password.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Refresh token rejected.
    #[error("Invalid or expired refresh token")]
    InvalidRefreshToken,

    /// Bearer token missing, malformed, expired, or device-unbound.
    #[error("Authentication required")]
    Unauthorized,

    /// Unexpected failure. Detail is logged; callers see a generic body.
    #[error("Internal server error")]
    Internal(String),
}

/// Failure response body.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Vec<String>>,
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, details) = match &self {
            ServerError::Validation { details } => {
                (StatusCode::BAD_REQUEST, Some(details.clone()))
            }
            ServerError::Conflict => (StatusCode::CONFLICT, None),
            ServerError::InvalidCredentials => (StatusCode::UNAUTHORIZED, None),
            ServerError::InvalidRefreshToken => (StatusCode::FORBIDDEN, None),
            ServerError::Unauthorized => (StatusCode::UNAUTHORIZED, None),
            ServerError::Internal(detail) => {
                tracing::error!(detail = %detail, "Internal gateway error");
                (StatusCode::INTERNAL_SERVER_ERROR, None)
            }
        };

        let body = ErrorBody {
            error: self.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

impl From<AuthError> for ServerError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Conflict => ServerError::Conflict,
            AuthError::InvalidCredentials => ServerError::InvalidCredentials,
            AuthError::InvalidRefreshToken => ServerError::InvalidRefreshToken,
            AuthError::InvalidAccessToken => ServerError::Unauthorized,
            AuthError::Validation(v) => ServerError::Validation {
                details: vec![v.to_string()],
            },
            AuthError::Database(detail) | AuthError::Internal(detail) => {
                ServerError::Internal(detail)
            }
        }
    }
}
