//! # Command Envelope and Error Type
//!
//! The uniform response every bridged command returns. The shell receives:
//! ```json
//! { "success": true,  "data": { ... } }
//! { "success": false, "error": { "code": "ALREADY_IN_PROGRESS", "message": "..." } }
//! ```

use serde::Serialize;

use quill_sync::SyncError;

/// Uniform command response envelope.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandResponse<T> {
    /// Whether the command succeeded.
    pub success: bool,

    /// Payload, present on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,

    /// Failure detail, present on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<BridgeError>,
}

impl<T> CommandResponse<T> {
    /// Creates a success response.
    pub fn ok(data: T) -> Self {
        CommandResponse {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    /// Creates a failure response.
    pub fn err(error: impl Into<BridgeError>) -> Self {
        CommandResponse {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }

    /// Normalizes a fallible outcome into the envelope.
    pub fn from_result(result: Result<T, SyncError>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(e) => Self::err(e),
        }
    }
}

/// Error payload carried in the envelope.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeError {
    /// Machine-readable error code for programmatic handling.
    pub code: ErrorCode,

    /// Human-readable error message for display.
    pub message: String,
}

/// Error codes the shell can switch on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Request input failed validation (400-class).
    ValidationError,

    /// Email already registered.
    Conflict,

    /// Login rejected.
    InvalidCredentials,

    /// Refresh token rejected.
    InvalidRefreshToken,

    /// No session held.
    NotAuthenticated,

    /// A sync cycle is already in flight.
    AlreadyInProgress,

    /// Session expired; re-login required.
    AuthExpired,

    /// Transient network failure or timeout.
    NetworkError,

    /// Anything unexpected.
    Internal,
}

impl From<SyncError> for BridgeError {
    fn from(err: SyncError) -> Self {
        let code = match &err {
            SyncError::Validation(_) => ErrorCode::ValidationError,
            SyncError::Conflict => ErrorCode::Conflict,
            SyncError::InvalidCredentials => ErrorCode::InvalidCredentials,
            SyncError::InvalidRefreshToken => ErrorCode::InvalidRefreshToken,
            SyncError::NotAuthenticated => ErrorCode::NotAuthenticated,
            SyncError::AlreadyInProgress => ErrorCode::AlreadyInProgress,
            SyncError::AuthExpired => ErrorCode::AuthExpired,
            SyncError::NetworkOrTimeout(_) => ErrorCode::NetworkError,
            SyncError::Gateway { .. }
            | SyncError::InvalidConfig(_)
            | SyncError::Internal(_) => ErrorCode::Internal,
        };

        BridgeError {
            code,
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_shape() {
        let ok: CommandResponse<i64> = CommandResponse::ok(42);
        let json = serde_json::to_value(&ok).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["data"], 42);
        assert!(json.get("error").is_none());

        let err: CommandResponse<i64> = CommandResponse::err(SyncError::AlreadyInProgress);
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["success"], false);
        assert!(json.get("data").is_none());
        assert_eq!(json["error"]["code"], "ALREADY_IN_PROGRESS");
    }

    #[test]
    fn test_error_code_mapping() {
        let cases = [
            (SyncError::Conflict, ErrorCode::Conflict),
            (SyncError::InvalidCredentials, ErrorCode::InvalidCredentials),
            (SyncError::AuthExpired, ErrorCode::AuthExpired),
            (
                SyncError::NetworkOrTimeout("refused".into()),
                ErrorCode::NetworkError,
            ),
        ];

        for (err, code) in cases {
            assert_eq!(BridgeError::from(err).code, code);
        }
    }
}
