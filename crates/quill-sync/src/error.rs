//! # Sync Error Types
//!
//! Error taxonomy for the client-side sync lifecycle.
//!
//! ## Categories
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sync Error Categories                             │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Authentication │  │  Orchestration  │  │     Transport           │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidCreds   │  │ AlreadyInProgr. │  │  NetworkOrTimeout       │ │
//! │  │  Conflict       │  │ NotAuthenticated│  │  Gateway (unexpected    │ │
//! │  │  InvalidRefresh │  │ AuthExpired     │  │   status)               │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Result type alias for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Sync error type covering the client-side lifecycle.
#[derive(Debug, Clone, Error)]
pub enum SyncError {
    // =========================================================================
    // Authentication Errors (mapped from gateway responses)
    // =========================================================================
    /// The gateway rejected the request shape.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Registration rejected: email already taken.
    #[error("An account with this email already exists")]
    Conflict,

    /// Login rejected. Generic for unknown email and wrong password.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Refresh token rejected by the gateway.
    #[error("Invalid or expired refresh token")]
    InvalidRefreshToken,

    // =========================================================================
    // Orchestration Errors
    // =========================================================================
    /// No session is held; log in first.
    #[error("Not authenticated")]
    NotAuthenticated,

    /// A sync cycle is already in flight; at most one runs at a time.
    #[error("A sync cycle is already in progress")]
    AlreadyInProgress,

    /// The access token expired and the one transparent refresh also
    /// failed. The orchestrator forces Disconnected; re-login required.
    #[error("Session expired, please log in again")]
    AuthExpired,

    // =========================================================================
    // Transport Errors
    // =========================================================================
    /// Connection failure or bounded timeout. Transient; the caller may
    /// retry manually or wait for the next periodic tick.
    #[error("Network error: {0}")]
    NetworkOrTimeout(String),

    /// Unexpected gateway status.
    #[error("Server error ({status}): {message}")]
    Gateway { status: u16, message: String },

    /// Invalid orchestrator configuration.
    #[error("Invalid sync configuration: {0}")]
    InvalidConfig(String),

    /// Internal orchestrator error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl SyncError {
    /// Returns true if this error is transient and the operation can be
    /// retried on the next tick.
    pub fn is_retryable(&self) -> bool {
        match self {
            SyncError::NetworkOrTimeout(_) => true,
            SyncError::Gateway { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Returns true if this error ends the session.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, SyncError::AuthExpired)
    }
}

impl From<reqwest::Error> for SyncError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() || err.is_connect() || err.is_request() {
            SyncError::NetworkOrTimeout(err.to_string())
        } else if err.is_decode() {
            SyncError::Internal(format!("Malformed gateway response: {}", err))
        } else {
            SyncError::NetworkOrTimeout(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_errors() {
        assert!(SyncError::NetworkOrTimeout("refused".into()).is_retryable());
        assert!(SyncError::Gateway {
            status: 503,
            message: "unavailable".into()
        }
        .is_retryable());

        assert!(!SyncError::AlreadyInProgress.is_retryable());
        assert!(!SyncError::AuthExpired.is_retryable());
        assert!(!SyncError::InvalidCredentials.is_retryable());
    }

    #[test]
    fn test_auth_failure_classification() {
        assert!(SyncError::AuthExpired.is_auth_failure());
        assert!(!SyncError::NetworkOrTimeout("x".into()).is_auth_failure());
    }
}
