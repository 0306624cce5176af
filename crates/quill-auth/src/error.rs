//! Error types for the token service.
//!
//! Authentication failures stay deliberately generic: `InvalidCredentials`
//! covers both unknown email and wrong password so callers learn nothing
//! about account existence, and `InvalidRefreshToken` covers signature,
//! expiry, and revocation failures alike.

use quill_core::ValidationError;
use thiserror::Error;

/// Result type alias for token service operations.
pub type AuthResult<T> = Result<T, AuthError>;

/// Token service errors.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Email is already registered.
    #[error("An account with this email already exists")]
    Conflict,

    /// Login failed. Identical for unknown email and wrong password.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Refresh token rejected: bad signature, expired, revoked, or unknown.
    #[error("Invalid or expired refresh token")]
    InvalidRefreshToken,

    /// Access token rejected: bad signature, expired, or device unbound.
    #[error("Invalid or expired access token")]
    InvalidAccessToken,

    /// Request input failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Credential store failure.
    #[error("Credential store error: {0}")]
    Database(String),

    /// Unexpected failure (hashing, signing). Logged with detail; callers
    /// see only the generic message.
    #[error("Internal authentication error")]
    Internal(String),
}

impl From<quill_db::DbError> for AuthError {
    fn from(err: quill_db::DbError) -> Self {
        if err.is_unique_violation() {
            // The only unique constraints reachable through the service are
            // the email column and the token column; both surface as
            // registration conflicts.
            AuthError::Conflict
        } else {
            AuthError::Database(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_violation_becomes_conflict() {
        let db_err = quill_db::DbError::duplicate("email", "a@example.com");
        assert!(matches!(AuthError::from(db_err), AuthError::Conflict));
    }

    #[test]
    fn test_generic_messages_leak_nothing() {
        // Both failure modes must render identically.
        assert_eq!(
            AuthError::InvalidCredentials.to_string(),
            "Invalid email or password"
        );
        assert!(!AuthError::Internal("argon2 blew up".into())
            .to_string()
            .contains("argon2"));
    }
}
