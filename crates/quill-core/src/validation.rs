//! # Validation Module
//!
//! Request-shape validation for authentication operations.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: UI shell                                                     │
//! │  ├── Basic format checks (empty, length)                               │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Session gateway (Rust)                                       │
//! │  └── THIS MODULE: request-shape validation before the token service    │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL constraints                                              │
//! │  └── UNIQUE constraints (email, user/device pairs)                     │
//! │                                                                         │
//! │  Defense in depth: multiple layers catch different errors              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use quill_core::validation::{validate_email, validate_password};
//!
//! validate_email("a@example.com").unwrap();
//! validate_password("pw12345678").unwrap();
//! ```

use crate::error::ValidationError;
use crate::{MAX_DEVICE_ID_LEN, MAX_DEVICE_NAME_LEN, MAX_EMAIL_LEN, MIN_PASSWORD_LEN};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validates a login email.
///
/// ## Rules
/// - Must not be empty
/// - At most 254 characters
/// - Exactly one `@` separating a non-empty local part and a domain that
///   contains a dot
/// - No whitespace
///
/// ## Returns
/// The trimmed, lowercased email (the canonical form stored and compared).
pub fn validate_email(email: &str) -> ValidationResult<String> {
    let email = email.trim();

    if email.is_empty() {
        return Err(ValidationError::required("email"));
    }

    if email.len() > MAX_EMAIL_LEN {
        return Err(ValidationError::TooLong {
            field: "email".to_string(),
            max: MAX_EMAIL_LEN,
        });
    }

    if email.chars().any(char::is_whitespace) {
        return Err(ValidationError::invalid("email", "must not contain whitespace"));
    }

    let mut parts = email.splitn(2, '@');
    let local = parts.next().unwrap_or_default();
    let domain = parts.next().unwrap_or_default();

    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return Err(ValidationError::invalid(
            "email",
            "must be of the form local@domain",
        ));
    }

    if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
        return Err(ValidationError::invalid(
            "email",
            "domain must contain a dot",
        ));
    }

    Ok(email.to_lowercase())
}

/// Validates a password.
///
/// ## Rules
/// - At least 8 characters
///
/// Strength beyond length is not enforced here; the slow salted hash is the
/// real defense against offline brute force.
pub fn validate_password(password: &str) -> ValidationResult<()> {
    if password.is_empty() {
        return Err(ValidationError::required("password"));
    }

    if password.len() < MIN_PASSWORD_LEN {
        return Err(ValidationError::TooShort {
            field: "password".to_string(),
            min: MIN_PASSWORD_LEN,
        });
    }

    Ok(())
}

/// Validates a client-chosen device identifier.
///
/// ## Rules
/// - Must not be empty
/// - At most 128 characters
/// - Only printable non-whitespace ASCII (identifiers travel in JSON and
///   token claims)
pub fn validate_device_id(device_id: &str) -> ValidationResult<()> {
    let device_id = device_id.trim();

    if device_id.is_empty() {
        return Err(ValidationError::required("deviceId"));
    }

    if device_id.len() > MAX_DEVICE_ID_LEN {
        return Err(ValidationError::TooLong {
            field: "deviceId".to_string(),
            max: MAX_DEVICE_ID_LEN,
        });
    }

    if !device_id
        .chars()
        .all(|c| c.is_ascii_graphic())
    {
        return Err(ValidationError::invalid(
            "deviceId",
            "must contain only printable ASCII without spaces",
        ));
    }

    Ok(())
}

/// Validates an optional device name.
///
/// Empty names are treated as absent by callers; this only bounds length.
pub fn validate_device_name(name: &str) -> ValidationResult<()> {
    if name.len() > MAX_DEVICE_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "deviceName".to_string(),
            max: MAX_DEVICE_NAME_LEN,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
