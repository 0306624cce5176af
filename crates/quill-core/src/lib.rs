//! # quill-core: Pure Types for Quillsync
//!
//! Shared account and device types plus input validation, with zero I/O
//! dependencies. Everything here is a pure function or a plain data type.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Quillsync Architecture                            │
//! │                                                                         │
//! │   UI shell ──► quill-bridge ──► quill-sync ──► HTTP ──► apps/server    │
//! │                                                             │           │
//! │                                             quill-auth ◄────┘           │
//! │                                                  │                      │
//! │                                             quill-db                    │
//! │                                                                         │
//! │   ★ quill-core (THIS CRATE) is shared by every layer above ★           │
//! │                                                                         │
//! │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Account types (User, Device)
//! - [`error`] - Validation error taxonomy
//! - [`validation`] - Request-shape validation rules

pub mod error;
pub mod types;
pub mod validation;

pub use error::ValidationError;
pub use types::{Device, User};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Minimum accepted password length.
///
/// The gateway rejects shorter passwords before they reach the token
/// service; the hash cost makes offline brute force the real defense.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Maximum accepted email length (RFC 5321 path limit).
pub const MAX_EMAIL_LEN: usize = 254;

/// Maximum accepted length for the client-chosen device identifier.
pub const MAX_DEVICE_ID_LEN: usize = 128;

/// Maximum accepted device name length.
pub const MAX_DEVICE_NAME_LEN: usize = 120;
