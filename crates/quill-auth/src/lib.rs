//! # quill-auth: Token Service for Quillsync
//!
//! Mints and validates the two-token credential scheme and owns the
//! register/login/refresh/logout lifecycle.
//!
//! ## The Two-Token Scheme
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Device-Scoped Sessions                             │
//! │                                                                         │
//! │  ACCESS TOKEN (stateless)          REFRESH TOKEN (stateful)            │
//! │  ────────────────────────          ─────────────────────────           │
//! │  • Short TTL (15 min default)      • Long TTL (7 days default)         │
//! │  • Verified by signature alone     • Verified by signature AND a       │
//! │  • No store lookup per request       row lookup in the store           │
//! │  • Cannot be revoked early         • Row deletion IS revocation,       │
//! │                                      which makes logout effective      │
//! │                                                                         │
//! │  Both embed (userId, internal deviceId): every device holds an         │
//! │  independent session, revocable without touching its siblings.         │
//! │                                                                         │
//! │  Signed with DISTINCT secrets so one token kind can never be           │
//! │  replayed as the other.                                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`token`] - `TokenKeeper`: JWT mint/verify with distinct secrets
//! - [`password`] - argon2 hashing and verification
//! - [`service`] - `AuthService`: the four lifecycle operations
//! - [`error`] - auth error taxonomy

pub mod error;
pub mod password;
pub mod service;
pub mod token;

pub use error::{AuthError, AuthResult};
pub use service::{AuthService, AuthSession};
pub use token::{Claims, TokenConfig, TokenKeeper};
