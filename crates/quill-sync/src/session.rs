//! The held session.
//!
//! An explicit owned object with a defined lifecycle, passed through the
//! orchestrator's state transitions - never ambient globals. Dropped on
//! logout or forced disconnect.

use quill_core::User;

/// Tokens and identity held after a successful login/register.
#[derive(Debug, Clone)]
pub struct Session {
    /// The authenticated user.
    pub user: User,

    /// Current short-lived access token. Replaced in place by the one
    /// transparent refresh a cycle is allowed.
    pub access_token: String,

    /// Long-lived refresh token backing this session.
    pub refresh_token: String,
}

impl Session {
    /// Creates a session from a gateway response.
    pub fn new(user: User, access_token: String, refresh_token: String) -> Self {
        Session {
            user,
            access_token,
            refresh_token,
        }
    }
}
