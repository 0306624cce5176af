//! Row types for the credential store.
//!
//! [`UserRow`] carries the password hash and stays inside the store
//! boundary; conversion to [`quill_core::User`] drops it.

use chrono::{DateTime, Utc};
use quill_core::{Device, User};

/// A row in the `users` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRow {
    pub id: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            email: row.email,
            created_at: row.created_at,
        }
    }
}

/// A row in the `devices` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DeviceRow {
    pub id: String,
    pub user_id: String,
    pub device_id: String,
    pub device_name: Option<String>,
    pub last_sync_at: Option<DateTime<Utc>>,
}

impl From<DeviceRow> for Device {
    fn from(row: DeviceRow) -> Self {
        Device {
            id: row.id,
            user_id: row.user_id,
            device_id: row.device_id,
            device_name: row.device_name,
            last_sync_at: row.last_sync_at,
        }
    }
}

/// A row in the `refresh_tokens` table.
///
/// `device_id` here is the internal device row id, not the client-chosen
/// identifier. Row presence is the validity test; deletion is revocation.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RefreshTokenRow {
    pub id: String,
    pub user_id: String,
    pub device_id: String,
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for a refresh token row.
///
/// The token string is minted by the token service (it embeds the ids),
/// so insertion takes the finished value rather than generating one.
#[derive(Debug, Clone)]
pub struct NewRefreshToken {
    pub user_id: String,
    pub device_id: String,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}
