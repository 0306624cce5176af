//! Account and device types shared across the workspace.
//!
//! These are the public shapes that cross the HTTP and IPC boundaries.
//! The password hash is deliberately absent from [`User`]: it never leaves
//! the credential store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// UUID v4 primary key.
    pub id: String,

    /// Unique login email, stored lowercased.
    pub email: String,

    /// When the account was registered.
    pub created_at: DateTime<Utc>,
}

/// A device registered under a user account.
///
/// `device_id` is the client-chosen stable identifier (unique per user);
/// `id` is the internal row id that token claims embed. A user may own many
/// devices; a device belongs to exactly one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    /// UUID v4 primary key (the id embedded in token claims).
    pub id: String,

    /// Owning user id.
    pub user_id: String,

    /// Client-chosen stable device identifier.
    pub device_id: String,

    /// Human-readable device name, if the client supplied one.
    pub device_name: Option<String>,

    /// Timestamp of the last completed sync cycle from this device.
    pub last_sync_at: Option<DateTime<Utc>>,
}
