//! DTOs serialized across the shell boundary.
//!
//! Timestamps cross the boundary as ISO8601 strings; the shell never sees
//! internal chrono types.

use serde::{Deserialize, Serialize};

use quill_sync::{CycleReceipt, SyncConfig, SyncStatus};

/// Status snapshot for the shell.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncStatusDto {
    /// Whether a sync cycle is currently in flight.
    pub is_running: bool,

    /// Whether a session is held.
    pub is_authenticated: bool,

    /// Last successful sync timestamp (ISO8601).
    pub last_sync_at: Option<String>,

    /// Last cycle failure, if any.
    pub last_error: Option<String>,

    /// Whether the periodic timer is enabled.
    pub periodic_enabled: bool,
}

impl From<SyncStatus> for SyncStatusDto {
    fn from(status: SyncStatus) -> Self {
        SyncStatusDto {
            is_running: status.is_running,
            is_authenticated: status.is_authenticated,
            last_sync_at: status.last_sync_at.map(|t| t.to_rfc3339()),
            last_error: status.last_error,
            periodic_enabled: status.periodic_enabled,
        }
    }
}

/// Configuration snapshot for the shell. Read-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncConfigDto {
    /// Base URL of the session gateway.
    pub server_url: String,

    /// Seconds between periodic sync attempts.
    pub interval_seconds: u64,
}

impl From<SyncConfig> for SyncConfigDto {
    fn from(config: SyncConfig) -> Self {
        SyncConfigDto {
            server_url: config.server_url,
            interval_seconds: config.interval_secs,
        }
    }
}

/// Outcome of a completed manual sync.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReceiptDto {
    /// Server-side timestamp of the cycle (ISO8601).
    pub server_time: String,
}

impl From<CycleReceipt> for SyncReceiptDto {
    fn from(receipt: CycleReceipt) -> Self {
        SyncReceiptDto {
            server_time: receipt.server_time.to_rfc3339(),
        }
    }
}

/// Plain confirmation payload for commands with nothing else to report.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Acknowledgement {
    pub message: String,
}

impl Acknowledgement {
    pub fn new(message: impl Into<String>) -> Self {
        Acknowledgement {
            message: message.into(),
        }
    }
}
