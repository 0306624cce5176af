//! Handler for the `/sync` resource.
//!
//! One authenticated sync cycle from the device's perspective. The note
//! payload exchange lives in its own service; this endpoint is the unit of
//! work the orchestrator drives: it authenticates the device-bound access
//! token and records the completed cycle against the device row.

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use crate::error::ServerError;
use crate::extract::AuthenticatedDevice;
use crate::AppState;

/// Routes mounted at `/sync`.
pub fn router() -> Router<AppState> {
    Router::new().route("/sync", post(sync_cycle))
}

/// Response for `POST /sync`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncCycleBody {
    /// Server-side timestamp of the completed cycle.
    pub server_time: DateTime<Utc>,

    /// Internal device row id the cycle was recorded against.
    pub device_id: String,
}

/// POST /sync
///
/// Runs one sync cycle for the authenticated device. 401 when the bearer
/// token is missing, expired, or no longer bound to a live device row.
pub async fn sync_cycle(
    State(state): State<AppState>,
    device: AuthenticatedDevice,
) -> Result<Json<SyncCycleBody>, ServerError> {
    let now = Utc::now();

    state
        .db
        .devices()
        .touch_last_sync(&device.device_row_id, now)
        .await
        .map_err(|e| ServerError::Internal(e.to_string()))?;

    debug!(
        user_id = %device.user_id,
        device_row_id = %device.device_row_id,
        "Sync cycle recorded"
    );

    Ok(Json(SyncCycleBody {
        server_time: now,
        device_id: device.device_row_id,
    }))
}
