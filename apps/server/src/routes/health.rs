//! Health check endpoint.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::AppState;

/// Routes mounted at `/health`.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

#[derive(Debug, Serialize)]
pub struct HealthBody {
    pub status: &'static str,
    pub database: bool,
}

/// GET /health
pub async fn health(State(state): State<AppState>) -> Json<HealthBody> {
    let database = state.db.health_check().await;

    Json(HealthBody {
        status: if database { "ok" } else { "degraded" },
        database,
    })
}
