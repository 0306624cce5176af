//! # Quillsync Session Gateway
//!
//! HTTP server exposing the token lifecycle and the per-cycle sync
//! endpoint.
//!
//! ## Routes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Gateway Routes                                   │
//! │                                                                         │
//! │  POST /auth/register  → 201 {user, accessToken, refreshToken}          │
//! │                         409 duplicate email · 400 validation           │
//! │  POST /auth/login     → 200 {user, accessToken, refreshToken}          │
//! │                         401 invalid credentials                        │
//! │  POST /auth/refresh   → 200 {accessToken} · 403 invalid token          │
//! │  POST /auth/logout    → 200 {message}                                  │
//! │  POST /sync           → 200 {serverTime, deviceId} · 401               │
//! │                         (Bearer access token, device binding checked)  │
//! │  GET  /health         → 200 {status, database}                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod extract;
pub mod routes;

use std::sync::Arc;

use axum::Router;

use quill_auth::AuthService;
use quill_db::Database;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub auth: Arc<AuthService>,
}

impl AppState {
    /// Creates the shared state.
    pub fn new(db: Database, auth: AuthService) -> Self {
        AppState {
            db,
            auth: Arc::new(auth),
        }
    }
}

/// Builds the gateway router.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(routes::auth::router())
        .merge(routes::sync::router())
        .merge(routes::health::router())
        .with_state(state)
}
