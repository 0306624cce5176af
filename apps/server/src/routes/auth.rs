//! Handlers for the `/auth` resource.
//!
//! Boundary glue: request-shape validation, status mapping, and nothing
//! else. Passwords and raw refresh tokens never appear in log fields.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::info;

use quill_auth::AuthSession;
use quill_core::{validation, User};

use crate::error::ServerError;
use crate::AppState;

/// Routes mounted at `/auth`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
        .route("/auth/logout", post(logout))
}

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/register` and `POST /auth/login`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialsBody {
    pub email: String,
    pub password: String,
    pub device_id: String,
    #[serde(default)]
    pub device_name: Option<String>,
}

/// Request body for `POST /auth/refresh` and `POST /auth/logout`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenBody {
    pub refresh_token: String,
}

/// Successful register/login response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionBody {
    pub user: User,
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
}

/// Response for `POST /auth/refresh`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshBody {
    pub access_token: String,
}

/// Response for `POST /auth/logout`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageBody {
    pub message: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /auth/register
///
/// Create an account from a device. 201 on success, 409 on duplicate
/// email, 400 on validation failure.
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<CredentialsBody>,
) -> Result<(StatusCode, Json<SessionBody>), ServerError> {
    validate_credentials(&body)?;

    let session = state
        .auth
        .register(
            &body.email,
            &body.password,
            body.device_id.trim(),
            body.device_name.as_deref(),
        )
        .await?;

    info!(user_id = %session.user.id, device_id = %body.device_id, "Registered");

    Ok((StatusCode::CREATED, Json(session_body(session, &state))))
}

/// POST /auth/login
///
/// Authenticate an existing account from a device. 200 on success, 401 on
/// invalid credentials.
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<CredentialsBody>,
) -> Result<Json<SessionBody>, ServerError> {
    validate_credentials(&body)?;

    let session = state
        .auth
        .login(
            &body.email,
            &body.password,
            body.device_id.trim(),
            body.device_name.as_deref(),
        )
        .await?;

    info!(user_id = %session.user.id, device_id = %body.device_id, "Logged in");

    Ok(Json(session_body(session, &state)))
}

/// POST /auth/refresh
///
/// Exchange a refresh token for a new access token. 403 on any mismatch,
/// signature failure, revocation, or expiry.
pub async fn refresh(
    State(state): State<AppState>,
    Json(body): Json<TokenBody>,
) -> Result<Json<RefreshBody>, ServerError> {
    let access_token = state.auth.refresh(&body.refresh_token).await?;

    Ok(Json(RefreshBody { access_token }))
}

/// POST /auth/logout
///
/// Revoke a refresh token. Idempotent: always 200.
pub async fn logout(
    State(state): State<AppState>,
    Json(body): Json<TokenBody>,
) -> Result<Json<MessageBody>, ServerError> {
    state.auth.logout(&body.refresh_token).await?;

    Ok(Json(MessageBody {
        message: "Logged out".to_string(),
    }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Validates the request shape, collecting every failure into one 400.
fn validate_credentials(body: &CredentialsBody) -> Result<(), ServerError> {
    let mut details = Vec::new();

    if let Err(e) = validation::validate_email(&body.email) {
        details.push(e.to_string());
    }
    if let Err(e) = validation::validate_password(&body.password) {
        details.push(e.to_string());
    }
    if let Err(e) = validation::validate_device_id(&body.device_id) {
        details.push(e.to_string());
    }
    if let Some(name) = &body.device_name {
        if let Err(e) = validation::validate_device_name(name) {
            details.push(e.to_string());
        }
    }

    if details.is_empty() {
        Ok(())
    } else {
        Err(ServerError::Validation { details })
    }
}

fn session_body(session: AuthSession, state: &AppState) -> SessionBody {
    SessionBody {
        user: session.user,
        access_token: session.access_token,
        refresh_token: session.refresh_token,
        expires_in: state.auth.access_ttl_secs(),
    }
}
