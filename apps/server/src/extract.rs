//! Bearer-token extractor for authenticated routes.
//!
//! Verifies the access token's signature and expiry, then the device
//! binding: the claims are honored only while the embedded device row
//! still belongs to the embedded user.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use crate::error::ServerError;
use crate::AppState;

/// The authenticated identity behind a Bearer access token.
#[derive(Debug, Clone)]
pub struct AuthenticatedDevice {
    /// User id from the token claims.
    pub user_id: String,

    /// Internal device row id from the token claims.
    pub device_row_id: String,
}

impl FromRequestParts<AppState> for AuthenticatedDevice {
    type Rejection = ServerError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(ServerError::Unauthorized)?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or(ServerError::Unauthorized)?;

        let claims = state
            .auth
            .verify_device_binding(token)
            .await
            .map_err(|_| ServerError::Unauthorized)?;

        Ok(AuthenticatedDevice {
            user_id: claims.sub,
            device_row_id: claims.device_id,
        })
    }
}
