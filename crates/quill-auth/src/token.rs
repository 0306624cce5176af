//! JWT minting and validation.
//!
//! Access and refresh tokens share one claim shape but are signed with
//! distinct secrets and discriminated by `token_type`, so neither can be
//! replayed as the other.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, TokenData, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AuthError, AuthResult};

/// Default access token lifetime: 15 minutes.
pub const DEFAULT_ACCESS_TTL_SECS: i64 = 900;

/// Default refresh token lifetime: 7 days.
pub const DEFAULT_REFRESH_TTL_SECS: i64 = 604_800;

/// JWT claims structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user id)
    pub sub: String,

    /// Internal device row id the session is bound to
    pub device_id: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration (Unix timestamp)
    pub exp: i64,

    /// JWT ID (unique identifier for this token)
    pub jti: String,

    /// Token type ("access" or "refresh")
    pub token_type: String,
}

/// Signing configuration for the token keeper.
#[derive(Debug, Clone)]
pub struct TokenConfig {
    /// Secret for signing access tokens.
    pub access_secret: String,

    /// Secret for signing refresh tokens. Must differ from the access
    /// secret in any real deployment.
    pub refresh_secret: String,

    /// Access token lifetime in seconds.
    pub access_ttl_secs: i64,

    /// Refresh token lifetime in seconds.
    pub refresh_ttl_secs: i64,
}

impl TokenConfig {
    /// Creates a config with the default TTLs.
    pub fn new(access_secret: impl Into<String>, refresh_secret: impl Into<String>) -> Self {
        TokenConfig {
            access_secret: access_secret.into(),
            refresh_secret: refresh_secret.into(),
            access_ttl_secs: DEFAULT_ACCESS_TTL_SECS,
            refresh_ttl_secs: DEFAULT_REFRESH_TTL_SECS,
        }
    }

    /// Overrides the access token lifetime.
    pub fn access_ttl_secs(mut self, secs: i64) -> Self {
        self.access_ttl_secs = secs;
        self
    }

    /// Overrides the refresh token lifetime.
    pub fn refresh_ttl_secs(mut self, secs: i64) -> Self {
        self.refresh_ttl_secs = secs;
        self
    }
}

/// JWT token manager for the two-token scheme.
pub struct TokenKeeper {
    config: TokenConfig,
}

impl TokenKeeper {
    /// Creates a new token keeper.
    pub fn new(config: TokenConfig) -> Self {
        TokenKeeper { config }
    }

    /// Access token lifetime in seconds (exposed for response bodies).
    pub fn access_ttl_secs(&self) -> i64 {
        self.config.access_ttl_secs
    }

    /// Generates an access token bound to `(user_id, device_row_id)`.
    pub fn issue_access(&self, user_id: &str, device_row_id: &str) -> AuthResult<String> {
        self.issue(
            user_id,
            device_row_id,
            "access",
            self.config.access_ttl_secs,
            &self.config.access_secret,
        )
    }

    /// Generates a refresh token bound to `(user_id, device_row_id)`.
    ///
    /// Returns the token string together with its expiry so the caller can
    /// persist the matching store row.
    pub fn issue_refresh(
        &self,
        user_id: &str,
        device_row_id: &str,
    ) -> AuthResult<(String, DateTime<Utc>)> {
        let expires_at = Utc::now() + Duration::seconds(self.config.refresh_ttl_secs);
        let token = self.issue(
            user_id,
            device_row_id,
            "refresh",
            self.config.refresh_ttl_secs,
            &self.config.refresh_secret,
        )?;

        Ok((token, expires_at))
    }

    fn issue(
        &self,
        user_id: &str,
        device_row_id: &str,
        token_type: &str,
        ttl_secs: i64,
        secret: &str,
    ) -> AuthResult<String> {
        let now = Utc::now();
        let exp = now + Duration::seconds(ttl_secs);

        let claims = Claims {
            sub: user_id.to_string(),
            device_id: device_row_id.to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            jti: Uuid::new_v4().to_string(),
            token_type: token_type.to_string(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .map_err(|e| AuthError::Internal(format!("Failed to sign token: {}", e)))
    }

    /// Validates an access token's signature and expiry.
    ///
    /// Stateless: no store lookup. Device binding against live rows is the
    /// caller's responsibility (see `AuthService::verify_device_binding`).
    pub fn verify_access(&self, token: &str) -> AuthResult<Claims> {
        let claims = Self::verify(token, &self.config.access_secret)
            .map_err(|_| AuthError::InvalidAccessToken)?;

        if claims.token_type != "access" {
            return Err(AuthError::InvalidAccessToken);
        }

        Ok(claims)
    }

    /// Validates a refresh token's signature and expiry.
    ///
    /// Structural check only; the service additionally requires a live
    /// store row before honoring the token.
    pub fn verify_refresh(&self, token: &str) -> AuthResult<Claims> {
        let claims = Self::verify(token, &self.config.refresh_secret)
            .map_err(|_| AuthError::InvalidRefreshToken)?;

        if claims.token_type != "refresh" {
            return Err(AuthError::InvalidRefreshToken);
        }

        Ok(claims)
    }

    fn verify(token: &str, secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        let validation = Validation::default();

        let token_data: TokenData<Claims> = decode(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &validation,
        )?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keeper() -> TokenKeeper {
        TokenKeeper::new(TokenConfig::new("access-secret", "refresh-secret"))
    }

    #[test]
    fn test_access_roundtrip() {
        let keeper = keeper();

        let token = keeper.issue_access("user-1", "device-row-1").unwrap();
        let claims = keeper.verify_access(&token).unwrap();

        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.device_id, "device-row-1");
        assert_eq!(claims.token_type, "access");
    }

    #[test]
    fn test_refresh_roundtrip() {
        let keeper = keeper();

        let (token, expires_at) = keeper.issue_refresh("user-1", "device-row-1").unwrap();
        let claims = keeper.verify_refresh(&token).unwrap();

        assert_eq!(claims.token_type, "refresh");
        assert_eq!(claims.exp, expires_at.timestamp());
    }

    #[test]
    fn test_distinct_secrets() {
        let keeper = keeper();

        // A refresh token must never validate as an access token, and vice
        // versa: different secret, different token_type.
        let (refresh, _) = keeper.issue_refresh("user-1", "device-row-1").unwrap();
        assert!(keeper.verify_access(&refresh).is_err());

        let access = keeper.issue_access("user-1", "device-row-1").unwrap();
        assert!(keeper.verify_refresh(&access).is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let keeper = TokenKeeper::new(
            TokenConfig::new("a", "r")
                .access_ttl_secs(-120)
                .refresh_ttl_secs(-120),
        );

        let token = keeper.issue_access("user-1", "device-row-1").unwrap();
        assert!(keeper.verify_access(&token).is_err());
    }

    #[test]
    fn test_tampered_token_rejected() {
        let keeper = keeper();
        let token = keeper.issue_access("user-1", "device-row-1").unwrap();

        let other = TokenKeeper::new(TokenConfig::new("other-secret", "refresh-secret"));
        assert!(other.verify_access(&token).is_err());
    }
}
