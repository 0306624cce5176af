//! # Authentication Service
//!
//! The four lifecycle operations of the device-scoped token scheme.
//!
//! ## Operation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Token Lifecycle                                    │
//! │                                                                         │
//! │  register(email, pw, device) ──► user + device + refresh row created   │
//! │       │                          atomically; fresh token pair issued   │
//! │       ▼                                                                 │
//! │  login(email, pw, device) ─────► device row upserted; fresh token      │
//! │       │                          pair issued (old rows stay live)     │
//! │       ▼                                                                 │
//! │  refresh(refresh_token) ───────► signature + expiry check, THEN store  │
//! │       │                          row lookup; new access token only     │
//! │       ▼                          (refresh token is NOT rotated)        │
//! │  logout(refresh_token) ────────► row deleted; structurally valid       │
//! │                                  copies of the token are now dead      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use quill_core::{Device, User};
use quill_db::{Database, DeviceRow, NewRefreshToken, UserRow};

use crate::error::{AuthError, AuthResult};
use crate::password;
use crate::token::{Claims, TokenKeeper};

/// A freshly issued session: the user plus a token pair.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub user: User,
    pub device: Device,
    pub access_token: String,
    pub refresh_token: String,
}

/// Authentication service backed by the credential store.
pub struct AuthService {
    db: Database,
    tokens: TokenKeeper,
}

impl AuthService {
    /// Creates a new authentication service.
    pub fn new(db: Database, tokens: TokenKeeper) -> Self {
        AuthService { db, tokens }
    }

    /// Access token lifetime in seconds (exposed for response bodies).
    pub fn access_ttl_secs(&self) -> i64 {
        self.tokens.access_ttl_secs()
    }

    /// Registers a new account from a device.
    ///
    /// Fails with [`AuthError::Conflict`] if the email already exists. The
    /// user, device, and refresh token rows are created in one transaction;
    /// a failure leaves nothing behind.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        device_id: &str,
        device_name: Option<&str>,
    ) -> AuthResult<AuthSession> {
        let email = quill_core::validation::validate_email(email)?;

        if self.db.users().find_by_email(&email).await?.is_some() {
            return Err(AuthError::Conflict);
        }

        let password_hash = password::hash_password(password)?;

        // Row ids are minted here because the token claims embed them, and
        // the token row must land in the same transaction as the rows it
        // references.
        let user_row = UserRow {
            id: Uuid::new_v4().to_string(),
            email,
            password_hash,
            created_at: Utc::now(),
        };
        let device_row = DeviceRow {
            id: Uuid::new_v4().to_string(),
            user_id: user_row.id.clone(),
            device_id: device_id.to_string(),
            device_name: device_name.map(str::to_string),
            last_sync_at: None,
        };

        let access_token = self.tokens.issue_access(&user_row.id, &device_row.id)?;
        let (refresh_token, expires_at) =
            self.tokens.issue_refresh(&user_row.id, &device_row.id)?;

        self.db
            .users()
            .create_account(
                &user_row,
                &device_row,
                &NewRefreshToken {
                    user_id: user_row.id.clone(),
                    device_id: device_row.id.clone(),
                    token: refresh_token.clone(),
                    expires_at,
                },
            )
            .await?;

        info!(user_id = %user_row.id, device_id = %device_id, "Account registered");

        Ok(AuthSession {
            user: user_row.into(),
            device: device_row.into(),
            access_token,
            refresh_token,
        })
    }

    /// Logs a device into an existing account.
    ///
    /// Fails with [`AuthError::InvalidCredentials`] on unknown email or
    /// wrong password - the two are indistinguishable to the caller. Upserts
    /// the device row and always issues a fresh token pair; earlier refresh
    /// tokens stay valid until logout or expiry.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        device_id: &str,
        device_name: Option<&str>,
    ) -> AuthResult<AuthSession> {
        let email = quill_core::validation::validate_email(email)?;

        let user_row = self
            .db
            .users()
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !password::verify_password(password, &user_row.password_hash) {
            warn!(user_id = %user_row.id, "Login rejected");
            return Err(AuthError::InvalidCredentials);
        }

        let device_row = self
            .db
            .devices()
            .upsert(&user_row.id, device_id, device_name)
            .await?;

        let access_token = self.tokens.issue_access(&user_row.id, &device_row.id)?;
        let (refresh_token, expires_at) =
            self.tokens.issue_refresh(&user_row.id, &device_row.id)?;

        self.db
            .refresh_tokens()
            .insert(&NewRefreshToken {
                user_id: user_row.id.clone(),
                device_id: device_row.id.clone(),
                token: refresh_token.clone(),
                expires_at,
            })
            .await?;

        info!(user_id = %user_row.id, device_id = %device_id, "Device logged in");

        Ok(AuthSession {
            user: user_row.into(),
            device: device_row.into(),
            access_token,
            refresh_token,
        })
    }

    /// Exchanges a refresh token for a new access token.
    ///
    /// Belt and suspenders: the token must carry a valid signature and
    /// expiry AND have a matching, non-expired row in the store. A
    /// structurally valid but revoked token fails exactly like a forged
    /// one. The refresh token itself is not rotated.
    pub async fn refresh(&self, refresh_token: &str) -> AuthResult<String> {
        let claims = self.tokens.verify_refresh(refresh_token)?;

        let row = self
            .db
            .refresh_tokens()
            .find_valid(refresh_token, Utc::now())
            .await?
            .ok_or(AuthError::InvalidRefreshToken)?;

        // The row and the claims must agree on the session identity.
        if row.user_id != claims.sub || row.device_id != claims.device_id {
            warn!(user_id = %claims.sub, "Refresh token identity mismatch");
            return Err(AuthError::InvalidRefreshToken);
        }

        self.tokens.issue_access(&claims.sub, &claims.device_id)
    }

    /// Revokes a refresh token by deleting its row.
    ///
    /// Idempotent: logging out a token that was never issued, or twice, is
    /// not an error.
    pub async fn logout(&self, refresh_token: &str) -> AuthResult<()> {
        let removed = self
            .db
            .refresh_tokens()
            .delete_by_token(refresh_token)
            .await?;

        if removed > 0 {
            info!("Session revoked");
        }

        Ok(())
    }

    /// Validates an access token's signature and expiry. Stateless.
    pub fn verify_access(&self, access_token: &str) -> AuthResult<Claims> {
        self.tokens.verify_access(access_token)
    }

    /// Validates an access token AND its device binding.
    ///
    /// The claims are accepted only while the embedded device row still
    /// exists and is owned by the embedded user id: deleting a device
    /// invalidates future use of tokens that reference it, even though the
    /// tokens themselves stay structurally valid until expiry.
    pub async fn verify_device_binding(&self, access_token: &str) -> AuthResult<Claims> {
        let claims = self.verify_access(access_token)?;

        self.db
            .devices()
            .find_owned(&claims.device_id, &claims.sub)
            .await?
            .ok_or(AuthError::InvalidAccessToken)?;

        Ok(claims)
    }

    /// Deletes expired refresh token rows. Optional housekeeping.
    pub async fn sweep_expired(&self) -> AuthResult<u64> {
        Ok(self.db.refresh_tokens().sweep_expired(Utc::now()).await?)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::TokenConfig;
    use quill_db::DbConfig;

    async fn service() -> AuthService {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        AuthService::new(
            db,
            TokenKeeper::new(TokenConfig::new("access-secret", "refresh-secret")),
        )
    }

    #[tokio::test]
    async fn test_register_binds_device() {
        let svc = service().await;
        let session = svc
            .register("a@x.com", "pw12345678", "dev1", Some("Laptop"))
            .await
            .unwrap();

        assert!(!session.access_token.is_empty());
        assert!(!session.refresh_token.is_empty());

        // The access token's embedded device id resolves to a device row
        // owned by the embedded user id.
        let claims = svc.verify_device_binding(&session.access_token).await.unwrap();
        assert_eq!(claims.sub, session.user.id);
        assert_eq!(claims.device_id, session.device.id);
        assert_eq!(session.device.device_id, "dev1");
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts_regardless_of_device() {
        let svc = service().await;
        svc.register("a@x.com", "pw12345678", "dev1", None)
            .await
            .unwrap();

        let err = svc
            .register("a@x.com", "pw12345678", "dev2", None)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Conflict));
    }

    #[tokio::test]
    async fn test_login_wrong_password_and_unknown_email_identical() {
        let svc = service().await;
        svc.register("a@x.com", "pw12345678", "dev1", None)
            .await
            .unwrap();

        let wrong_pw = svc
            .login("a@x.com", "not-the-password", "dev1", None)
            .await
            .unwrap_err();
        let no_user = svc
            .login("nobody@x.com", "pw12345678", "dev1", None)
            .await
            .unwrap_err();

        assert!(matches!(wrong_pw, AuthError::InvalidCredentials));
        assert!(matches!(no_user, AuthError::InvalidCredentials));
        assert_eq!(wrong_pw.to_string(), no_user.to_string());
    }

    #[tokio::test]
    async fn test_repeat_login_upserts_one_device_two_tokens() {
        let svc = service().await;
        let first = svc
            .register("a@x.com", "pw12345678", "dev1", None)
            .await
            .unwrap();
        let second = svc
            .login("a@x.com", "pw12345678", "dev1", None)
            .await
            .unwrap();

        // One device row, two independently usable refresh tokens.
        assert_eq!(first.device.id, second.device.id);
        assert_ne!(first.refresh_token, second.refresh_token);

        assert!(svc.refresh(&first.refresh_token).await.is_ok());
        assert!(svc.refresh(&second.refresh_token).await.is_ok());

        // Logging one out leaves the other alive.
        svc.logout(&first.refresh_token).await.unwrap();
        assert!(svc.refresh(&first.refresh_token).await.is_err());
        assert!(svc.refresh(&second.refresh_token).await.is_ok());
    }

    #[tokio::test]
    async fn test_revoked_token_fails_despite_valid_signature() {
        let svc = service().await;
        let session = svc
            .register("a@x.com", "pw12345678", "dev1", None)
            .await
            .unwrap();

        svc.logout(&session.refresh_token).await.unwrap();

        let err = svc.refresh(&session.refresh_token).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidRefreshToken));
    }

    #[tokio::test]
    async fn test_logout_is_idempotent() {
        let svc = service().await;
        let session = svc
            .register("a@x.com", "pw12345678", "dev1", None)
            .await
            .unwrap();

        svc.logout(&session.refresh_token).await.unwrap();
        svc.logout(&session.refresh_token).await.unwrap();
        svc.logout("never-issued").await.unwrap();
    }

    #[tokio::test]
    async fn test_access_token_rejected_as_refresh() {
        let svc = service().await;
        let session = svc
            .register("a@x.com", "pw12345678", "dev1", None)
            .await
            .unwrap();

        let err = svc.refresh(&session.access_token).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidRefreshToken));
    }

    #[tokio::test]
    async fn test_device_deletion_unbinds_access_token() {
        let svc = service().await;
        let session = svc
            .register("a@x.com", "pw12345678", "dev1", None)
            .await
            .unwrap();

        sqlx::query("DELETE FROM devices WHERE id = ?1")
            .bind(&session.device.id)
            .execute(svc.db.pool())
            .await
            .unwrap();

        // Signature and expiry are still fine; the binding is not.
        assert!(svc.verify_access(&session.access_token).is_ok());
        let err = svc
            .verify_device_binding(&session.access_token)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidAccessToken));
    }
}
