//! # User Repository
//!
//! Account rows and the atomic account-creation transaction.
//!
//! ## Atomic Registration
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                   create_account (register)                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   SINGLE TRANSACTION                            │   │
//! │  │                                                                 │   │
//! │  │  1. INSERT INTO users          (unique email enforced here)    │   │
//! │  │  2. INSERT INTO devices        (first device for the account)  │   │
//! │  │  3. INSERT INTO refresh_tokens (initial session)               │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  COMMIT ← All three succeed or none do; a failed registration         │
//! │           never leaves an orphaned user or device behind               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use crate::models::{DeviceRow, NewRefreshToken, UserRow};

/// Repository for user account operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Creates a new UserRepository.
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Finds a user by email (emails are stored lowercased).
    pub async fn find_by_email(&self, email: &str) -> DbResult<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, password_hash, created_at
            FROM users
            WHERE email = ?1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// Finds a user by id.
    pub async fn find_by_id(&self, id: &str) -> DbResult<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, password_hash, created_at
            FROM users
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// Creates a user together with its first device and refresh token in
    /// one transaction.
    ///
    /// The caller mints the row ids and the token string up front (token
    /// claims embed the ids, so they must exist before signing). A unique
    /// email violation surfaces as [`crate::DbError::UniqueViolation`].
    pub async fn create_account(
        &self,
        user: &UserRow,
        device: &DeviceRow,
        token: &NewRefreshToken,
    ) -> DbResult<()> {
        debug!(user_id = %user.id, device = %device.device_id, "Creating account");

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO users (id, email, password_hash, created_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(&user.id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO devices (id, user_id, device_id, device_name, last_sync_at)
            VALUES (?1, ?2, ?3, ?4, NULL)
            "#,
        )
        .bind(&device.id)
        .bind(&device.user_id)
        .bind(&device.device_id)
        .bind(&device.device_name)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO refresh_tokens (id, user_id, device_id, token, expires_at, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(uuid::Uuid::new_v4().to_string())
        .bind(&token.user_id)
        .bind(&token.device_id)
        .bind(&token.token)
        .bind(token.expires_at)
        .bind(chrono::Utc::now())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
