//! # Refresh Token Repository
//!
//! The stateful half of the two-token scheme. A refresh token is valid only
//! while its row exists AND `expires_at > now`; deleting the row is the
//! revocation mechanism that makes logout effective. Old rows for a device
//! are not proactively deleted (multiple live sessions per device are
//! legitimate) except by logout or the expiry sweep.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use crate::models::{NewRefreshToken, RefreshTokenRow};

/// Repository for refresh token operations.
#[derive(Debug, Clone)]
pub struct RefreshTokenRepository {
    pool: SqlitePool,
}

impl RefreshTokenRepository {
    /// Creates a new RefreshTokenRepository.
    pub fn new(pool: SqlitePool) -> Self {
        RefreshTokenRepository { pool }
    }

    /// Inserts a refresh token row.
    pub async fn insert(&self, new: &NewRefreshToken) -> DbResult<RefreshTokenRow> {
        let row = RefreshTokenRow {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: new.user_id.clone(),
            device_id: new.device_id.clone(),
            token: new.token.clone(),
            expires_at: new.expires_at,
            created_at: Utc::now(),
        };

        sqlx::query(
            r#"
            INSERT INTO refresh_tokens (id, user_id, device_id, token, expires_at, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&row.id)
        .bind(&row.user_id)
        .bind(&row.device_id)
        .bind(&row.token)
        .bind(row.expires_at)
        .bind(row.created_at)
        .execute(&self.pool)
        .await?;

        Ok(row)
    }

    /// Finds a non-expired row matching the exact token string.
    ///
    /// Returns `None` for unknown, revoked (deleted), or expired tokens -
    /// the caller treats all three identically.
    pub async fn find_valid(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> DbResult<Option<RefreshTokenRow>> {
        let row = sqlx::query_as::<_, RefreshTokenRow>(
            r#"
            SELECT id, user_id, device_id, token, expires_at, created_at
            FROM refresh_tokens
            WHERE token = ?1 AND expires_at > ?2
            "#,
        )
        .bind(token)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// Deletes the row matching the token string.
    ///
    /// Idempotent: deleting a non-existent token is not an error. Returns
    /// the number of rows removed (0 or 1).
    pub async fn delete_by_token(&self, token: &str) -> DbResult<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM refresh_tokens WHERE token = ?1
            "#,
        )
        .bind(token)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Deletes all expired rows. Optional housekeeping; correctness never
    /// depends on it running.
    pub async fn sweep_expired(&self, now: DateTime<Utc>) -> DbResult<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM refresh_tokens WHERE expires_at <= ?1
            "#,
        )
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() > 0 {
            debug!(removed = result.rows_affected(), "Swept expired refresh tokens");
        }

        Ok(result.rows_affected())
    }

    /// Counts live rows for a device row id.
    pub async fn count_for_device(&self, device_row_id: &str) -> DbResult<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM refresh_tokens WHERE device_id = ?1
            "#,
        )
        .bind(device_row_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::Duration;

    async fn db_with_device() -> (Database, String, String) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let user_id = uuid::Uuid::new_v4().to_string();
        let device_row_id = uuid::Uuid::new_v4().to_string();

        sqlx::query("INSERT INTO users (id, email, password_hash, created_at) VALUES (?1, ?2, ?3, ?4)")
            .bind(&user_id)
            .bind("a@example.com")
            .bind("$argon2id$stub")
            .bind(Utc::now())
            .execute(db.pool())
            .await
            .unwrap();
        sqlx::query("INSERT INTO devices (id, user_id, device_id) VALUES (?1, ?2, ?3)")
            .bind(&device_row_id)
            .bind(&user_id)
            .bind("dev1")
            .execute(db.pool())
            .await
            .unwrap();

        (db, user_id, device_row_id)
    }

    fn token_for(user_id: &str, device_row_id: &str, ttl: Duration) -> NewRefreshToken {
        NewRefreshToken {
            user_id: user_id.to_string(),
            device_id: device_row_id.to_string(),
            token: uuid::Uuid::new_v4().to_string(),
            expires_at: Utc::now() + ttl,
        }
    }

    #[tokio::test]
    async fn test_insert_and_find_valid() {
        let (db, user_id, device_row_id) = db_with_device().await;
        let new = token_for(&user_id, &device_row_id, Duration::days(7));

        db.refresh_tokens().insert(&new).await.unwrap();

        let found = db
            .refresh_tokens()
            .find_valid(&new.token, Utc::now())
            .await
            .unwrap();
        assert_eq!(found.unwrap().user_id, user_id);
    }

    #[tokio::test]
    async fn test_expired_row_is_invalid() {
        let (db, user_id, device_row_id) = db_with_device().await;
        let new = token_for(&user_id, &device_row_id, Duration::seconds(-10));

        db.refresh_tokens().insert(&new).await.unwrap();

        let found = db
            .refresh_tokens()
            .find_valid(&new.token, Utc::now())
            .await
            .unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let (db, user_id, device_row_id) = db_with_device().await;
        let new = token_for(&user_id, &device_row_id, Duration::days(7));
        db.refresh_tokens().insert(&new).await.unwrap();

        assert_eq!(db.refresh_tokens().delete_by_token(&new.token).await.unwrap(), 1);
        assert_eq!(db.refresh_tokens().delete_by_token(&new.token).await.unwrap(), 0);
        assert_eq!(
            db.refresh_tokens().delete_by_token("never-existed").await.unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn test_multiple_tokens_per_device() {
        let (db, user_id, device_row_id) = db_with_device().await;

        let first = token_for(&user_id, &device_row_id, Duration::days(7));
        let second = token_for(&user_id, &device_row_id, Duration::days(7));
        db.refresh_tokens().insert(&first).await.unwrap();
        db.refresh_tokens().insert(&second).await.unwrap();

        // Both usable independently until one is logged out.
        assert_eq!(
            db.refresh_tokens().count_for_device(&device_row_id).await.unwrap(),
            2
        );
        db.refresh_tokens().delete_by_token(&first.token).await.unwrap();
        assert!(db
            .refresh_tokens()
            .find_valid(&second.token, Utc::now())
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn test_sweep_expired() {
        let (db, user_id, device_row_id) = db_with_device().await;
        db.refresh_tokens()
            .insert(&token_for(&user_id, &device_row_id, Duration::seconds(-5)))
            .await
            .unwrap();
        db.refresh_tokens()
            .insert(&token_for(&user_id, &device_row_id, Duration::days(7)))
            .await
            .unwrap();

        let removed = db.refresh_tokens().sweep_expired(Utc::now()).await.unwrap();
        assert_eq!(removed, 1);
        assert_eq!(
            db.refresh_tokens().count_for_device(&device_row_id).await.unwrap(),
            1
        );
    }
}
