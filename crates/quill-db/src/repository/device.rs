//! # Device Repository
//!
//! Device rows keyed on `(user_id, device_id)`. A device row is created on
//! first registration/login from that device and updated in place on every
//! later login; sync cycles touch `last_sync_at`.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::models::DeviceRow;

/// Repository for device record operations.
#[derive(Debug, Clone)]
pub struct DeviceRepository {
    pool: SqlitePool,
}

impl DeviceRepository {
    /// Creates a new DeviceRepository.
    pub fn new(pool: SqlitePool) -> Self {
        DeviceRepository { pool }
    }

    /// Inserts or updates the device row for `(user_id, device_id)`.
    ///
    /// Insert if this is a new device id for the user; otherwise update the
    /// name (a missing name keeps the stored one). Single-row upsert, no
    /// cross-row transaction needed.
    pub async fn upsert(
        &self,
        user_id: &str,
        device_id: &str,
        device_name: Option<&str>,
    ) -> DbResult<DeviceRow> {
        debug!(user_id = %user_id, device_id = %device_id, "Upserting device");

        let row = sqlx::query_as::<_, DeviceRow>(
            r#"
            INSERT INTO devices (id, user_id, device_id, device_name, last_sync_at)
            VALUES (?1, ?2, ?3, ?4, NULL)
            ON CONFLICT (user_id, device_id) DO UPDATE SET
                device_name = COALESCE(excluded.device_name, devices.device_name)
            RETURNING id, user_id, device_id, device_name, last_sync_at
            "#,
        )
        .bind(uuid::Uuid::new_v4().to_string())
        .bind(user_id)
        .bind(device_id)
        .bind(device_name)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    /// Finds a device by its internal row id.
    pub async fn find_by_id(&self, id: &str) -> DbResult<Option<DeviceRow>> {
        let row = sqlx::query_as::<_, DeviceRow>(
            r#"
            SELECT id, user_id, device_id, device_name, last_sync_at
            FROM devices
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// Finds a device by row id only if it is still owned by `user_id`.
    ///
    /// This is the lookup behind the device-binding invariant: token claims
    /// are accepted only while this returns a row.
    pub async fn find_owned(&self, id: &str, user_id: &str) -> DbResult<Option<DeviceRow>> {
        let row = sqlx::query_as::<_, DeviceRow>(
            r#"
            SELECT id, user_id, device_id, device_name, last_sync_at
            FROM devices
            WHERE id = ?1 AND user_id = ?2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// Records a completed sync cycle for the device.
    pub async fn touch_last_sync(&self, id: &str, when: DateTime<Utc>) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE devices SET last_sync_at = ?1 WHERE id = ?2
            "#,
        )
        .bind(when)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Device", id));
        }

        Ok(())
    }

    /// Counts device rows for a user.
    pub async fn count_for_user(&self, user_id: &str) -> DbResult<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM devices WHERE user_id = ?1
            "#,
        )
        .bind(user_id)
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
    use crate::pool::{Database, DbConfig};
    use chrono::Utc;

    async fn db_with_user(email: &str) -> (Database, String) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let user_id = uuid::Uuid::new_v4().to_string();

        sqlx::query("INSERT INTO users (id, email, password_hash, created_at) VALUES (?1, ?2, ?3, ?4)")
            .bind(&user_id)
            .bind(email)
            .bind("$argon2id$stub")
            .bind(Utc::now())
            .execute(db.pool())
            .await
            .unwrap();

        (db, user_id)
    }

    #[tokio::test]
    async fn test_upsert_is_single_row() {
        let (db, user_id) = db_with_user("a@example.com").await;

        let first = db
            .devices()
            .upsert(&user_id, "dev1", Some("Laptop"))
            .await
            .unwrap();
        let second = db
            .devices()
            .upsert(&user_id, "dev1", Some("Laptop (renamed)"))
            .await
            .unwrap();

        // Same row, updated name.
        assert_eq!(first.id, second.id);
        assert_eq!(second.device_name.as_deref(), Some("Laptop (renamed)"));
        assert_eq!(db.devices().count_for_user(&user_id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_upsert_keeps_name_when_absent() {
        let (db, user_id) = db_with_user("a@example.com").await;

        db.devices()
            .upsert(&user_id, "dev1", Some("Laptop"))
            .await
            .unwrap();
        let row = db.devices().upsert(&user_id, "dev1", None).await.unwrap();

        assert_eq!(row.device_name.as_deref(), Some("Laptop"));
    }

    #[tokio::test]
    async fn test_find_owned_enforces_ownership() {
        let (db, user_id) = db_with_user("a@example.com").await;
        let row = db.devices().upsert(&user_id, "dev1", None).await.unwrap();

        assert!(db
            .devices()
            .find_owned(&row.id, &user_id)
            .await
            .unwrap()
            .is_some());
        assert!(db
            .devices()
            .find_owned(&row.id, "someone-else")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_touch_last_sync() {
        let (db, user_id) = db_with_user("a@example.com").await;
        let row = db.devices().upsert(&user_id, "dev1", None).await.unwrap();
        assert!(row.last_sync_at.is_none());

        let now = Utc::now();
        db.devices().touch_last_sync(&row.id, now).await.unwrap();

        let updated = db.devices().find_by_id(&row.id).await.unwrap().unwrap();
        assert!(updated.last_sync_at.is_some());
    }
}
