//! Save data repository
//!
//! Blobs are stored and returned untouched. Every write refreshes the
//! record's timestamp.

use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{is_foreign_key_violation, DbError, Result};
use crate::models::{SaveRecord, SessionSlot};

/// System and per-slot session save data
pub struct SaveDataRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> SaveDataRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn write_system(&self, id: Uuid, data: &[u8]) -> Result<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO system_save_data (uuid, data, timestamp)
            VALUES ($1, $2, NOW())
            ON CONFLICT (uuid) DO UPDATE SET data = EXCLUDED.data, timestamp = EXCLUDED.timestamp
            "#,
        )
        .bind(id)
        .bind(data)
        .execute(self.pool)
        .await;

        written(result, id, "system save written", data.len())
    }

    pub async fn read_system(&self, id: Uuid) -> Result<SaveRecord> {
        sqlx::query_as::<_, SaveRecord>("SELECT data, timestamp FROM system_save_data WHERE uuid = $1")
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("system save", id))
    }

    pub async fn delete_system(&self, id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM system_save_data WHERE uuid = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(())
    }

    pub async fn write_session(&self, id: Uuid, slot: SessionSlot, data: &[u8]) -> Result<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO session_save_data (uuid, slot, data, timestamp)
            VALUES ($1, $2, $3, NOW())
            ON CONFLICT (uuid, slot) DO UPDATE SET data = EXCLUDED.data, timestamp = EXCLUDED.timestamp
            "#,
        )
        .bind(id)
        .bind(slot.get())
        .bind(data)
        .execute(self.pool)
        .await;

        written(result, id, "session save written", data.len())
    }

    pub async fn read_session(&self, id: Uuid, slot: SessionSlot) -> Result<SaveRecord> {
        sqlx::query_as::<_, SaveRecord>(
            "SELECT data, timestamp FROM session_save_data WHERE uuid = $1 AND slot = $2",
        )
        .bind(id)
        .bind(slot.get())
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("session save", format!("{id}/{}", slot.get())))
    }

    pub async fn delete_session(&self, id: Uuid, slot: SessionSlot) -> Result<()> {
        sqlx::query("DELETE FROM session_save_data WHERE uuid = $1 AND slot = $2")
            .bind(id)
            .bind(slot.get())
            .execute(self.pool)
            .await?;
        Ok(())
    }

    /// Occupied session slots, lowest first.
    pub async fn session_slots(&self, id: Uuid) -> Result<Vec<SessionSlot>> {
        let slots: Vec<i16> =
            sqlx::query_scalar("SELECT slot FROM session_save_data WHERE uuid = $1 ORDER BY slot")
                .bind(id)
                .fetch_all(self.pool)
                .await?;

        slots
            .into_iter()
            .map(|slot| {
                SessionSlot::new(i64::from(slot)).map_err(|_| DbError::corrupt("session slot out of range"))
            })
            .collect()
    }
}

fn written(
    result: std::result::Result<sqlx::postgres::PgQueryResult, sqlx::Error>,
    id: Uuid,
    message: &'static str,
    bytes: usize,
) -> Result<()> {
    match result {
        Ok(_) => {
            tracing::debug!(%id, bytes, "{message}");
            Ok(())
        }
        Err(err) if is_foreign_key_violation(&err) => Err(DbError::not_found("account", id)),
        Err(err) => Err(err.into()),
    }
}
