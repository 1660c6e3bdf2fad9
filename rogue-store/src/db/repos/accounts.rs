//! Account repository
//!
//! Identity and credential storage:
//! - create: plain INSERT, uniqueness enforced by the constraint
//! - credentials are returned for the caller to verify, never compared here
//! - trainer ids assigned once via a single conditional UPDATE

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::error::{is_unique_violation, violated_constraint, DbError, Result};
use crate::models::{Account, Credentials, TrainerIds, Username};

/// Primary key constraint on `accounts(uuid)`, as named by PostgreSQL
const ACCOUNT_ID_KEY: &str = "accounts_pkey";

/// Account repository
pub struct AccountRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> AccountRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Register a new account.
    ///
    /// `Conflict` if the username (or id) is taken.
    pub async fn create(&self, id: Uuid, username: &Username, credentials: &Credentials) -> Result<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO accounts (uuid, username, hash, salt, registered)
            VALUES ($1, $2, $3, $4, NOW())
            "#,
        )
        .bind(id)
        .bind(username.as_str())
        .bind(&credentials.hash[..])
        .bind(&credentials.salt[..])
        .execute(self.pool)
        .await;

        match result {
            Ok(_) => {
                tracing::debug!(%id, username = %username, "account created");
                Ok(())
            }
            Err(err) if is_unique_violation(&err) => match violated_constraint(&err) {
                Some(ACCOUNT_ID_KEY) => Err(DbError::conflict("account id", id)),
                _ => Err(DbError::conflict("username", username)),
            },
            Err(err) => Err(err.into()),
        }
    }

    /// Fetch stored hash and salt for a username.
    pub async fn credentials(&self, username: &str) -> Result<Credentials> {
        let row = sqlx::query("SELECT hash, salt FROM accounts WHERE username = $1")
            .bind(username)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("account", username))?;

        let hash: Vec<u8> = row.get("hash");
        let salt: Vec<u8> = row.get("salt");
        Credentials::from_slices(&hash, &salt)
            .map_err(|_| DbError::corrupt("stored credentials have the wrong width"))
    }

    /// Overwrite hash and salt.
    pub async fn update_password(&self, id: Uuid, credentials: &Credentials) -> Result<()> {
        let result = sqlx::query("UPDATE accounts SET hash = $2, salt = $3 WHERE uuid = $1")
            .bind(id)
            .bind(&credentials.hash[..])
            .bind(&credentials.salt[..])
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("account", id));
        }
        Ok(())
    }

    /// Stamp last activity with the store's current time.
    ///
    /// Called on every authenticated request, so this is one primary-key
    /// UPDATE and nothing else. Unknown ids are ignored.
    pub async fn touch_last_activity(&self, id: Uuid) -> Result<()> {
        sqlx::query("UPDATE accounts SET last_activity = NOW() WHERE uuid = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(())
    }

    pub async fn username(&self, id: Uuid) -> Result<String> {
        sqlx::query_scalar::<_, String>("SELECT username FROM accounts WHERE uuid = $1")
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("account", id))
    }

    /// Full account record, credentials excluded.
    pub async fn get(&self, id: Uuid) -> Result<Account> {
        let row = sqlx::query(
            r#"
            SELECT uuid, username, trainer_id, secret_id, registered,
                   last_logged_in, last_activity, banned
            FROM accounts
            WHERE uuid = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("account", id))?;

        Ok(Account {
            id: row.get("uuid"),
            username: row.get("username"),
            trainer_ids: trainer_ids_from(row.get("trainer_id"), row.get("secret_id")),
            registered: row.get::<DateTime<Utc>, _>("registered"),
            last_logged_in: row.get("last_logged_in"),
            last_activity: row.get("last_activity"),
            banned: row.get("banned"),
        })
    }

    /// Stored trainer ids, `None` until first assignment.
    pub async fn trainer_ids(&self, id: Uuid) -> Result<Option<TrainerIds>> {
        let row = sqlx::query("SELECT trainer_id, secret_id FROM accounts WHERE uuid = $1")
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("account", id))?;

        Ok(trainer_ids_from(row.get("trainer_id"), row.get("secret_id")))
    }

    /// Overwrite both trainer ids.
    pub async fn set_trainer_ids(&self, id: Uuid, ids: TrainerIds) -> Result<()> {
        let result = sqlx::query("UPDATE accounts SET trainer_id = $2, secret_id = $3 WHERE uuid = $1")
            .bind(id)
            .bind(ids.trainer_id)
            .bind(ids.secret_id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("account", id));
        }
        Ok(())
    }

    /// Return the account's trainer ids, assigning a random pair first if
    /// none is stored. Concurrent callers all observe the first writer's pair.
    pub async fn get_or_assign_trainer_ids(&self, id: Uuid) -> Result<TrainerIds> {
        let candidate = TrainerIds::random();
        let row = sqlx::query(
            r#"
            UPDATE accounts
            SET trainer_id = COALESCE(trainer_id, $2),
                secret_id = COALESCE(secret_id, $3)
            WHERE uuid = $1
            RETURNING trainer_id, secret_id
            "#,
        )
        .bind(id)
        .bind(candidate.trainer_id)
        .bind(candidate.secret_id)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("account", id))?;

        trainer_ids_from(row.get("trainer_id"), row.get("secret_id"))
            .ok_or_else(|| DbError::corrupt("trainer ids missing after assignment"))
    }

    /// Set or clear the ban flag. Banned accounts drop out of rankings.
    pub async fn set_banned(&self, id: Uuid, banned: bool) -> Result<()> {
        let result = sqlx::query("UPDATE accounts SET banned = $2 WHERE uuid = $1")
            .bind(id)
            .bind(banned)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("account", id));
        }
        tracing::info!(%id, banned, "ban flag updated");
        Ok(())
    }
}

fn trainer_ids_from(trainer_id: Option<i32>, secret_id: Option<i32>) -> Option<TrainerIds> {
    match (trainer_id, secret_id) {
        (Some(trainer_id), Some(secret_id)) => Some(TrainerIds {
            trainer_id,
            secret_id,
        }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trainer_ids_need_both_columns() {
        assert_eq!(
            trainer_ids_from(Some(1), Some(2)),
            Some(TrainerIds {
                trainer_id: 1,
                secret_id: 2
            })
        );
        assert_eq!(trainer_ids_from(Some(1), None), None);
        assert_eq!(trainer_ids_from(None, None), None);
    }
}
