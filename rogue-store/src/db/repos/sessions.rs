//! Session repository
//!
//! Token lifecycle: Created -> Active -> {Deactivated | Expired} -> Deleted.
//!
//! At most one session per account is active. Activation is a single
//! UPDATE keyed on token equality, so it holds across processes sharing the
//! store without any in-process lock.

use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::db::pool;
use crate::error::{DbError, Result};
use crate::models::SessionToken;

/// Session validity window
pub const SESSION_TTL_DAYS: i32 = 7;

/// Session repository
pub struct SessionRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> SessionRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Issue a fresh token for `username` and make it the account's only
    /// active session (atomic).
    ///
    /// The account row is locked for the duration, so concurrent logins for
    /// the same account apply one after the other.
    pub async fn issue(&self, username: &str) -> Result<SessionToken> {
        let token = SessionToken::generate();
        let mut tx = pool::begin(self.pool).await?;

        let account: Uuid =
            sqlx::query_scalar("SELECT uuid FROM accounts WHERE username = $1 FOR UPDATE")
                .bind(username)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| DbError::not_found("account", username))?;

        sqlx::query(
            r#"
            INSERT INTO sessions (token, uuid, active, expire)
            VALUES ($1, $2, FALSE, NOW() + make_interval(days => $3))
            "#,
        )
        .bind(token.as_bytes())
        .bind(account)
        .bind(SESSION_TTL_DAYS)
        .execute(&mut *tx)
        .await?;

        sqlx::query("UPDATE sessions SET active = (token = $1) WHERE uuid = $2")
            .bind(token.as_bytes())
            .bind(account)
            .execute(&mut *tx)
            .await?;

        sqlx::query("UPDATE accounts SET last_logged_in = NOW() WHERE uuid = $1")
            .bind(account)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        tracing::debug!(%account, "session issued");
        Ok(token)
    }

    /// Whether the token is the account's active session.
    pub async fn is_active(&self, token: &SessionToken) -> Result<bool> {
        sqlx::query_scalar::<_, bool>("SELECT active FROM sessions WHERE token = $1")
            .bind(token.as_bytes())
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("session", token.redacted()))
    }

    /// Resolve the owning account. `Expired` once the validity window passed.
    pub async fn resolve_account(&self, token: &SessionToken) -> Result<Uuid> {
        let row = sqlx::query("SELECT uuid, expire > NOW() AS live FROM sessions WHERE token = $1")
            .bind(token.as_bytes())
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("session", token.redacted()))?;

        if !row.get::<bool, _>("live") {
            tracing::warn!(account = %row.get::<Uuid, _>("uuid"), "expired session presented");
            return Err(DbError::Expired { resource: "session" });
        }
        Ok(row.get("uuid"))
    }

    /// Make this token the only active session for its account.
    ///
    /// Reconciliation call: safe to repeat, and it repairs any state where
    /// another session of the same account was left active.
    pub async fn activate(&self, token: &SessionToken) -> Result<()> {
        let result = sqlx::query(
            r#"
            WITH owner AS (SELECT uuid FROM sessions WHERE token = $1)
            UPDATE sessions s
            SET active = (s.token = $1)
            FROM owner
            WHERE s.uuid = owner.uuid
            "#,
        )
        .bind(token.as_bytes())
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("session", token.redacted()));
        }
        Ok(())
    }

    /// Delete the session. Unknown tokens are not an error.
    pub async fn revoke(&self, token: &SessionToken) -> Result<()> {
        sqlx::query("DELETE FROM sessions WHERE token = $1")
            .bind(token.as_bytes())
            .execute(self.pool)
            .await?;
        Ok(())
    }

    /// Delete every session past its expiry. Returns how many were removed.
    pub async fn purge_expired(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE expire <= NOW()")
            .execute(self.pool)
            .await?;

        let purged = result.rows_affected();
        if purged > 0 {
            tracing::info!(purged, "expired sessions removed");
        }
        Ok(purged)
    }
}
