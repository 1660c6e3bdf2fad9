//! Statistics repository
//!
//! - merge: one upsert; submitted counters replace, voucher deltas add
//! - compensations: claimed with a single UPDATE ... RETURNING
//! - server-wide aggregates computed on read, never cached

use std::collections::BTreeMap;

use serde_json::Value;
use sqlx::postgres::Postgres;
use sqlx::{PgPool, QueryBuilder, Row};
use uuid::Uuid;

use crate::error::{is_foreign_key_violation, is_numeric_overflow, DbError, Result};
use crate::models::{AccountStats, StatCounters, VoucherDeltas, VoucherTier};

/// Sliding window for counting a player as online
pub const ACTIVE_WINDOW_MINUTES: i32 = 5;

/// Statistics repository
pub struct StatsRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> StatsRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Merge submitted totals and voucher grants into the account's row.
    ///
    /// On first write the row is created from the submitted values. After
    /// that each submitted counter overwrites the stored one (the client owns
    /// its running totals) while voucher deltas are added to the stored
    /// counts. `NotFound` if the account does not exist.
    pub async fn merge(&self, id: Uuid, counters: &StatCounters, vouchers: &VoucherDeltas) -> Result<()> {
        let mut query = merge_statement(id, counters, vouchers);
        let result = query.build().execute(self.pool).await;

        match result {
            Ok(_) => {
                tracing::debug!(
                    %id,
                    counters = counters.iter().count(),
                    vouchers = vouchers.iter().count(),
                    "stats merged"
                );
                Ok(())
            }
            Err(err) if is_foreign_key_violation(&err) => Err(DbError::not_found("account", id)),
            Err(err) if is_numeric_overflow(&err) => {
                Err(DbError::invalid("voucher total would exceed the stored range"))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Validate a loose client payload, then merge it.
    ///
    /// Nothing is written unless every counter name and value is valid.
    pub async fn merge_payload<K, I>(&self, id: Uuid, stats: &Value, vouchers: I) -> Result<()>
    where
        K: AsRef<str>,
        I: IntoIterator<Item = (K, i64)>,
    {
        let counters = StatCounters::from_json(stats)?;
        let vouchers = VoucherDeltas::from_legacy(vouchers)?;
        self.merge(id, &counters, &vouchers).await
    }

    /// Stored totals; all zeros if nothing was merged yet.
    pub async fn get(&self, id: Uuid) -> Result<AccountStats> {
        let stats = sqlx::query_as::<_, AccountStats>("SELECT * FROM account_stats WHERE uuid = $1")
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        Ok(stats.unwrap_or_else(|| AccountStats::empty(id)))
    }

    /// Mark every unclaimed grant as claimed and return what was marked.
    ///
    /// One statement, so a grant inserted concurrently is either returned
    /// here or left unclaimed for the next call.
    pub async fn claim_compensations(&self, id: Uuid) -> Result<BTreeMap<VoucherTier, i32>> {
        let rows = sqlx::query(
            r#"
            UPDATE account_compensations
            SET claimed = TRUE
            WHERE uuid = $1 AND NOT claimed
            RETURNING voucher_type, count
            "#,
        )
        .bind(id)
        .fetch_all(self.pool)
        .await?;

        let mut claimed = BTreeMap::new();
        for row in rows {
            let tier = VoucherTier::from_code(row.get("voucher_type"))
                .map_err(|_| DbError::corrupt("unknown voucher type in compensations"))?;
            *claimed.entry(tier).or_insert(0) += row.get::<i32, _>("count");
        }

        if !claimed.is_empty() {
            tracing::debug!(%id, tiers = claimed.len(), "compensations claimed");
        }
        Ok(claimed)
    }

    /// Remove claimed grants. Pending grants are left alone.
    pub async fn delete_claimed_compensations(&self, id: Uuid) -> Result<u64> {
        let result = sqlx::query("DELETE FROM account_compensations WHERE uuid = $1 AND claimed")
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Battles fought across all accounts.
    pub async fn total_battles(&self) -> Result<i64> {
        let total = sqlx::query_scalar("SELECT COALESCE(SUM(battles), 0)::BIGINT FROM account_stats")
            .fetch_one(self.pool)
            .await?;
        Ok(total)
    }

    /// Classic sessions played across all accounts.
    pub async fn total_classic_sessions(&self) -> Result<i64> {
        let total = sqlx::query_scalar(
            "SELECT COALESCE(SUM(classic_sessions_played), 0)::BIGINT FROM account_stats",
        )
        .fetch_one(self.pool)
        .await?;
        Ok(total)
    }

    /// Accounts with activity in the last five minutes.
    pub async fn active_player_count(&self) -> Result<i64> {
        let count = sqlx::query_scalar(
            "SELECT COUNT(*) FROM accounts WHERE last_activity > NOW() - make_interval(mins => $1)",
        )
        .bind(ACTIVE_WINDOW_MINUTES)
        .fetch_one(self.pool)
        .await?;
        Ok(count)
    }
}

/// Build the merge upsert. Column names come from the closed counter and
/// tier enums; every value is a bind parameter.
fn merge_statement<'q>(id: Uuid, counters: &StatCounters, vouchers: &VoucherDeltas) -> QueryBuilder<'q, Postgres> {
    let mut query = QueryBuilder::new("INSERT INTO account_stats (uuid");
    for (counter, _) in counters.iter() {
        query.push(", ").push(counter.column());
    }
    for (tier, _) in vouchers.iter() {
        query.push(", ").push(tier.column());
    }

    query.push(") VALUES (").push_bind(id);
    for (_, value) in counters.iter() {
        query.push(", ").push_bind(value);
    }
    for (_, count) in vouchers.iter() {
        query.push(", ").push_bind(count);
    }
    query.push(") ON CONFLICT (uuid) DO ");

    if counters.is_empty() && vouchers.is_empty() {
        query.push("NOTHING");
        return query;
    }

    query.push("UPDATE SET ");
    let mut assignments = query.separated(", ");
    for (counter, _) in counters.iter() {
        let column = counter.column();
        assignments.push(format!("{column} = EXCLUDED.{column}"));
    }
    for (tier, _) in vouchers.iter() {
        let column = tier.column();
        assignments.push(format!("{column} = account_stats.{column} + EXCLUDED.{column}"));
    }
    query
}
