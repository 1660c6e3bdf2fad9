//! Daily ranking repository
//!
//! Dates are UTC calendar days taken from the store clock. Weeks start on
//! Sunday. A run only counts towards a board when a seed was registered for
//! its date and the account is not banned.

use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{is_foreign_key_violation, DbError, Result};
use crate::models::{page_count, DailyRun, Page, Ranking, RankingCategory};

const DAILY_RANKINGS: &str = r#"
    SELECT RANK() OVER (ORDER BY r.score DESC, r.timestamp ASC) AS rank,
           a.username,
           r.score::BIGINT AS score,
           r.wave
    FROM account_daily_runs r
    JOIN accounts a ON a.uuid = r.uuid
    WHERE r.date = timezone('UTC', now())::date
      AND NOT a.banned
      AND EXISTS (SELECT 1 FROM daily_runs d WHERE d.date = r.date)
    ORDER BY rank, a.username
    LIMIT $1 OFFSET $2
"#;

const WEEKLY_RANKINGS: &str = r#"
    WITH today AS (SELECT timezone('UTC', now())::date AS day),
    totals AS (
        SELECT a.username,
               SUM(r.score)::BIGINT AS score,
               MIN(r.timestamp) AS first_reached
        FROM account_daily_runs r
        JOIN accounts a ON a.uuid = r.uuid
        CROSS JOIN today t
        WHERE r.date BETWEEN t.day - EXTRACT(DOW FROM t.day)::int AND t.day
          AND NOT a.banned
          AND EXISTS (SELECT 1 FROM daily_runs d WHERE d.date = r.date)
        GROUP BY a.uuid, a.username
    )
    SELECT RANK() OVER (ORDER BY score DESC, first_reached ASC) AS rank,
           username,
           score,
           0 AS wave
    FROM totals
    ORDER BY rank, username
    LIMIT $1 OFFSET $2
"#;

const DAILY_COUNT: &str = r#"
    SELECT COUNT(*)
    FROM account_daily_runs r
    JOIN accounts a ON a.uuid = r.uuid
    WHERE r.date = timezone('UTC', now())::date
      AND NOT a.banned
      AND EXISTS (SELECT 1 FROM daily_runs d WHERE d.date = r.date)
"#;

const WEEKLY_COUNT: &str = r#"
    WITH today AS (SELECT timezone('UTC', now())::date AS day)
    SELECT COUNT(DISTINCT r.uuid)
    FROM account_daily_runs r
    JOIN accounts a ON a.uuid = r.uuid
    CROSS JOIN today t
    WHERE r.date BETWEEN t.day - EXTRACT(DOW FROM t.day)::int AND t.day
      AND NOT a.banned
      AND EXISTS (SELECT 1 FROM daily_runs d WHERE d.date = r.date)
"#;

/// Daily run and leaderboard repository
pub struct DailyRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> DailyRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Register today's seed. The first writer wins; returns whether this
    /// call was the one that registered it.
    pub async fn register_seed(&self, seed: &str) -> Result<bool> {
        if seed.is_empty() || seed.chars().count() > 255 {
            return Err(DbError::invalid("seed must be 1-255 characters"));
        }

        let result = sqlx::query(
            r#"
            INSERT INTO daily_runs (seed, date)
            VALUES ($1, timezone('UTC', now())::date)
            ON CONFLICT (seed) DO NOTHING
            "#,
        )
        .bind(seed)
        .execute(self.pool)
        .await?;

        let registered = result.rows_affected() == 1;
        tracing::debug!(seed, registered, "daily seed");
        Ok(registered)
    }

    /// Record a run for today.
    ///
    /// Score and wave only ever grow. The timestamp moves forward only when
    /// the score strictly improves, so it marks when the current best was
    /// first reached.
    pub async fn record_run(&self, id: Uuid, score: i32, wave: i32) -> Result<()> {
        if score < 0 || wave < 0 {
            return Err(DbError::invalid("score and wave must not be negative"));
        }

        let result = sqlx::query(
            r#"
            INSERT INTO account_daily_runs (uuid, date, score, wave, timestamp)
            VALUES ($1, timezone('UTC', now())::date, $2, $3, NOW())
            ON CONFLICT (uuid, date) DO UPDATE SET
                score = GREATEST(account_daily_runs.score, EXCLUDED.score),
                wave = GREATEST(account_daily_runs.wave, EXCLUDED.wave),
                timestamp = CASE
                    WHEN EXCLUDED.score > account_daily_runs.score THEN EXCLUDED.timestamp
                    ELSE account_daily_runs.timestamp
                END
            "#,
        )
        .bind(id)
        .bind(score)
        .bind(wave)
        .execute(self.pool)
        .await;

        match result {
            Ok(_) => {
                tracing::debug!(%id, score, wave, "daily run recorded");
                Ok(())
            }
            Err(err) if is_foreign_key_violation(&err) => Err(DbError::not_found("account", id)),
            Err(err) => Err(err.into()),
        }
    }

    /// An account's stored best for one day.
    pub async fn daily_run(&self, id: Uuid, date: NaiveDate) -> Result<Option<DailyRun>> {
        let run = sqlx::query_as::<_, DailyRun>(
            "SELECT uuid, date, score, wave, timestamp FROM account_daily_runs WHERE uuid = $1 AND date = $2",
        )
        .bind(id)
        .bind(date)
        .fetch_optional(self.pool)
        .await?;
        Ok(run)
    }

    /// One page of a leaderboard.
    pub async fn rankings(&self, category: RankingCategory, page: Page) -> Result<Vec<Ranking>> {
        let sql = match category {
            RankingCategory::Daily => DAILY_RANKINGS,
            RankingCategory::Weekly => WEEKLY_RANKINGS,
        };

        let rankings = sqlx::query_as::<_, Ranking>(sql)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(self.pool)
            .await?;
        Ok(rankings)
    }

    /// Pages needed to show every eligible row of a leaderboard.
    pub async fn page_count(&self, category: RankingCategory) -> Result<i64> {
        let sql = match category {
            RankingCategory::Daily => DAILY_COUNT,
            RankingCategory::Weekly => WEEKLY_COUNT,
        };

        let rows: i64 = sqlx::query_scalar(sql).fetch_one(self.pool).await?;
        Ok(page_count(rows))
    }
}
