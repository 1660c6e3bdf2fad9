//! Schema initialization
//!
//! Creates or upgrades every table in one unit of work. Only additive DDL
//! (`IF NOT EXISTS`) is issued; nothing is dropped or rewritten.

use sqlx::PgPool;

use super::pool::{self, UnitOfWork};
use crate::error::Result;

/// Advisory lock key serializing schema setup across processes
const SCHEMA_LOCK_KEY: i64 = 0x726f_6775_6500;

/// Tables in dependency order
const TABLES: &[(&str, &str)] = &[
    (
        "accounts",
        r#"
        CREATE TABLE IF NOT EXISTS accounts (
            uuid UUID PRIMARY KEY,
            username VARCHAR(32) NOT NULL UNIQUE,
            hash BYTEA NOT NULL CHECK (octet_length(hash) = 32),
            salt BYTEA NOT NULL CHECK (octet_length(salt) = 16),
            trainer_id INT,
            secret_id INT,
            registered TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            last_logged_in TIMESTAMPTZ,
            last_activity TIMESTAMPTZ,
            banned BOOLEAN NOT NULL DEFAULT FALSE
        )
        "#,
    ),
    (
        "sessions",
        r#"
        CREATE TABLE IF NOT EXISTS sessions (
            token BYTEA PRIMARY KEY CHECK (octet_length(token) = 32),
            uuid UUID NOT NULL REFERENCES accounts(uuid) ON DELETE CASCADE,
            active BOOLEAN NOT NULL DEFAULT FALSE,
            expire TIMESTAMPTZ NOT NULL
        )
        "#,
    ),
    (
        "account_stats",
        r#"
        CREATE TABLE IF NOT EXISTS account_stats (
            uuid UUID PRIMARY KEY REFERENCES accounts(uuid) ON DELETE CASCADE,
            play_time INT NOT NULL DEFAULT 0,
            battles INT NOT NULL DEFAULT 0,
            classic_sessions_played INT NOT NULL DEFAULT 0,
            sessions_won INT NOT NULL DEFAULT 0,
            highest_endless_wave INT NOT NULL DEFAULT 0,
            highest_level INT NOT NULL DEFAULT 0,
            pokemon_seen INT NOT NULL DEFAULT 0,
            pokemon_defeated INT NOT NULL DEFAULT 0,
            pokemon_caught INT NOT NULL DEFAULT 0,
            pokemon_hatched INT NOT NULL DEFAULT 0,
            eggs_pulled INT NOT NULL DEFAULT 0,
            regular_vouchers INT NOT NULL DEFAULT 0,
            plus_vouchers INT NOT NULL DEFAULT 0,
            premium_vouchers INT NOT NULL DEFAULT 0,
            golden_vouchers INT NOT NULL DEFAULT 0
        )
        "#,
    ),
    (
        "account_compensations",
        r#"
        CREATE TABLE IF NOT EXISTS account_compensations (
            uuid UUID NOT NULL REFERENCES accounts(uuid) ON DELETE CASCADE,
            voucher_type INT NOT NULL CHECK (voucher_type BETWEEN 0 AND 3),
            count INT NOT NULL DEFAULT 0,
            claimed BOOLEAN NOT NULL DEFAULT FALSE,
            PRIMARY KEY (uuid, voucher_type)
        )
        "#,
    ),
    (
        "daily_runs",
        r#"
        CREATE TABLE IF NOT EXISTS daily_runs (
            seed VARCHAR(255) PRIMARY KEY,
            date DATE NOT NULL
        )
        "#,
    ),
    (
        "account_daily_runs",
        r#"
        CREATE TABLE IF NOT EXISTS account_daily_runs (
            uuid UUID NOT NULL REFERENCES accounts(uuid) ON DELETE CASCADE,
            date DATE NOT NULL,
            score INT NOT NULL,
            wave INT NOT NULL,
            timestamp TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            PRIMARY KEY (uuid, date)
        )
        "#,
    ),
    (
        "system_save_data",
        r#"
        CREATE TABLE IF NOT EXISTS system_save_data (
            uuid UUID PRIMARY KEY REFERENCES accounts(uuid) ON DELETE CASCADE,
            data BYTEA NOT NULL,
            timestamp TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    ),
    (
        "session_save_data",
        r#"
        CREATE TABLE IF NOT EXISTS session_save_data (
            uuid UUID NOT NULL REFERENCES accounts(uuid) ON DELETE CASCADE,
            slot SMALLINT NOT NULL CHECK (slot BETWEEN 0 AND 4),
            data BYTEA NOT NULL,
            timestamp TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            PRIMARY KEY (uuid, slot)
        )
        "#,
    ),
];

/// Column additions for stores created by older schema versions
const UPGRADES: &[&str] = &[
    "ALTER TABLE accounts ADD COLUMN IF NOT EXISTS banned BOOLEAN NOT NULL DEFAULT FALSE",
];

const INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_sessions_uuid ON sessions(uuid)",
    "CREATE INDEX IF NOT EXISTS idx_accounts_last_activity ON accounts(last_activity)",
    "CREATE INDEX IF NOT EXISTS idx_account_daily_runs_date ON account_daily_runs(date)",
    "CREATE INDEX IF NOT EXISTS idx_daily_runs_date ON daily_runs(date)",
];

/// Create or upgrade all tables.
///
/// Runs as a single unit of work: a failure anywhere leaves the schema as it
/// was. Callers treat an error here as fatal.
pub async fn prepare_tables(pool: &PgPool) -> Result<()> {
    tracing::info!("preparing tables");

    let mut tx = pool::begin(pool).await?;

    sqlx::query("SELECT pg_advisory_xact_lock($1)")
        .bind(SCHEMA_LOCK_KEY)
        .execute(&mut *tx)
        .await?;

    for (name, ddl) in TABLES {
        tracing::debug!(table = name, "ensuring table");
        sqlx::query(ddl).execute(&mut *tx).await?;
    }

    for upgrade in UPGRADES {
        sqlx::query(upgrade).execute(&mut *tx).await?;
    }

    create_indexes(&mut tx).await?;

    tx.commit().await?;
    tracing::info!(tables = TABLES.len(), "tables ready");
    Ok(())
}

async fn create_indexes(tx: &mut UnitOfWork) -> Result<()> {
    for index in INDEXES {
        sqlx::query(index).execute(&mut **tx).await?;
    }
    Ok(())
}

/// Physical table names, in creation order.
pub fn table_names() -> impl Iterator<Item = &'static str> {
    TABLES.iter().map(|(name, _)| *name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_tables_listed_in_dependency_order() {
        let names: Vec<_> = table_names().collect();
        assert_eq!(
            names,
            [
                "accounts",
                "sessions",
                "account_stats",
                "account_compensations",
                "daily_runs",
                "account_daily_runs",
                "system_save_data",
                "session_save_data",
            ]
        );
    }

    #[test]
    fn ddl_is_idempotent() {
        for (name, ddl) in TABLES {
            assert!(ddl.contains("IF NOT EXISTS"), "{} is not idempotent", name);
            assert!(ddl.contains(name), "{} DDL names another table", name);
        }
        for stmt in UPGRADES.iter().chain(INDEXES) {
            assert!(stmt.contains("IF NOT EXISTS"), "{} is not idempotent", stmt);
        }
    }

    #[test]
    fn binary_columns_are_width_checked() {
        let accounts = TABLES[0].1;
        assert!(accounts.contains("octet_length(hash) = 32"));
        assert!(accounts.contains("octet_length(salt) = 16"));
        assert!(TABLES[1].1.contains("octet_length(token) = 32"));
    }
}
