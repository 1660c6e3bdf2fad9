//! Database connection pool management
//!
//! Uses sqlx PgPool with explicit connection limits and recycling.

use sqlx::postgres::{PgPoolOptions, Postgres};
use sqlx::{PgPool, Transaction};

use crate::config::DbConfig;
use crate::error::Result;

/// Transactional unit of work.
///
/// Commits only through `commit()`. Dropping it on any other path rolls back
/// and hands the connection back to the pool.
pub type UnitOfWork = Transaction<'static, Postgres>;

/// Create a PostgreSQL connection pool from the connection parameters.
///
/// # Errors
///
/// `InvalidArgument` for unusable parameters, `StoreUnavailable` if the
/// first connection cannot be established.
pub async fn connect(config: &DbConfig) -> Result<PgPool> {
    let options = config.connect_options()?;
    tracing::info!(
        address = %config.address,
        database = %config.database,
        max_connections = config.pool.max_connections,
        "connecting to database"
    );

    let pool = PgPoolOptions::new()
        .max_connections(config.pool.max_connections)
        .idle_timeout(config.pool.idle_timeout())
        .max_lifetime(config.pool.max_lifetime())
        .acquire_timeout(config.pool.acquire_timeout())
        .connect_with(options)
        .await?;

    Ok(pool)
}

/// Open a unit of work on a pooled connection.
pub async fn begin(pool: &PgPool) -> Result<UnitOfWork> {
    Ok(pool.begin().await?)
}
