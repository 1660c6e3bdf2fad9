//! rogue-store: persistence core for the rogue game backend
//!
//! Accounts and credentials, bearer sessions, per-account statistics,
//! compensations, daily-seed leaderboards and opaque save data, all on one
//! PostgreSQL pool. Callers construct a [`Store`] at startup and hand it to
//! whatever serves requests; there is no global handle.

pub mod config;
pub mod db;
pub mod error;
pub mod models;

use sqlx::PgPool;

pub use config::{DbConfig, PoolConfig, Protocol};
pub use db::{AccountRepo, DailyRepo, SaveDataRepo, SessionRepo, StatsRepo, UnitOfWork};
pub use error::{DbError, ErrorKind, Result};
pub use models::{
    page_count, Account, AccountStats, Credentials, DailyRun, Page, Ranking, RankingCategory,
    SaveRecord, SessionSlot, SessionToken, StatCounter, StatCounters, TrainerIds, Username,
    ValidationError, VoucherDeltas, VoucherTier, PAGE_SIZE, SESSION_SLOTS, TOKEN_LEN,
};

/// Store client shared by every request worker
#[derive(Debug, Clone)]
pub struct Store {
    pool: PgPool,
}

impl Store {
    /// Connect using the connection parameters. Does not touch the schema.
    pub async fn connect(config: &DbConfig) -> Result<Self> {
        Ok(Self::from_pool(db::connect(config).await?))
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Create or upgrade the schema. Treat failure as fatal at startup.
    pub async fn prepare_tables(&self) -> Result<()> {
        db::prepare_tables(&self.pool).await
    }

    pub fn accounts(&self) -> AccountRepo<'_> {
        AccountRepo::new(&self.pool)
    }

    pub fn sessions(&self) -> SessionRepo<'_> {
        SessionRepo::new(&self.pool)
    }

    pub fn stats(&self) -> StatsRepo<'_> {
        StatsRepo::new(&self.pool)
    }

    pub fn daily(&self) -> DailyRepo<'_> {
        DailyRepo::new(&self.pool)
    }

    pub fn saves(&self) -> SaveDataRepo<'_> {
        SaveDataRepo::new(&self.pool)
    }

    /// Close every pooled connection.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
