//! Command implementations for the rogue CLI

pub mod config;
pub mod init;
pub mod rankings;
pub mod sessions;
pub mod status;

use anyhow::{Context, Result};
use rogue_store::{DbConfig, Store};

pub use config::run_config;
pub use init::run_init;
pub use rankings::run_rankings;
pub use sessions::run_sessions;
pub use status::run_status;

/// Connect and make sure the schema exists. Any failure here is fatal.
pub async fn open_store(config: &DbConfig) -> Result<Store> {
    let store = Store::connect(config)
        .await
        .with_context(|| format!("Failed to connect to {} at {}", config.database, config.address))?;
    store
        .prepare_tables()
        .await
        .context("Failed to prepare tables")?;
    Ok(store)
}
