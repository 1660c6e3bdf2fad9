//! Init command - create or upgrade the schema

use anyhow::Result;
use rogue_store::DbConfig;

use super::open_store;

pub async fn run_init(config: &DbConfig) -> Result<()> {
    let store = open_store(config).await?;
    println!("Schema ready in {}", config.database);
    store.close().await;
    Ok(())
}
