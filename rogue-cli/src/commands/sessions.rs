//! Sessions command - session maintenance

use anyhow::Result;
use clap::{Parser, Subcommand};
use rogue_store::DbConfig;

use super::open_store;

#[derive(Parser, Debug)]
pub struct SessionsArgs {
    #[command(subcommand)]
    pub command: SessionsCommand,
}

#[derive(Subcommand, Debug)]
pub enum SessionsCommand {
    /// Delete every session past its expiry
    Purge,
}

pub async fn run_sessions(args: SessionsArgs, config: &DbConfig) -> Result<()> {
    let store = open_store(config).await?;

    match args.command {
        SessionsCommand::Purge => {
            let removed = store.sessions().purge_expired().await?;
            println!("Removed {removed} expired sessions");
        }
    }

    store.close().await;
    Ok(())
}
