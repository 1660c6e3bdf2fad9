//! rogue CLI - operator entry point for the game backend store
//!
//! Composition root for the store: resolves connection parameters, sets up
//! tracing, connects, prepares the schema, then runs one operator command:
//! - `init`: create or upgrade tables
//! - `status`: online players and server-wide totals
//! - `rankings`: print a daily or weekly leaderboard page
//! - `sessions purge`: delete expired sessions
//! - `config`: show the effective configuration

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod config;
mod tracing_setup;

use tracing_setup::{init_tracing, TracingConfig};

#[derive(Parser, Debug)]
#[command(
    name = "rogue",
    author,
    version,
    about = "Operator tools for the rogue game backend store",
    long_about = "Manage the PostgreSQL store behind the rogue game server: prepare the schema, \
                  inspect leaderboards and server-wide counters, and clean up expired sessions."
)]
struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Config file (default: ~/.rogue/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(flatten)]
    db: config::DbArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create or upgrade the store schema
    Init,
    /// Show online players and server-wide totals
    Status(commands::status::StatusArgs),
    /// Print a leaderboard page
    Rankings(commands::rankings::RankingsArgs),
    /// Session maintenance
    Sessions(commands::sessions::SessionsArgs),
    /// Inspect connection configuration
    Config(commands::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env must be loaded before clap reads ROGUE_* variables
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    init_tracing(&TracingConfig { debug: cli.debug }).ok();

    let db_config = config::load(cli.config.as_deref(), &cli.db)?;
    tracing::debug!(config = ?db_config, "resolved configuration");

    match cli.command {
        Commands::Init => commands::run_init(&db_config).await?,
        Commands::Status(args) => commands::run_status(args, &db_config).await?,
        Commands::Rankings(args) => commands::run_rankings(args, &db_config).await?,
        Commands::Sessions(args) => commands::run_sessions(args, &db_config).await?,
        Commands::Config(args) => commands::run_config(args, &db_config)?,
    }

    Ok(())
}
