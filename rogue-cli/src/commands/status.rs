//! Status command - server-wide counters

use anyhow::Result;
use clap::Parser;
use rogue_store::{DbConfig, RankingCategory};
use serde::Serialize;

use super::open_store;

#[derive(Parser, Debug)]
pub struct StatusArgs {
    /// Print as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct StatusReport {
    players_online: i64,
    total_battles: i64,
    total_classic_sessions: i64,
    daily_pages: i64,
    weekly_pages: i64,
}

pub async fn run_status(args: StatusArgs, config: &DbConfig) -> Result<()> {
    let store = open_store(config).await?;

    let stats = store.stats();
    let daily = store.daily();
    let report = StatusReport {
        players_online: stats.active_player_count().await?,
        total_battles: stats.total_battles().await?,
        total_classic_sessions: stats.total_classic_sessions().await?,
        daily_pages: daily.page_count(RankingCategory::Daily).await?,
        weekly_pages: daily.page_count(RankingCategory::Weekly).await?,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Players online:          {}", report.players_online);
        println!("Total battles:           {}", report.total_battles);
        println!("Total classic sessions:  {}", report.total_classic_sessions);
        println!("Daily ranking pages:     {}", report.daily_pages);
        println!("Weekly ranking pages:    {}", report.weekly_pages);
    }

    store.close().await;
    Ok(())
}
