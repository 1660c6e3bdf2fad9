//! Rankings command - print one leaderboard page

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use rogue_store::{DbConfig, Page, RankingCategory};

use super::open_store;

#[derive(ValueEnum, Debug, Clone, Copy, Default)]
pub enum Board {
    /// Today's runs
    #[default]
    Daily,
    /// Sum of this week's runs
    Weekly,
}

impl From<Board> for RankingCategory {
    fn from(board: Board) -> Self {
        match board {
            Board::Daily => RankingCategory::Daily,
            Board::Weekly => RankingCategory::Weekly,
        }
    }
}

#[derive(Parser, Debug)]
pub struct RankingsArgs {
    /// Leaderboard to show
    #[arg(long, value_enum, default_value_t = Board::Daily)]
    pub board: Board,

    /// Page number (starts at 1)
    #[arg(long, default_value_t = 1)]
    pub page: i64,

    /// Print as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run_rankings(args: RankingsArgs, config: &DbConfig) -> Result<()> {
    let page = Page::new(args.page).context("Invalid --page")?;
    let store = open_store(config).await?;

    let category = RankingCategory::from(args.board);
    let rankings = store.daily().rankings(category, page).await?;
    let pages = store.daily().page_count(category).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&rankings)?);
    } else if rankings.is_empty() {
        println!("No rankings on page {} ({} pages)", page.number(), pages);
    } else {
        println!("{:>5}  {:<32}  {:>10}  {:>5}", "RANK", "USERNAME", "SCORE", "WAVE");
        for ranking in &rankings {
            println!(
                "{:>5}  {:<32}  {:>10}  {:>5}",
                ranking.rank, ranking.username, ranking.score, ranking.wave
            );
        }
        println!("\nPage {} of {}", page.number(), pages);
    }

    store.close().await;
    Ok(())
}
