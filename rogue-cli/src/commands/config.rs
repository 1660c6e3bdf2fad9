//! Config command - inspect the effective connection configuration

use anyhow::Result;
use clap::{Parser, Subcommand};
use rogue_store::DbConfig;

use crate::config::{default_config_path, render};

#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the effective configuration as TOML (password masked)
    Show,
    /// Show the default config file path
    Path,
}

pub fn run_config(args: ConfigArgs, config: &DbConfig) -> Result<()> {
    match args.command {
        ConfigCommands::Show => print!("{}", render(config)?),
        ConfigCommands::Path => match default_config_path() {
            Some(path) => println!("{}", path.display()),
            None => println!("(no home directory)"),
        },
    }
    Ok(())
}
