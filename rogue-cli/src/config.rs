//! Layered connection configuration
//!
//! Precedence, lowest first: built-in defaults, TOML file
//! (`~/.rogue/config.toml` or `--config`), `.env` and process environment,
//! command-line flags.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use rogue_store::{DbConfig, Protocol};

/// Connection flags shared by every subcommand
#[derive(Args, Debug, Clone, Default)]
pub struct DbArgs {
    /// Database user
    #[arg(long, env = "ROGUE_DB_USER", global = true)]
    pub dbuser: Option<String>,

    /// Database password
    #[arg(long, env = "ROGUE_DB_PASS", global = true, hide_env_values = true)]
    pub dbpass: Option<String>,

    /// Network protocol (tcp or unix)
    #[arg(long, env = "ROGUE_DB_PROTO", global = true)]
    pub dbproto: Option<String>,

    /// Database address (host[:port], or socket directory for unix)
    #[arg(long, env = "ROGUE_DB_ADDR", global = true)]
    pub dbaddr: Option<String>,

    /// Database name
    #[arg(long, env = "ROGUE_DB_NAME", global = true)]
    pub dbname: Option<String>,

    /// Maximum pooled connections
    #[arg(long, env = "ROGUE_DB_MAX_CONNECTIONS", global = true)]
    pub max_connections: Option<u32>,
}

/// Default config file location: ~/.rogue/config.toml
pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".rogue").join("config.toml"))
}

/// Resolve the effective configuration.
///
/// An explicitly requested file must exist; the default file is optional.
pub fn load(explicit: Option<&Path>, args: &DbArgs) -> Result<DbConfig> {
    let mut config = match explicit {
        Some(path) => read_file(path)?,
        None => match default_config_path() {
            Some(path) if path.exists() => read_file(&path)?,
            _ => DbConfig::default(),
        },
    };

    apply_overrides(&mut config, args)?;
    Ok(config)
}

fn read_file(path: &Path) -> Result<DbConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
    tracing::debug!(path = %path.display(), "loaded config file");
    Ok(config)
}

fn apply_overrides(config: &mut DbConfig, args: &DbArgs) -> Result<()> {
    if let Some(user) = &args.dbuser {
        config.username = user.clone();
    }
    if let Some(pass) = &args.dbpass {
        config.password = pass.clone();
    }
    if let Some(proto) = &args.dbproto {
        config.protocol = proto.parse::<Protocol>().context("Invalid --dbproto")?;
    }
    if let Some(addr) = &args.dbaddr {
        config.address = addr.clone();
    }
    if let Some(name) = &args.dbname {
        config.database = name.clone();
    }
    if let Some(max) = args.max_connections {
        config.pool.max_connections = max;
    }
    Ok(())
}

/// TOML rendering with the password masked
pub fn render(config: &DbConfig) -> Result<String> {
    let mut shown = config.clone();
    if !shown.password.is_empty() {
        shown.password = "********".to_string();
    }
    toml::to_string_pretty(&shown).context("Failed to render config")
}
