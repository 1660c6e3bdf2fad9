//! Connection configuration
//!
//! The five connection parameters plus pool limits. Deserializable so the
//! binary can layer a TOML file under flags and environment.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use sqlx::postgres::PgConnectOptions;

use crate::error::{DbError, Result};

const DEFAULT_PORT: u16 = 5432;

/// Network protocol for reaching the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    #[default]
    Tcp,
    /// `address` is the directory holding the server socket
    Unix,
}

impl std::str::FromStr for Protocol {
    type Err = DbError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "tcp" => Ok(Self::Tcp),
            "unix" => Ok(Self::Unix),
            other => Err(DbError::invalid(format!(
                "unknown protocol '{}' (expected tcp or unix)",
                other
            ))),
        }
    }
}

/// Pool sizing and connection recycling
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    pub max_connections: u32,
    pub idle_timeout_secs: u64,
    pub max_lifetime_secs: u64,
    pub acquire_timeout_secs: u64,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: 256,
            idle_timeout_secs: 30,
            max_lifetime_secs: 60,
            acquire_timeout_secs: 30,
        }
    }
}

impl PoolConfig {
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    pub fn max_lifetime(&self) -> Duration {
        Duration::from_secs(self.max_lifetime_secs)
    }

    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }
}

/// Store connection configuration
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DbConfig {
    pub username: String,
    pub password: String,
    pub protocol: Protocol,
    pub address: String,
    pub database: String,
    pub pool: PoolConfig,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            username: "pokerogue".to_string(),
            password: String::new(),
            protocol: Protocol::Tcp,
            address: "localhost".to_string(),
            database: "pokeroguedb".to_string(),
            pool: PoolConfig::default(),
        }
    }
}

impl std::fmt::Debug for DbConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DbConfig")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("protocol", &self.protocol)
            .field("address", &self.address)
            .field("database", &self.database)
            .field("pool", &self.pool)
            .finish()
    }
}

impl DbConfig {
    /// Build driver connect options from the five connection parameters.
    pub fn connect_options(&self) -> Result<PgConnectOptions> {
        if self.database.is_empty() {
            return Err(DbError::invalid("database name cannot be empty"));
        }
        if self.pool.max_connections == 0 {
            return Err(DbError::invalid("pool.max_connections must be at least 1"));
        }

        let options = PgConnectOptions::new_without_pgpass()
            .username(&self.username)
            .database(&self.database)
            .application_name("rogue-store");
        let options = if self.password.is_empty() {
            options
        } else {
            options.password(&self.password)
        };

        match self.protocol {
            Protocol::Tcp => {
                let (host, port) = split_host_port(&self.address)?;
                Ok(options.host(host).port(port))
            }
            Protocol::Unix => {
                if self.address.is_empty() {
                    return Err(DbError::invalid("unix socket directory cannot be empty"));
                }
                Ok(options.socket(&self.address))
            }
        }
    }
}

/// Split `host`, `host:port` or `[v6]:port`.
fn split_host_port(address: &str) -> Result<(&str, u16)> {
    if address.is_empty() {
        return Err(DbError::invalid("address cannot be empty"));
    }
    let parse_port = |port: &str| {
        port.parse::<u16>()
            .map_err(|_| DbError::invalid(format!("invalid port '{}'", port)))
    };

    if let Some(rest) = address.strip_prefix('[') {
        let (host, tail) = rest
            .split_once(']')
            .ok_or_else(|| DbError::invalid(format!("unterminated IPv6 address '{}'", address)))?;
        return match tail.strip_prefix(':') {
            Some(port) => Ok((host, parse_port(port)?)),
            None if tail.is_empty() => Ok((host, DEFAULT_PORT)),
            None => Err(DbError::invalid(format!("invalid address '{}'", address))),
        };
    }

    match address.split_once(':') {
        // bare IPv6 without brackets
        Some(_) if address.matches(':').count() > 1 => Ok((address, DEFAULT_PORT)),
        Some((host, port)) => Ok((host, parse_port(port)?)),
        None => Ok((address, DEFAULT_PORT)),
    }
}
