//! Process configuration, read from the environment once at startup.

use std::net::SocketAddr;
use std::path::PathBuf;

pub const HTTP_ADDR_VAR: &str = "VOCAB_SRS_HTTP_ADDR";
pub const DATABASE_VAR: &str = "VOCAB_SRS_DATABASE";

const DEFAULT_HTTP_ADDR: &str = "0.0.0.0:3000";
const IN_MEMORY: &str = ":memory:";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseLocation {
    InMemory,
    File(PathBuf),
}

impl DatabaseLocation {
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.is_empty() || value == IN_MEMORY {
            DatabaseLocation::InMemory
        } else {
            DatabaseLocation::File(PathBuf::from(value))
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("VOCAB_SRS_HTTP_ADDR='{value}' is not a socket address: {source}")]
    InvalidAddr {
        value: String,
        source: std::net::AddrParseError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub http_addr: SocketAddr,
    pub database: DatabaseLocation,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let addr = lookup(HTTP_ADDR_VAR).unwrap_or_else(|| DEFAULT_HTTP_ADDR.to_string());
        let http_addr = addr
            .trim()
            .parse::<SocketAddr>()
            .map_err(|source| ConfigError::InvalidAddr {
                value: addr.clone(),
                source,
            })?;

        let database = lookup(DATABASE_VAR)
            .map(|value| DatabaseLocation::parse(&value))
            .unwrap_or(DatabaseLocation::InMemory);

        Ok(Self {
            http_addr,
            database,
        })
    }
}
