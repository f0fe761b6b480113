//! Runtime settings read from the environment (and `.env`, via `dotenvy`).

use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;

use crate::hash::DEFAULT_MAX_ATTEMPTS;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid value {value:?} for {key}: {reason}")]
pub struct ConfigError {
    pub key: &'static str,
    pub value: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub max_connections: u32,
    pub request_timeout: Duration,
    pub id_max_attempts: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "sqlite:data/mentor.db".to_string(),
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            max_connections: 5,
            request_timeout: Duration::from_secs(10),
            id_max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from `lookup`, falling back to defaults for unset keys.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Ok(Self {
            database_url: lookup("DATABASE_URL").unwrap_or(defaults.database_url),
            bind_addr: parse(&lookup, "BIND_ADDR", defaults.bind_addr)?,
            max_connections: parse(&lookup, "DB_MAX_CONNECTIONS", defaults.max_connections)?,
            request_timeout: parse(&lookup, "REQUEST_TIMEOUT_SECS", defaults.request_timeout.as_secs())
                .map(Duration::from_secs)?,
            id_max_attempts: parse(&lookup, "ID_MAX_ATTEMPTS", defaults.id_max_attempts)?,
        })
    }
}

fn parse<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|e: T::Err| ConfigError {
            key,
            reason: e.to_string(),
            value,
        }),
    }
}
