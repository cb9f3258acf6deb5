//! Process configuration, read from environment variables.
//!
//! | Variable | Default | Meaning |
//! |---|---|---|
//! | `BIND_ADDR` | `0.0.0.0:8080` | HTTP listen address |
//! | `DATABASE_URL` | unset | Postgres item store; in-memory when unset |
//! | `STOCK_CAS_MAX_ATTEMPTS` | `5` | Compare-and-set rounds per line |
//! | `LOG_FORMAT` | `json` | `json` or `pretty` |
//! | `SEED_DEMO_ITEMS` | `false` | Seed a few items into the in-memory store |

use core::fmt::Display;
use core::str::FromStr;
use std::net::SocketAddr;

use thiserror::Error;

use stockrecon_infra::ReconcilerConfig;
use stockrecon_observability::LogFormat;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: '{value}' ({reason})")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub database_url: Option<String>,
    pub reconciler: ReconcilerConfig,
    pub log_format: LogFormat,
    pub seed_demo_items: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            database_url: None,
            reconciler: ReconcilerConfig::default(),
            log_format: LogFormat::default(),
            seed_demo_items: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup (tests pass a map).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let max_cas_attempts: u32 = parse_or(
            &lookup,
            "STOCK_CAS_MAX_ATTEMPTS",
            defaults.reconciler.max_cas_attempts,
        )?;
        if max_cas_attempts == 0 {
            return Err(ConfigError::Invalid {
                key: "STOCK_CAS_MAX_ATTEMPTS",
                value: "0".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        Ok(Self {
            bind_addr: parse_or(&lookup, "BIND_ADDR", defaults.bind_addr)?,
            database_url: lookup("DATABASE_URL").filter(|url| !url.trim().is_empty()),
            reconciler: ReconcilerConfig { max_cas_attempts },
            log_format: parse_or(&lookup, "LOG_FORMAT", defaults.log_format)?,
            seed_demo_items: parse_or(&lookup, "SEED_DEMO_ITEMS", defaults.seed_demo_items)?,
        })
    }
}

fn parse_or<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            value: raw.clone(),
            reason: e.to_string(),
        }),
    }
}
