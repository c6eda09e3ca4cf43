//! Store configuration module.
//!
//! Configuration is loaded from environment variables with fallback to defaults.
//!
//! | Variable                             | Default          |
//! |--------------------------------------|------------------|
//! | `DIGIGOODS_DB_PATH`                  | `./digigoods.db` |
//! | `DIGIGOODS_DB_MAX_CONNECTIONS`       | `5`              |
//! | `DIGIGOODS_DB_CONNECT_TIMEOUT_SECS`  | `30`             |

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::pool::DbConfig;

/// Discount store configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// SQLite database file
    pub database_path: PathBuf,

    /// Pool size
    pub max_connections: u32,

    /// Connection acquire timeout in seconds
    pub connect_timeout_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            database_path: PathBuf::from("./digigoods.db"),
            max_connections: 5,
            connect_timeout_secs: 30,
        }
    }
}

impl StoreConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup (env, test fixtures).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = StoreConfig::default();

        let config = StoreConfig {
            database_path: lookup("DIGIGOODS_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.database_path),

            max_connections: parse_or(
                &lookup,
                "DIGIGOODS_DB_MAX_CONNECTIONS",
                defaults.max_connections,
            )?,

            connect_timeout_secs: parse_or(
                &lookup,
                "DIGIGOODS_DB_CONNECT_TIMEOUT_SECS",
                defaults.connect_timeout_secs,
            )?,
        };

        if config.max_connections == 0 {
            return Err(ConfigError::InvalidValue(
                "DIGIGOODS_DB_MAX_CONNECTIONS".to_string(),
            ));
        }

        Ok(config)
    }

    /// Turns this into a pool configuration.
    pub fn into_db_config(self) -> DbConfig {
        DbConfig::new(self.database_path)
            .max_connections(self.max_connections)
            .connect_timeout(Duration::from_secs(self.connect_timeout_secs))
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key.to_string())),
        None => Ok(default),
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}
