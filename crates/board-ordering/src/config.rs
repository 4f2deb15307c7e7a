//! Configuration for the ordering engine

use serde::{Deserialize, Serialize};
use std::env;

/// Ordering configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OrderingConfig {
    /// Maximum updates accepted in one bulk batch
    pub max_batch_size: usize,
    /// Maximum title length in characters
    pub max_title_len: usize,
    /// How long a SQLite writer waits for the database lock
    pub busy_timeout_ms: u64,
}

impl Default for OrderingConfig {
    fn default() -> Self {
        Self {
            max_batch_size: 500,
            max_title_len: 255,
            busy_timeout_ms: 5_000,
        }
    }
}

impl OrderingConfig {
    /// Create configuration from environment variables, falling back to the
    /// defaults for anything unset or unparsable.
    ///
    /// - `BOARD_MAX_BATCH_SIZE`
    /// - `BOARD_MAX_TITLE_LEN`
    /// - `BOARD_BUSY_TIMEOUT_MS`
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_batch_size: env_parse("BOARD_MAX_BATCH_SIZE").unwrap_or(defaults.max_batch_size),
            max_title_len: env_parse("BOARD_MAX_TITLE_LEN").unwrap_or(defaults.max_title_len),
            busy_timeout_ms: env_parse("BOARD_BUSY_TIMEOUT_MS")
                .unwrap_or(defaults.busy_timeout_ms),
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.parse().ok())
}
