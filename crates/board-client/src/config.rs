//! Client configuration

use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Reconciliation settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Upper bound on one commit round trip; expiry counts as a network failure
    pub commit_timeout: Duration,
    /// Buffered notices per subscriber before the slowest one lags
    pub notice_capacity: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            commit_timeout: Duration::from_secs(10),
            notice_capacity: 64,
        }
    }
}

impl SyncConfig {
    /// Read `BOARD_COMMIT_TIMEOUT_MS`, keeping defaults for the rest.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            commit_timeout: env::var("BOARD_COMMIT_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.commit_timeout),
            ..defaults
        }
    }

    pub fn with_commit_timeout(mut self, timeout: Duration) -> Self {
        self.commit_timeout = timeout;
        self
    }
}
