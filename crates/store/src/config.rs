//! Store configuration.

use serde::{Deserialize, Serialize};

/// Store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// JSON seed file loaded at startup (optional)
    #[serde(default)]
    pub seed_path: Option<String>,
    /// Expired-session sweep interval in seconds
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
    /// How long an expired session is kept before the sweep removes it
    #[serde(default = "default_sweep_grace_minutes")]
    pub sweep_grace_minutes: i64,
    /// Error-log entries kept in memory
    #[serde(default = "default_error_log_capacity")]
    pub error_log_capacity: usize,
}

fn default_sweep_interval_secs() -> u64 {
    300
}

fn default_sweep_grace_minutes() -> i64 {
    60
}

fn default_error_log_capacity() -> usize {
    10_000
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            seed_path: None,
            sweep_interval_secs: default_sweep_interval_secs(),
            sweep_grace_minutes: default_sweep_grace_minutes(),
            error_log_capacity: default_error_log_capacity(),
        }
    }
}
