//! Health monitor configuration.

use serde::{Deserialize, Serialize};

use super::defaults;

/// Configuration for the periodic health tick.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Interval between periodic health ticks (seconds).
    pub tick_interval_secs: u64,
    /// Age after which the cached integrity result is refreshed (seconds).
    pub integrity_stale_secs: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            tick_interval_secs: defaults::DEFAULT_MONITOR_TICK_SECS,
            integrity_stale_secs: defaults::DEFAULT_INTEGRITY_STALE_SECS,
        }
    }
}
