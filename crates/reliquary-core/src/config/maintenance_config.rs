//! Maintenance scheduler configuration.

use serde::{Deserialize, Serialize};

use super::defaults;

/// Due-tracking intervals for VACUUM and ANALYZE.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct MaintenanceConfig {
    /// Days between VACUUM runs before one is considered due.
    pub vacuum_interval_days: i64,
    /// Days between ANALYZE runs before one is considered due.
    pub analyze_interval_days: i64,
}

impl Default for MaintenanceConfig {
    fn default() -> Self {
        Self {
            vacuum_interval_days: defaults::DEFAULT_VACUUM_INTERVAL_DAYS,
            analyze_interval_days: defaults::DEFAULT_ANALYZE_INTERVAL_DAYS,
        }
    }
}
