//! Disk space monitor configuration.

use serde::{Deserialize, Serialize};

use super::defaults;

/// Thresholds for free-space classification. Each level has an absolute
/// byte floor and a percent-used ceiling; the worse result wins.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct DiskConfig {
    pub warning_bytes: u64,
    pub critical_bytes: u64,
    pub emergency_bytes: u64,
    pub warning_pct: f64,
    pub critical_pct: f64,
    pub emergency_pct: f64,
}

impl Default for DiskConfig {
    fn default() -> Self {
        Self {
            warning_bytes: defaults::DEFAULT_DISK_WARNING_BYTES,
            critical_bytes: defaults::DEFAULT_DISK_CRITICAL_BYTES,
            emergency_bytes: defaults::DEFAULT_DISK_EMERGENCY_BYTES,
            warning_pct: defaults::DEFAULT_DISK_WARNING_PCT,
            critical_pct: defaults::DEFAULT_DISK_CRITICAL_PCT,
            emergency_pct: defaults::DEFAULT_DISK_EMERGENCY_PCT,
        }
    }
}
