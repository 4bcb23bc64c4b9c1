//! Metrics collector configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::defaults;

/// Configuration for operation metrics.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Directory holding the daily history file and maintenance stamps.
    pub metrics_dir: PathBuf,
    /// Samples retained per operation in the rolling window.
    pub window: usize,
    /// Duration above which an operation is logged as slow (milliseconds).
    pub slow_op_threshold_ms: u64,
    /// Days of daily snapshots retained on disk.
    pub history_days: usize,
    /// Daily alert threshold: slow operations.
    pub alert_slow_ops: usize,
    /// Daily alert threshold: failed operations.
    pub alert_errors: usize,
    /// Daily alert threshold: average duration (milliseconds).
    pub alert_avg_duration_ms: f64,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            metrics_dir: PathBuf::from("metrics"),
            window: defaults::DEFAULT_METRICS_WINDOW,
            slow_op_threshold_ms: defaults::DEFAULT_SLOW_OP_THRESHOLD_MS,
            history_days: defaults::DEFAULT_METRICS_HISTORY_DAYS,
            alert_slow_ops: defaults::DEFAULT_ALERT_SLOW_OPS,
            alert_errors: defaults::DEFAULT_ALERT_ERRORS,
            alert_avg_duration_ms: defaults::DEFAULT_ALERT_AVG_DURATION_MS,
        }
    }
}
