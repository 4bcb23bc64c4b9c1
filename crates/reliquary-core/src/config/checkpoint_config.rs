//! WAL checkpoint scheduler configuration.

use serde::{Deserialize, Serialize};

use super::defaults;

/// Configuration for WAL checkpointing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckpointConfig {
    /// WAL file size above which a checkpoint is due (bytes).
    pub wal_size_threshold_bytes: u64,
    /// Interval between idle checkpoint polls (seconds).
    pub idle_interval_secs: u64,
    /// Delay before the one-shot startup checkpoint (seconds).
    pub startup_delay_secs: u64,
}

impl Default for CheckpointConfig {
    fn default() -> Self {
        Self {
            wal_size_threshold_bytes: defaults::DEFAULT_WAL_SIZE_THRESHOLD_BYTES,
            idle_interval_secs: defaults::DEFAULT_CHECKPOINT_IDLE_INTERVAL_SECS,
            startup_delay_secs: defaults::DEFAULT_CHECKPOINT_STARTUP_DELAY_SECS,
        }
    }
}
