//! Recovery state machine configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::defaults;

/// Configuration for corruption recovery.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecoveryConfig {
    /// Maximum automatic recovery attempts before refusal.
    pub max_attempts: u32,
    /// Cooldown between recovery attempts (seconds).
    pub cooldown_secs: u64,
    /// Directory receiving forensic copies of corrupted files.
    pub emergency_dir: PathBuf,
}

impl RecoveryConfig {
    /// Cooldown as a chrono duration.
    pub fn cooldown(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.cooldown_secs as i64)
    }
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            max_attempts: defaults::DEFAULT_MAX_RECOVERY_ATTEMPTS,
            cooldown_secs: defaults::DEFAULT_RECOVERY_COOLDOWN_SECS,
            emergency_dir: PathBuf::from("backups/emergency"),
        }
    }
}
