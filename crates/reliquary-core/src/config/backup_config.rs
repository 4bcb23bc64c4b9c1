//! Backup scheduler configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::models::BackupCategory;

use super::defaults;

/// Configuration for the backup subsystem.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackupConfig {
    /// Root directory receiving `<year>/<category>/*.db` copies.
    pub backup_root: PathBuf,
    /// Interval between scheduled backups (seconds).
    pub interval_secs: u64,
    /// Retention cap per category.
    pub cap_yearly: usize,
    pub cap_monthly: usize,
    pub cap_weekly: usize,
    pub cap_daily: usize,
    pub cap_recent: usize,
}

impl BackupConfig {
    /// Retention cap for the given category.
    pub fn cap(&self, category: BackupCategory) -> usize {
        match category {
            BackupCategory::Yearly => self.cap_yearly,
            BackupCategory::Monthly => self.cap_monthly,
            BackupCategory::Weekly => self.cap_weekly,
            BackupCategory::Daily => self.cap_daily,
            BackupCategory::Recent => self.cap_recent,
        }
    }

    /// Backup interval as a chrono duration.
    pub fn interval(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.interval_secs as i64)
    }
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            backup_root: PathBuf::from("backups"),
            interval_secs: defaults::DEFAULT_BACKUP_INTERVAL_SECS,
            cap_yearly: defaults::DEFAULT_CAP_YEARLY,
            cap_monthly: defaults::DEFAULT_CAP_MONTHLY,
            cap_weekly: defaults::DEFAULT_CAP_WEEKLY,
            cap_daily: defaults::DEFAULT_CAP_DAILY,
            cap_recent: defaults::DEFAULT_CAP_RECENT,
        }
    }
}
