use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// GFS retention tier a backup belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackupCategory {
    Yearly,
    Monthly,
    Weekly,
    Daily,
    Recent,
}

impl BackupCategory {
    /// Every category, in retention-sweep order.
    pub const ALL: [BackupCategory; 5] = [
        BackupCategory::Yearly,
        BackupCategory::Monthly,
        BackupCategory::Weekly,
        BackupCategory::Daily,
        BackupCategory::Recent,
    ];

    /// Directory name under `<root>/<year>/`.
    pub fn dir_name(self) -> &'static str {
        match self {
            BackupCategory::Yearly => "yearly",
            BackupCategory::Monthly => "monthly",
            BackupCategory::Weekly => "weekly",
            BackupCategory::Daily => "daily",
            BackupCategory::Recent => "recent",
        }
    }
}

/// Record of a single backup copy on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupMetadata {
    pub backup_id: String,
    pub category: BackupCategory,
    pub file_path: PathBuf,
    pub timestamp: DateTime<Utc>,
    pub size_bytes: u64,
    /// Flips true only after an integrity check validates the copy.
    pub verified: bool,
}

/// Persisted manifest, the authoritative record of the backup set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BackupManifest {
    pub backups: Vec<BackupMetadata>,
    pub last_backup: Option<DateTime<Utc>>,
    pub last_verification: Option<DateTime<Utc>>,
}

impl BackupManifest {
    /// Entries for one category.
    pub fn in_category(&self, category: BackupCategory) -> Vec<&BackupMetadata> {
        self.backups.iter().filter(|b| b.category == category).collect()
    }

    /// All entries, most recent first.
    pub fn most_recent_first(&self) -> Vec<BackupMetadata> {
        let mut sorted = self.backups.clone();
        sorted.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        sorted
    }
}
