use serde::{Deserialize, Serialize};

/// Classification of free space on the volume holding the archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiskStatus {
    Healthy,
    Warning,
    Critical,
    Emergency,
    /// Space could not be read; treated as critical.
    Unknown,
}

impl DiskStatus {
    /// Severity rank for worse-of comparisons.
    pub fn severity(self) -> u8 {
        match self {
            DiskStatus::Healthy => 0,
            DiskStatus::Warning => 1,
            DiskStatus::Critical | DiskStatus::Unknown => 2,
            DiskStatus::Emergency => 3,
        }
    }

    /// The worse of two statuses.
    pub fn worse(self, other: DiskStatus) -> DiskStatus {
        if other.severity() > self.severity() {
            other
        } else {
            self
        }
    }
}

/// Snapshot of free/total space with its classification.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DiskSpaceInfo {
    pub available_bytes: u64,
    pub total_bytes: u64,
    pub percent_used: f64,
    pub status: DiskStatus,
}
