//! Free-space classification for the volume holding the archive.

use std::path::PathBuf;

use reliquary_core::config::DiskConfig;
use reliquary_core::models::{DiskSpaceInfo, DiskStatus};

/// Reads free/total space and classifies it. Pure read; an I/O failure
/// fails safe as [`DiskStatus::Unknown`] instead of erroring out.
pub struct DiskSpaceMonitor {
    path: PathBuf,
    config: DiskConfig,
}

impl DiskSpaceMonitor {
    pub fn new(path: impl Into<PathBuf>, config: DiskConfig) -> Self {
        Self {
            path: path.into(),
            config,
        }
    }

    /// Current free-space snapshot for the monitored volume.
    pub fn check(&self) -> DiskSpaceInfo {
        let available = fs2::available_space(&self.path);
        let total = fs2::total_space(&self.path);
        match (available, total) {
            (Ok(available), Ok(total)) if total > 0 => self.classify(available, total),
            (Ok(_), Ok(_)) => {
                tracing::warn!("disk space read returned zero total for {}", self.path.display());
                Self::unknown()
            }
            (Err(e), _) | (_, Err(e)) => {
                tracing::warn!("disk space read failed for {}: {e}", self.path.display());
                Self::unknown()
            }
        }
    }

    /// Classification of a space reading: the worse of the absolute-bytes
    /// check and the percent-used check wins.
    pub fn classify(&self, available_bytes: u64, total_bytes: u64) -> DiskSpaceInfo {
        let percent_used =
            100.0 * (total_bytes.saturating_sub(available_bytes)) as f64 / total_bytes as f64;
        let status = self
            .classify_bytes(available_bytes)
            .worse(self.classify_percent(percent_used));
        DiskSpaceInfo {
            available_bytes,
            total_bytes,
            percent_used,
            status,
        }
    }

    fn classify_bytes(&self, available: u64) -> DiskStatus {
        if available < self.config.emergency_bytes {
            DiskStatus::Emergency
        } else if available < self.config.critical_bytes {
            DiskStatus::Critical
        } else if available < self.config.warning_bytes {
            DiskStatus::Warning
        } else {
            DiskStatus::Healthy
        }
    }

    fn classify_percent(&self, percent_used: f64) -> DiskStatus {
        if percent_used >= self.config.emergency_pct {
            DiskStatus::Emergency
        } else if percent_used >= self.config.critical_pct {
            DiskStatus::Critical
        } else if percent_used >= self.config.warning_pct {
            DiskStatus::Warning
        } else {
            DiskStatus::Healthy
        }
    }

    fn unknown() -> DiskSpaceInfo {
        DiskSpaceInfo {
            available_bytes: 0,
            total_bytes: 0,
            percent_used: 0.0,
            status: DiskStatus::Unknown,
        }
    }
}
