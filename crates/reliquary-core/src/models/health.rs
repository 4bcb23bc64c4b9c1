use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{
    BackupManifest, DiskSpaceInfo, IntegrityResult, MaintenanceStatus, SystemMetrics, WalStats,
};

/// Component health level. Declaration order gives worst-of precedence:
/// critical > warning > error > healthy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthLevel {
    Healthy,
    Error,
    Warning,
    Critical,
}

/// Health of a single component, recomputed on demand.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    pub name: String,
    pub level: HealthLevel,
    pub message: Option<String>,
}

impl ComponentHealth {
    pub fn healthy(name: &str) -> Self {
        Self {
            name: name.to_string(),
            level: HealthLevel::Healthy,
            message: None,
        }
    }

    pub fn at(name: &str, level: HealthLevel, message: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            level,
            message: Some(message.into()),
        }
    }
}

/// Aggregate health snapshot, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    pub overall: HealthLevel,
    pub components: Vec<ComponentHealth>,
    pub recommendations: Vec<String>,
    pub generated_at: DateTime<Utc>,
}

impl HealthReport {
    /// Worst-of aggregation over component levels.
    pub fn derive_overall(components: &[ComponentHealth]) -> HealthLevel {
        components
            .iter()
            .map(|c| c.level)
            .max()
            .unwrap_or(HealthLevel::Healthy)
    }
}

/// Single aggregate handed to administrative tooling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardData {
    pub health: HealthReport,
    pub manifest: BackupManifest,
    pub disk: DiskSpaceInfo,
    pub wal: WalStats,
    pub system_metrics: SystemMetrics,
    pub maintenance: MaintenanceStatus,
    pub last_integrity: Option<IntegrityResult>,
}
