//! Configuration sections for the persistence-health subsystem,
//! one file per component, all serde-loadable with full defaults.

pub mod backup_config;
pub mod checkpoint_config;
pub mod defaults;
pub mod disk_config;
pub mod maintenance_config;
pub mod metrics_config;
pub mod monitor_config;
pub mod recovery_config;

pub use backup_config::BackupConfig;
pub use checkpoint_config::CheckpointConfig;
pub use disk_config::DiskConfig;
pub use maintenance_config::MaintenanceConfig;
pub use metrics_config::MetricsConfig;
pub use monitor_config::MonitorConfig;
pub use recovery_config::RecoveryConfig;

use serde::{Deserialize, Serialize};

/// Umbrella configuration wired in by the embedding application.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthConfig {
    pub backup: BackupConfig,
    pub checkpoint: CheckpointConfig,
    pub disk: DiskConfig,
    pub maintenance: MaintenanceConfig,
    pub metrics: MetricsConfig,
    pub monitor: MonitorConfig,
    pub recovery: RecoveryConfig,
}
