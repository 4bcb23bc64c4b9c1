//! Data models for the persistence-health subsystem.

mod backup;
mod disk;
mod health;
mod integrity;
mod maintenance;
mod metrics;
mod recovery;
mod wal;

pub use backup::{BackupCategory, BackupManifest, BackupMetadata};
pub use disk::{DiskSpaceInfo, DiskStatus};
pub use health::{ComponentHealth, DashboardData, HealthLevel, HealthReport};
pub use integrity::IntegrityResult;
pub use maintenance::MaintenanceStatus;
pub use metrics::{DailyMetrics, MetricAlert, MetricsSummary, OperationMetric, SystemMetrics};
pub use recovery::{RecoveryAction, RecoveryResult, RecoveryState};
pub use wal::{CheckpointMode, CheckpointResult, WalStats};
