//! # reliquary-health
//!
//! Self-healing persistence health for the archive database: disk space
//! monitoring, GFS-retained backups, WAL checkpointing, integrity
//! checking, performance metrics, maintenance due-tracking, and
//! autonomous corruption recovery, orchestrated by [`HealthMonitor`].
//!
//! Components are constructed explicitly by the embedding application and
//! wired together by reference; nothing here is a global singleton.

pub mod backup;
pub mod checkpoint;
pub mod disk;
pub mod integrity;
pub mod maintenance;
pub mod metrics;
pub mod monitor;
pub mod recovery;
pub mod task;
pub mod tracing_setup;

pub use backup::BackupScheduler;
pub use checkpoint::WalCheckpointScheduler;
pub use disk::DiskSpaceMonitor;
pub use integrity::IntegrityChecker;
pub use maintenance::MaintenanceScheduler;
pub use metrics::MetricsCollector;
pub use monitor::HealthMonitor;
pub use recovery::RecoverySystem;
