use std::path::Path;
use std::sync::Arc;

use tempfile::TempDir;

use reliquary_core::config::{
    CheckpointConfig, DiskConfig, MaintenanceConfig, MetricsConfig, MonitorConfig, RecoveryConfig,
};
use reliquary_core::errors::StorageError;
use reliquary_core::models::HealthLevel;
use reliquary_core::ReliquaryError;
use reliquary_health::{
    BackupScheduler, DiskSpaceMonitor, HealthMonitor, IntegrityChecker, MaintenanceScheduler,
    MetricsCollector, RecoverySystem, WalCheckpointScheduler,
};
use reliquary_storage::StorageEngine;

use crate::common;

/// Disk thresholds that can never trip, so machine state cannot sway the
/// aggregate verdict.
fn lenient_disk() -> DiskConfig {
    DiskConfig {
        warning_bytes: 0,
        critical_bytes: 0,
        emergency_bytes: 0,
        warning_pct: 200.0,
        critical_pct: 201.0,
        emergency_pct: 202.0,
    }
}

fn build_monitor(
    dir: &Path,
    engine: Arc<StorageEngine>,
) -> (Arc<HealthMonitor>, Arc<BackupScheduler>) {
    let integrity = Arc::new(IntegrityChecker::new(Arc::clone(&engine)));
    let checkpoints = Arc::new(WalCheckpointScheduler::new(
        Arc::clone(&engine),
        CheckpointConfig {
            startup_delay_secs: 3600,
            idle_interval_secs: 3600,
            ..CheckpointConfig::default()
        },
    ));
    let backups = Arc::new(BackupScheduler::new(
        Arc::clone(&engine),
        Arc::clone(&checkpoints),
        common::backup_config(dir),
    ));
    let recovery = Arc::new(RecoverySystem::new(
        Arc::clone(&engine),
        Arc::clone(&integrity),
        Arc::clone(&backups),
        RecoveryConfig {
            emergency_dir: dir.join("emergency"),
            ..RecoveryConfig::default()
        },
    ));
    let metrics = Arc::new(MetricsCollector::new(MetricsConfig {
        metrics_dir: dir.join("metrics"),
        ..MetricsConfig::default()
    }));
    let maintenance = Arc::new(MaintenanceScheduler::new(
        Arc::clone(&engine),
        MaintenanceConfig::default(),
        dir.join("metrics"),
    ));
    let monitor = Arc::new(HealthMonitor::new(
        Arc::clone(&engine),
        Arc::new(DiskSpaceMonitor::new(dir, lenient_disk())),
        metrics,
        integrity,
        checkpoints,
        maintenance,
        Arc::clone(&backups),
        recovery,
        MonitorConfig {
            tick_interval_secs: 3600,
            ..MonitorConfig::default()
        },
    ));
    (monitor, backups)
}

#[tokio::test]
async fn everything_green_reports_healthy_overall() {
    let dir = TempDir::new().unwrap();
    let engine = common::open_populated(dir.path(), 10).unwrap();
    let (monitor, backups) = build_monitor(dir.path(), Arc::clone(&engine));

    monitor.initialize().unwrap();
    let meta = backups.create_backup(None).unwrap();
    backups.mark_verified(&meta.backup_id).unwrap();

    let report = monitor.health_status();
    assert_eq!(report.components.len(), 5);
    let by_name = |name: &str| {
        report
            .components
            .iter()
            .find(|c| c.name == name)
            .unwrap_or_else(|| panic!("missing component {name}"))
    };
    assert_eq!(by_name("database").level, HealthLevel::Healthy);
    assert_eq!(by_name("backups").level, HealthLevel::Healthy);
    assert_eq!(by_name("disk").level, HealthLevel::Healthy);
    assert_eq!(by_name("performance").level, HealthLevel::Healthy);
    // Vacuum/analyze have never run on a fresh stack.
    assert_eq!(by_name("maintenance").level, HealthLevel::Warning);
    assert_eq!(report.overall, HealthLevel::Warning);

    monitor.shutdown().await;
}

#[tokio::test]
async fn missing_database_file_fails_initialization() {
    let dir = TempDir::new().unwrap();
    let engine = common::open_populated(dir.path(), 2).unwrap();
    let (monitor, _backups) = build_monitor(dir.path(), Arc::clone(&engine));

    engine.close().unwrap();
    std::fs::remove_file(dir.path().join("archive.db")).unwrap();

    let err = monitor.initialize().unwrap_err();
    assert!(matches!(
        err,
        ReliquaryError::Storage(StorageError::MissingDatabase { .. })
    ));
}

#[tokio::test]
async fn failed_initialize_can_be_retried() {
    let dir = TempDir::new().unwrap();
    let engine = common::open_populated(dir.path(), 3).unwrap();
    let (monitor, _backups) = build_monitor(dir.path(), Arc::clone(&engine));

    // A plain file where the metrics directory should go makes the first
    // attempt fail.
    std::fs::write(dir.path().join("metrics"), b"in the way").unwrap();
    assert!(monitor.initialize().is_err());

    // Once the obstruction is gone, a retry really initializes instead of
    // short-circuiting on the guard.
    std::fs::remove_file(dir.path().join("metrics")).unwrap();
    monitor.initialize().unwrap();
    assert!(monitor.dashboard_data().last_integrity.is_some());

    monitor.shutdown().await;
}

#[tokio::test]
async fn missing_backups_surface_as_a_warning() {
    let dir = TempDir::new().unwrap();
    let engine = common::open_populated(dir.path(), 5).unwrap();
    let (monitor, _backups) = build_monitor(dir.path(), Arc::clone(&engine));

    monitor.initialize().unwrap();
    let report = monitor.health_status();
    let backups_component = report
        .components
        .iter()
        .find(|c| c.name == "backups")
        .unwrap();
    assert_eq!(backups_component.level, HealthLevel::Warning);
    assert!(report
        .recommendations
        .iter()
        .any(|r| r.contains("initial backup")));

    monitor.shutdown().await;
}

#[tokio::test]
async fn dashboard_aggregates_every_surface() {
    let dir = TempDir::new().unwrap();
    let engine = common::open_populated(dir.path(), 10).unwrap();
    let (monitor, backups) = build_monitor(dir.path(), Arc::clone(&engine));

    monitor.initialize().unwrap();
    backups.create_backup(None).unwrap();

    let data = monitor.dashboard_data();
    assert_eq!(data.manifest.backups.len(), 1);
    assert_eq!(data.health.components.len(), 5);
    assert!(data.last_integrity.as_ref().is_some_and(|r| r.is_healthy));
    assert!(data.disk.total_bytes > 0);
    assert!(data.maintenance.last_vacuum.is_none());

    monitor.shutdown().await;
}

#[tokio::test]
async fn forced_health_check_refreshes_the_cache() {
    let dir = TempDir::new().unwrap();
    let engine = common::open_populated(dir.path(), 5).unwrap();
    let (monitor, _backups) = build_monitor(dir.path(), Arc::clone(&engine));

    monitor.initialize().unwrap();
    let check = monitor.run_health_check();
    assert!(check.is_healthy);
    assert!(check.errors.is_empty());

    assert!(monitor.check_and_recover().is_none());
    monitor.shutdown().await;
}

#[tokio::test]
async fn shutdown_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let engine = common::open_populated(dir.path(), 2).unwrap();
    let (monitor, _backups) = build_monitor(dir.path(), Arc::clone(&engine));

    monitor.initialize().unwrap();
    monitor.shutdown().await;
    monitor.shutdown().await;
}

#[tokio::test]
async fn from_config_wires_a_working_stack() {
    let dir = TempDir::new().unwrap();
    let engine = common::open_populated(dir.path(), 5).unwrap();
    let config = reliquary_core::HealthConfig {
        backup: common::backup_config(dir.path()),
        metrics: MetricsConfig {
            metrics_dir: dir.path().join("metrics"),
            ..MetricsConfig::default()
        },
        recovery: RecoveryConfig {
            emergency_dir: dir.path().join("emergency"),
            ..RecoveryConfig::default()
        },
        disk: lenient_disk(),
        ..reliquary_core::HealthConfig::default()
    };

    let monitor = HealthMonitor::from_config(Arc::clone(&engine), config);
    monitor.initialize().unwrap();

    let data = monitor.dashboard_data();
    assert!(data.last_integrity.as_ref().is_some_and(|r| r.is_healthy));
    assert!(monitor.check_and_recover().is_none());
    monitor.shutdown().await;
}

#[tokio::test]
async fn double_initialize_is_a_no_op() {
    let dir = TempDir::new().unwrap();
    let engine = common::open_populated(dir.path(), 2).unwrap();
    let (monitor, _backups) = build_monitor(dir.path(), Arc::clone(&engine));

    monitor.initialize().unwrap();
    monitor.initialize().unwrap();
    monitor.shutdown().await;
}
