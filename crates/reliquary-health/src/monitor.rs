//! Top-level orchestrator: initializes every component, runs the periodic
//! health tick, and exposes unified status, dashboard, and recovery entry
//! points. Each tick step is isolated so one failing step never blocks
//! the rest of the tick.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use chrono::{NaiveDate, Utc};

use reliquary_core::config::{HealthConfig, MonitorConfig};
use reliquary_core::errors::StorageError;
use reliquary_core::models::{
    ComponentHealth, DashboardData, DiskStatus, HealthLevel, HealthReport, IntegrityResult,
    RecoveryResult,
};
use reliquary_core::ReliquaryResult;
use reliquary_storage::StorageEngine;

use crate::backup::BackupScheduler;
use crate::checkpoint::WalCheckpointScheduler;
use crate::disk::DiskSpaceMonitor;
use crate::integrity::IntegrityChecker;
use crate::maintenance::MaintenanceScheduler;
use crate::metrics::MetricsCollector;
use crate::recovery::RecoverySystem;
use crate::task::PeriodicTask;

pub struct HealthMonitor {
    engine: Arc<StorageEngine>,
    disk: Arc<DiskSpaceMonitor>,
    metrics: Arc<MetricsCollector>,
    integrity: Arc<IntegrityChecker>,
    checkpoints: Arc<WalCheckpointScheduler>,
    maintenance: Arc<MaintenanceScheduler>,
    backups: Arc<BackupScheduler>,
    recovery: Arc<RecoverySystem>,
    config: MonitorConfig,
    initialized: AtomicBool,
    shut_down: AtomicBool,
    last_integrity: Mutex<Option<IntegrityResult>>,
    last_daily_persist: Mutex<Option<NaiveDate>>,
    tick_task: Mutex<Option<PeriodicTask>>,
}

impl HealthMonitor {
    /// Wire the monitor over explicitly constructed components.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        engine: Arc<StorageEngine>,
        disk: Arc<DiskSpaceMonitor>,
        metrics: Arc<MetricsCollector>,
        integrity: Arc<IntegrityChecker>,
        checkpoints: Arc<WalCheckpointScheduler>,
        maintenance: Arc<MaintenanceScheduler>,
        backups: Arc<BackupScheduler>,
        recovery: Arc<RecoverySystem>,
        config: MonitorConfig,
    ) -> Self {
        Self {
            engine,
            disk,
            metrics,
            integrity,
            checkpoints,
            maintenance,
            backups,
            recovery,
            config,
            initialized: AtomicBool::new(false),
            shut_down: AtomicBool::new(false),
            last_integrity: Mutex::new(None),
            last_daily_persist: Mutex::new(None),
            tick_task: Mutex::new(None),
        }
    }

    /// Wire the full component stack over an open engine from a single
    /// configuration. Directories named by the config are created lazily
    /// during [`HealthMonitor::initialize`].
    pub fn from_config(engine: Arc<StorageEngine>, config: HealthConfig) -> Arc<Self> {
        let disk_path = engine
            .db_path()
            .and_then(|p| p.parent())
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| std::path::PathBuf::from("."));
        let integrity = Arc::new(IntegrityChecker::new(Arc::clone(&engine)));
        let checkpoints = Arc::new(WalCheckpointScheduler::new(
            Arc::clone(&engine),
            config.checkpoint,
        ));
        let backups = Arc::new(BackupScheduler::new(
            Arc::clone(&engine),
            Arc::clone(&checkpoints),
            config.backup,
        ));
        let recovery = Arc::new(RecoverySystem::new(
            Arc::clone(&engine),
            Arc::clone(&integrity),
            Arc::clone(&backups),
            config.recovery,
        ));
        let maintenance = Arc::new(MaintenanceScheduler::new(
            Arc::clone(&engine),
            config.maintenance,
            config.metrics.metrics_dir.clone(),
        ));
        let metrics = Arc::new(MetricsCollector::new(config.metrics));
        Arc::new(Self::new(
            engine,
            Arc::new(DiskSpaceMonitor::new(disk_path, config.disk)),
            metrics,
            integrity,
            checkpoints,
            maintenance,
            backups,
            recovery,
            config.monitor,
        ))
    }

    /// Initialize every component in order and start the periodic tick.
    /// Idempotent; a second call is a no-op. A failed call resets the
    /// guard so the caller can retry once the cause is resolved.
    pub fn initialize(self: &Arc<Self>) -> ReliquaryResult<()> {
        if self.initialized.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        let outcome = self.initialize_inner();
        if outcome.is_err() {
            self.initialized.store(false, Ordering::Release);
        }
        outcome
    }

    fn initialize_inner(self: &Arc<Self>) -> ReliquaryResult<()> {
        let started = Instant::now();

        // Precondition: the live file must actually exist.
        if let Some(path) = self.engine.db_path() {
            if !path.exists() {
                return Err(StorageError::MissingDatabase {
                    path: path.display().to_string(),
                }
                .into());
            }
        }

        self.metrics.initialize()?;
        self.checkpoints.initialize();
        self.maintenance.initialize()?;
        self.backups.initialize()?;

        let check = self.integrity.run_quick_check();
        if !check.is_healthy {
            tracing::warn!("startup quick check failed: {} errors", check.errors.len());
        }
        *self.lock(&self.last_integrity) = Some(check);

        let monitor = Arc::clone(self);
        let task = PeriodicTask::spawn(
            "health-tick",
            Duration::from_secs(self.config.tick_interval_secs),
            move || monitor.tick(),
        );
        *self.lock(&self.tick_task) = Some(task);

        let startup_ms = started.elapsed().as_millis() as u64;
        self.metrics.record_startup(startup_ms);
        tracing::info!("health monitor initialized in {startup_ms}ms");
        Ok(())
    }

    /// One periodic pass. Steps are independent; each failure is logged
    /// and the tick continues.
    fn tick(&self) {
        let disk = self.disk.check();
        if disk.status.severity() >= DiskStatus::Critical.severity() {
            tracing::error!(
                "disk space {:?}: {} bytes available",
                disk.status,
                disk.available_bytes
            );
        }

        if self.backups.needs_backup() {
            let timer = self.metrics.start_timer("backup.create");
            let created = self.backups.create_backup(None);
            timer.stop(created.is_some());
        }

        let today = Utc::now().date_naive();
        let due = *self.lock(&self.last_daily_persist) != Some(today);
        if due {
            if let Err(e) = self.backups.demote_daily() {
                tracing::warn!("daily demotion failed: {e}");
            }
            if let Err(e) = self.metrics.persist_daily() {
                tracing::warn!("daily metrics persist failed: {e}");
            }
            *self.lock(&self.last_daily_persist) = Some(today);
        }

        let stale = self
            .lock(&self.last_integrity)
            .as_ref()
            .map(|r| r.age_secs() > self.config.integrity_stale_secs as i64)
            .unwrap_or(true);
        if stale {
            let check = self.integrity.run_quick_check();
            if !check.is_healthy {
                tracing::error!("periodic quick check failed: {:?}", check.errors);
            }
            *self.lock(&self.last_integrity) = Some(check);
        }
    }

    /// Recompute component health and aggregate worst-of.
    pub fn health_status(&self) -> HealthReport {
        let mut components = Vec::with_capacity(5);
        let mut recommendations = Vec::new();

        // Database.
        if self.recovery.is_read_only() {
            components.push(ComponentHealth::at(
                "database",
                HealthLevel::Critical,
                "read-only mode active",
            ));
            recommendations
                .push("resolve corruption, then exit read-only mode manually".to_string());
        } else {
            let cached = self.lock(&self.last_integrity).clone();
            let check = cached.unwrap_or_else(|| self.integrity.run_quick_check());
            if check.is_healthy {
                components.push(ComponentHealth::healthy("database"));
            } else {
                components.push(ComponentHealth::at(
                    "database",
                    HealthLevel::Critical,
                    check.errors.join("; "),
                ));
                recommendations.push("run recovery to restore a verified backup".to_string());
            }
        }

        // Backups.
        let manifest = self.backups.manifest();
        if manifest.backups.is_empty() {
            components.push(ComponentHealth::at(
                "backups",
                HealthLevel::Warning,
                "no backups recorded",
            ));
            recommendations.push("create an initial backup".to_string());
        } else if !manifest.backups.iter().any(|b| b.verified) {
            components.push(ComponentHealth::at(
                "backups",
                HealthLevel::Error,
                "no verified backups",
            ));
            recommendations.push("verify a recent backup file".to_string());
        } else {
            components.push(ComponentHealth::healthy("backups"));
        }

        // Disk.
        let disk = self.disk.check();
        match disk.status {
            DiskStatus::Healthy => components.push(ComponentHealth::healthy("disk")),
            DiskStatus::Warning => {
                components.push(ComponentHealth::at(
                    "disk",
                    HealthLevel::Warning,
                    format!("{} bytes available", disk.available_bytes),
                ));
                recommendations.push("free up disk space soon".to_string());
            }
            DiskStatus::Critical | DiskStatus::Emergency | DiskStatus::Unknown => {
                components.push(ComponentHealth::at(
                    "disk",
                    HealthLevel::Critical,
                    format!("{:?}: {} bytes available", disk.status, disk.available_bytes),
                ));
                recommendations.push("free up disk space immediately".to_string());
            }
        }

        // Performance.
        let system = self.metrics.system_metrics();
        let thresholds = self.metrics.config();
        if system.error_count > thresholds.alert_errors {
            components.push(ComponentHealth::at(
                "performance",
                HealthLevel::Error,
                format!("{} failed operations in window", system.error_count),
            ));
            recommendations.push("inspect recent operation failures".to_string());
        } else if system.slow_op_count > thresholds.alert_slow_ops {
            components.push(ComponentHealth::at(
                "performance",
                HealthLevel::Warning,
                format!("{} slow operations in window", system.slow_op_count),
            ));
        } else {
            components.push(ComponentHealth::healthy("performance"));
        }

        // Maintenance.
        let status = self.maintenance.status();
        if status.vacuum_due || status.analyze_due {
            components.push(ComponentHealth::at(
                "maintenance",
                HealthLevel::Warning,
                "maintenance due",
            ));
            if status.vacuum_due {
                recommendations.push("run VACUUM".to_string());
            }
            if status.analyze_due {
                recommendations.push("run ANALYZE".to_string());
            }
        } else {
            components.push(ComponentHealth::healthy("maintenance"));
        }

        HealthReport {
            overall: HealthReport::derive_overall(&components),
            components,
            recommendations,
            generated_at: Utc::now(),
        }
    }

    /// Force a full integrity check and refresh the cache.
    pub fn run_health_check(&self) -> IntegrityResult {
        let check = self.integrity.run_full_check();
        *self.lock(&self.last_integrity) = Some(check.clone());
        check
    }

    /// Single aggregate for administrative tooling.
    pub fn dashboard_data(&self) -> DashboardData {
        DashboardData {
            health: self.health_status(),
            manifest: self.backups.manifest(),
            disk: self.disk.check(),
            wal: self.checkpoints.wal_stats(),
            system_metrics: self.metrics.system_metrics(),
            maintenance: self.maintenance.status(),
            last_integrity: self.lock(&self.last_integrity).clone(),
        }
    }

    /// Startup auto-recovery entry point.
    pub fn check_and_recover(&self) -> Option<RecoveryResult> {
        let result = self.recovery.check_and_recover();
        if result.is_some() {
            // Whatever happened, the cached view is stale now.
            let check = self.integrity.run_quick_check();
            *self.lock(&self.last_integrity) = Some(check);
        }
        result
    }

    /// Cancel timers, flush metrics once more, stop WAL idle monitoring.
    /// Idempotent.
    pub async fn shutdown(&self) {
        if self.shut_down.swap(true, Ordering::AcqRel) {
            return;
        }
        let task = self.lock(&self.tick_task).take();
        if let Some(task) = task {
            task.cancel().await;
        }
        self.checkpoints.shutdown().await;
        if let Err(e) = self.metrics.persist_daily() {
            tracing::warn!("final metrics flush failed: {e}");
        }
        tracing::info!("health monitor shut down");
    }

    fn lock<'a, T>(&self, mutex: &'a Mutex<T>) -> MutexGuard<'a, T> {
        mutex.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
