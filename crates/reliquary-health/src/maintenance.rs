//! VACUUM / ANALYZE due-tracking with persisted last-run stamps.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use reliquary_core::config::MaintenanceConfig;
use reliquary_core::models::MaintenanceStatus;
use reliquary_core::{constants, ReliquaryResult};
use reliquary_storage::{maintenance as storage_maintenance, StorageEngine};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
struct MaintenanceState {
    last_vacuum: Option<DateTime<Utc>>,
    last_analyze: Option<DateTime<Utc>>,
}

/// Tracks whether VACUUM/ANALYZE are due and runs them on request.
/// One maintenance operation runs at a time.
pub struct MaintenanceScheduler {
    engine: Arc<StorageEngine>,
    config: MaintenanceConfig,
    state_path: PathBuf,
    state: Mutex<MaintenanceState>,
    running: AtomicBool,
}

impl MaintenanceScheduler {
    pub fn new(
        engine: Arc<StorageEngine>,
        config: MaintenanceConfig,
        state_dir: impl Into<PathBuf>,
    ) -> Self {
        let state_path = state_dir
            .into()
            .join(constants::MAINTENANCE_STATE_FILE_NAME);
        let state = Self::load_state(&state_path);
        Self {
            engine,
            config,
            state_path,
            state: Mutex::new(state),
            running: AtomicBool::new(false),
        }
    }

    /// Ensure the state directory exists.
    pub fn initialize(&self) -> ReliquaryResult<()> {
        if let Some(parent) = self.state_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }

    /// Whether VACUUM/ANALYZE are due, with their last-run stamps.
    pub fn status(&self) -> MaintenanceStatus {
        let state = *self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let now = Utc::now();
        MaintenanceStatus {
            last_vacuum: state.last_vacuum,
            last_analyze: state.last_analyze,
            vacuum_due: Self::due(state.last_vacuum, now, self.config.vacuum_interval_days),
            analyze_due: Self::due(state.last_analyze, now, self.config.analyze_interval_days),
        }
    }

    /// Run VACUUM. Returns `Ok(false)` when another maintenance operation
    /// is already in flight.
    pub fn run_vacuum(&self) -> ReliquaryResult<bool> {
        if !self.acquire() {
            return Ok(false);
        }
        let outcome = self
            .engine
            .with_conn(|conn| storage_maintenance::full_vacuum(conn));
        self.running.store(false, Ordering::Release);
        outcome?;
        self.stamp(|state, now| state.last_vacuum = Some(now));
        tracing::info!("VACUUM completed");
        Ok(true)
    }

    /// Run ANALYZE. Returns `Ok(false)` when another maintenance operation
    /// is already in flight.
    pub fn run_analyze(&self) -> ReliquaryResult<bool> {
        if !self.acquire() {
            return Ok(false);
        }
        let outcome = self
            .engine
            .with_conn(|conn| storage_maintenance::analyze(conn));
        self.running.store(false, Ordering::Release);
        outcome?;
        self.stamp(|state, now| state.last_analyze = Some(now));
        tracing::info!("ANALYZE completed");
        Ok(true)
    }

    fn acquire(&self) -> bool {
        let acquired = self
            .running
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_ok();
        if !acquired {
            tracing::debug!("maintenance skipped: already in flight");
        }
        acquired
    }

    fn due(last: Option<DateTime<Utc>>, now: DateTime<Utc>, interval_days: i64) -> bool {
        match last {
            Some(last) => now - last > Duration::days(interval_days),
            None => true,
        }
    }

    fn stamp(&self, update: impl FnOnce(&mut MaintenanceState, DateTime<Utc>)) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        update(&mut state, Utc::now());
        if let Err(e) = Self::save_state(&self.state_path, &state) {
            tracing::warn!("failed to persist maintenance stamps: {e}");
        }
    }

    fn load_state(path: &PathBuf) -> MaintenanceState {
        if !path.exists() {
            return MaintenanceState::default();
        }
        match std::fs::read(path).map_err(Into::into).and_then(
            |bytes| -> ReliquaryResult<MaintenanceState> { Ok(serde_json::from_slice(&bytes)?) },
        ) {
            Ok(state) => state,
            Err(e) => {
                tracing::warn!("maintenance stamps unreadable, starting fresh: {e}");
                MaintenanceState::default()
            }
        }
    }

    fn save_state(path: &PathBuf, state: &MaintenanceState) -> ReliquaryResult<()> {
        let bytes = serde_json::to_vec_pretty(state)?;
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, bytes)?;
        std::fs::rename(&tmp, path)?;
        Ok(())
    }
}
