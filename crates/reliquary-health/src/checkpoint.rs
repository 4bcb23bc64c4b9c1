//! WAL growth bounded by scheduled and forced checkpoints.
//!
//! One checkpoint runs at a time; a request arriving mid-run is rejected
//! as skipped, never queued. Failures are logged and return a zero
//! result; the next idle tick retries naturally.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};

use reliquary_core::config::CheckpointConfig;
use reliquary_core::models::{CheckpointMode, CheckpointResult, WalStats};
use reliquary_storage::{maintenance, StorageEngine};

use crate::task::PeriodicTask;

pub struct WalCheckpointScheduler {
    engine: Arc<StorageEngine>,
    config: CheckpointConfig,
    checkpointing: AtomicBool,
    last_checkpoint: Mutex<Option<DateTime<Utc>>>,
    /// Page counts from the most recent successful run, for [`WalStats`].
    last_counts: Mutex<(i64, i64)>,
    idle_task: Mutex<Option<PeriodicTask>>,
    startup_task: Mutex<Option<tokio::task::JoinHandle<()>>>,
}

impl WalCheckpointScheduler {
    pub fn new(engine: Arc<StorageEngine>, config: CheckpointConfig) -> Self {
        Self {
            engine,
            config,
            checkpointing: AtomicBool::new(false),
            last_checkpoint: Mutex::new(None),
            last_counts: Mutex::new((0, 0)),
            idle_task: Mutex::new(None),
            startup_task: Mutex::new(None),
        }
    }

    /// Schedule the one-shot startup checkpoint and start idle monitoring.
    pub fn initialize(self: &Arc<Self>) {
        let startup = Arc::clone(self);
        let delay = Duration::from_secs(self.config.startup_delay_secs);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let result = startup.run_checkpoint(CheckpointMode::Passive);
            tracing::debug!(
                "startup checkpoint: success={} pages={}",
                result.success,
                result.checkpointed_pages
            );
        });
        if let Ok(mut guard) = self.startup_task.lock() {
            *guard = Some(handle);
        }

        let idle = Arc::clone(self);
        let task = PeriodicTask::spawn(
            "wal-idle-monitor",
            Duration::from_secs(self.config.idle_interval_secs),
            move || {
                if idle.needs_checkpoint() {
                    idle.run_checkpoint(CheckpointMode::Truncate);
                }
            },
        );
        if let Ok(mut guard) = self.idle_task.lock() {
            *guard = Some(task);
        }
    }

    /// Current WAL statistics. Pure read, never persisted.
    pub fn wal_stats(&self) -> WalStats {
        let wal_size_bytes = self.wal_file_size();
        let page_size = self
            .engine
            .with_conn(|conn| maintenance::page_size(conn))
            .unwrap_or(4096)
            .max(1);
        let (_, checkpointed) = self
            .last_counts
            .lock()
            .map(|g| *g)
            .unwrap_or((0, 0));
        WalStats {
            wal_size_bytes,
            wal_pages: wal_size_bytes / page_size,
            checkpointed_pages: checkpointed.max(0) as u64,
            last_checkpoint: self.last_checkpoint.lock().ok().and_then(|g| *g),
        }
    }

    /// True when the WAL file has outgrown the configured threshold.
    pub fn needs_checkpoint(&self) -> bool {
        self.wal_file_size() > self.config.wal_size_threshold_bytes
    }

    /// Run a checkpoint in the given mode. Rejected with a skipped result
    /// while another run is in flight.
    pub fn run_checkpoint(&self, mode: CheckpointMode) -> CheckpointResult {
        if self
            .checkpointing
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            tracing::debug!("checkpoint ({}) skipped: already in flight", mode.as_sql());
            return CheckpointResult::skipped(mode);
        }

        let started = Instant::now();
        let size_before = self.wal_file_size();
        let outcome = self
            .engine
            .with_conn(|conn| maintenance::wal_checkpoint(conn, mode));
        let duration_ms = started.elapsed().as_millis() as u64;

        let result = match outcome {
            Ok(counts) => {
                if let Ok(mut guard) = self.last_checkpoint.lock() {
                    *guard = Some(Utc::now());
                }
                if let Ok(mut guard) = self.last_counts.lock() {
                    *guard = (counts.log_pages, counts.checkpointed_pages);
                }
                let size_after = self.wal_file_size();
                if counts.busy {
                    tracing::warn!("checkpoint ({}) returned busy", mode.as_sql());
                }
                CheckpointResult {
                    success: !counts.busy,
                    skipped: false,
                    mode,
                    log_pages: counts.log_pages,
                    checkpointed_pages: counts.checkpointed_pages,
                    space_recovered_bytes: size_before.saturating_sub(size_after),
                    duration_ms,
                }
            }
            Err(e) => {
                tracing::warn!("checkpoint ({}) failed: {e}", mode.as_sql());
                CheckpointResult::failed(mode, duration_ms)
            }
        };

        self.checkpointing.store(false, Ordering::Release);
        result
    }

    /// TRUNCATE checkpoint, run synchronously and sequenced strictly
    /// before the backup copy begins.
    pub fn checkpoint_before_backup(&self) -> CheckpointResult {
        self.run_checkpoint(CheckpointMode::Truncate)
    }

    /// Stop idle monitoring and the pending startup checkpoint.
    pub async fn shutdown(&self) {
        let task = self.idle_task.lock().ok().and_then(|mut g| g.take());
        if let Some(task) = task {
            task.cancel().await;
        }
        let startup = self.startup_task.lock().ok().and_then(|mut g| g.take());
        if let Some(handle) = startup {
            handle.abort();
        }
    }

    fn wal_file_size(&self) -> u64 {
        self.engine
            .wal_path()
            .and_then(|p| std::fs::metadata(p).ok())
            .map(|m| m.len())
            .unwrap_or(0)
    }
}
