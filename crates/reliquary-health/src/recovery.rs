//! Corruption recovery state machine.
//!
//! Healthy → read-only on confirmed corruption → healthy again on a
//! verified restore, or stuck read-only once attempts are exhausted.
//! Every attempt arms the cooldown; the gate check and the counter bump
//! happen inside one critical section so concurrent callers cannot race
//! past the gate together.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use chrono::Utc;

use reliquary_core::config::RecoveryConfig;
use reliquary_core::errors::{RecoveryError, StorageError};
use reliquary_core::models::{BackupMetadata, RecoveryAction, RecoveryResult, RecoveryState};
use reliquary_core::ReliquaryResult;
use reliquary_storage::{backup as storage_backup, StorageEngine};

use crate::backup::BackupScheduler;
use crate::integrity::IntegrityChecker;

#[derive(Debug, Default)]
struct Inner {
    read_only: bool,
    last_attempt: Option<chrono::DateTime<Utc>>,
    attempt_count: u32,
}

pub struct RecoverySystem {
    engine: Arc<StorageEngine>,
    integrity: Arc<IntegrityChecker>,
    backups: Arc<BackupScheduler>,
    config: RecoveryConfig,
    state: Mutex<Inner>,
}

impl RecoverySystem {
    pub fn new(
        engine: Arc<StorageEngine>,
        integrity: Arc<IntegrityChecker>,
        backups: Arc<BackupScheduler>,
        config: RecoveryConfig,
    ) -> Self {
        Self {
            engine,
            integrity,
            backups,
            config,
            state: Mutex::new(Inner::default()),
        }
    }

    /// Current recovery state snapshot.
    pub fn state(&self) -> RecoveryState {
        let inner = self.lock();
        RecoveryState {
            is_in_read_only_mode: inner.read_only,
            last_recovery_attempt: inner.last_attempt,
            recovery_attempt_count: inner.attempt_count,
            can_attempt_recovery: self.can_attempt(&inner),
        }
    }

    /// Whether the subsystem is refusing writes.
    pub fn is_read_only(&self) -> bool {
        self.lock().read_only
    }

    /// Manual-only exit from read-only mode; resets the attempt budget.
    /// Never called automatically.
    pub fn exit_read_only_mode(&self) {
        *self.lock() = Inner::default();
        tracing::info!("read-only mode cleared manually");
    }

    /// Startup entry point: quick check first, recovery only on failure.
    /// Returns `None` when nothing was needed.
    pub fn check_and_recover(&self) -> Option<RecoveryResult> {
        let check = self.integrity.run_quick_check();
        if check.is_healthy {
            return None;
        }
        tracing::warn!("quick check failed ({} errors), recovering", check.errors.len());
        Some(self.attempt_recovery())
    }

    /// Run one bounded recovery attempt.
    pub fn attempt_recovery(&self) -> RecoveryResult {
        let started = Instant::now();

        // Gate and increment atomically.
        {
            let mut inner = self.lock();
            if inner.attempt_count >= self.config.max_attempts {
                let err = RecoveryError::AttemptsExhausted {
                    attempts: inner.attempt_count,
                    max: self.config.max_attempts,
                };
                tracing::error!("{err}; manual intervention required");
                return Self::timed(
                    RecoveryResult::new(false, RecoveryAction::None, err.to_string()),
                    started,
                );
            }
            let now = Utc::now();
            if let Some(last) = inner.last_attempt {
                let elapsed = now - last;
                if elapsed < self.config.cooldown() {
                    let err = RecoveryError::CooldownActive {
                        remaining_secs: (self.config.cooldown() - elapsed).num_seconds(),
                    };
                    tracing::warn!("{err}");
                    return Self::timed(
                        RecoveryResult::new(false, RecoveryAction::None, err.to_string()),
                        started,
                    );
                }
            }
            // The stamp arms the cooldown no matter how this attempt ends.
            inner.attempt_count += 1;
            inner.last_attempt = Some(now);
        }

        Self::timed(self.run_recovery(), started)
    }

    fn run_recovery(&self) -> RecoveryResult {
        let check = self.integrity.run_full_check();
        if check.is_healthy {
            self.reset_state();
            tracing::info!("recovery requested but integrity is clean");
            return RecoveryResult::new(
                true,
                RecoveryAction::None,
                "integrity check passed; no recovery needed",
            );
        }

        self.lock().read_only = true;
        tracing::error!(
            "database corruption confirmed ({} errors); entering read-only mode",
            check.errors.len()
        );

        // Forensic copy first, best-effort.
        if let Err(e) = self.emergency_copy() {
            tracing::warn!("emergency backup failed: {e}");
        }

        let Some(backup) = self.find_restorable_backup() else {
            let err = RecoveryError::NoVerifiedBackup;
            tracing::error!("{err}; staying in read-only mode");
            return RecoveryResult::new(false, RecoveryAction::ReadOnlyMode, err.to_string());
        };

        if let Err(e) = self.restore_from(&backup) {
            let err = RecoveryError::RestoreFailed {
                reason: e.to_string(),
            };
            tracing::error!("{err}");
            return RecoveryResult::new(false, RecoveryAction::ReadOnlyMode, err.to_string());
        }

        let recheck = self.integrity.run_full_check();
        if recheck.is_healthy {
            self.reset_state();
            tracing::info!("restored from backup {}", backup.backup_id);
            let mut result = RecoveryResult::new(
                true,
                RecoveryAction::BackupRestored,
                format!("restored from backup {}", backup.backup_id),
            );
            result.backup_used = Some(backup.backup_id);
            result
        } else {
            tracing::error!("restored file still fails integrity; staying read-only");
            RecoveryResult::new(
                false,
                RecoveryAction::ReadOnlyMode,
                "restored file failed integrity check",
            )
        }
    }

    /// Most-recent-first search for a backup that is verified, or becomes
    /// verified now. First hit wins.
    fn find_restorable_backup(&self) -> Option<BackupMetadata> {
        for candidate in self.backups.manifest().most_recent_first() {
            if candidate.verified {
                return Some(candidate);
            }
            if self.integrity.verify_backup_file(&candidate.file_path).is_healthy {
                if let Err(e) = self.backups.mark_verified(&candidate.backup_id) {
                    tracing::warn!("failed to persist verified flag: {e}");
                }
                return Some(candidate);
            }
            tracing::warn!(
                "backup {} failed verification, trying older",
                candidate.backup_id
            );
        }
        None
    }

    fn restore_from(&self, backup: &BackupMetadata) -> ReliquaryResult<()> {
        let live = self.live_path()?;
        self.engine.close()?;
        storage_backup::restore_over(&live, &backup.file_path)?;
        self.engine.reopen()?;
        Ok(())
    }

    /// Copy the suspect live file into the emergency directory for
    /// forensics before any repair touches it.
    fn emergency_copy(&self) -> ReliquaryResult<PathBuf> {
        let live = self.live_path()?;
        std::fs::create_dir_all(&self.config.emergency_dir)?;
        let dest = self.config.emergency_dir.join(format!(
            "emergency-{}.db",
            Utc::now().format("%Y%m%d-%H%M%S")
        ));
        std::fs::copy(&live, &dest)?;
        tracing::info!("emergency copy at {}", dest.display());
        Ok(dest)
    }

    /// Manual forensic entry point for administrative tooling.
    pub fn create_emergency_backup(&self) -> RecoveryResult {
        let started = Instant::now();
        let result = match self.emergency_copy() {
            Ok(dest) => RecoveryResult::new(
                true,
                RecoveryAction::EmergencyBackup,
                format!("emergency copy at {}", dest.display()),
            ),
            Err(e) => RecoveryResult::new(false, RecoveryAction::EmergencyBackup, e.to_string()),
        };
        Self::timed(result, started)
    }

    fn live_path(&self) -> ReliquaryResult<PathBuf> {
        self.engine
            .db_path()
            .map(PathBuf::from)
            .ok_or_else(|| {
                StorageError::MissingDatabase {
                    path: "<in-memory>".to_string(),
                }
                .into()
            })
    }

    fn can_attempt(&self, inner: &Inner) -> bool {
        if inner.attempt_count >= self.config.max_attempts {
            return false;
        }
        match inner.last_attempt {
            Some(last) => Utc::now() - last >= self.config.cooldown(),
            None => true,
        }
    }

    fn reset_state(&self) {
        *self.lock() = Inner::default();
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn timed(mut result: RecoveryResult, started: Instant) -> RecoveryResult {
        result.duration_ms = started.elapsed().as_millis() as u64;
        result
    }
}
