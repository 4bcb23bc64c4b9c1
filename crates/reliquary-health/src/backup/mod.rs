//! GFS-retained timestamped copies of the archive database.

pub mod manifest_store;
pub mod retention;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Datelike, Utc, Weekday};
use uuid::Uuid;

use reliquary_core::config::BackupConfig;
use reliquary_core::errors::StorageError;
use reliquary_core::models::{BackupCategory, BackupManifest, BackupMetadata};
use reliquary_core::{constants, ReliquaryResult};
use reliquary_storage::{backup as storage_backup, StorageEngine};

use crate::checkpoint::WalCheckpointScheduler;
use manifest_store::ManifestStore;

/// Creates timestamped copies under `<root>/<year>/<category>/`, keeps the
/// persisted manifest authoritative, and enforces per-category retention.
/// One backup runs at a time; a request arriving mid-run returns `None`.
pub struct BackupScheduler {
    engine: Arc<StorageEngine>,
    checkpoints: Arc<WalCheckpointScheduler>,
    config: BackupConfig,
    store: ManifestStore,
    manifest: Mutex<BackupManifest>,
    backing_up: AtomicBool,
}

impl BackupScheduler {
    pub fn new(
        engine: Arc<StorageEngine>,
        checkpoints: Arc<WalCheckpointScheduler>,
        config: BackupConfig,
    ) -> Self {
        let store = ManifestStore::new(config.backup_root.join(constants::MANIFEST_FILE_NAME));
        let manifest = match store.load() {
            Ok(manifest) => manifest,
            Err(e) => {
                tracing::warn!("manifest unreadable, starting fresh: {e}");
                BackupManifest::default()
            }
        };
        Self {
            engine,
            checkpoints,
            config,
            store,
            manifest: Mutex::new(manifest),
            backing_up: AtomicBool::new(false),
        }
    }

    /// Ensure the backup root exists.
    pub fn initialize(&self) -> ReliquaryResult<()> {
        std::fs::create_dir_all(&self.config.backup_root)?;
        Ok(())
    }

    /// First-match category priority: yearly (Jan 1) > monthly (day 1) >
    /// weekly (Sunday) > daily. A Jan 1 that is also a Sunday is yearly.
    pub fn determine_backup_category(now: DateTime<Utc>) -> BackupCategory {
        if now.month() == 1 && now.day() == 1 {
            BackupCategory::Yearly
        } else if now.day() == 1 {
            BackupCategory::Monthly
        } else if now.weekday() == Weekday::Sun {
            BackupCategory::Weekly
        } else {
            BackupCategory::Daily
        }
    }

    /// Create a backup in the given category (resolved from the clock when
    /// `None`). Returns the new metadata, or `None` on failure or when a
    /// backup is already in flight.
    pub fn create_backup(&self, category: Option<BackupCategory>) -> Option<BackupMetadata> {
        if self
            .backing_up
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            tracing::debug!("backup skipped: already in flight");
            return None;
        }

        let outcome = self.create_backup_inner(category);
        self.backing_up.store(false, Ordering::Release);

        match outcome {
            Ok(metadata) => Some(metadata),
            Err(e) => {
                tracing::warn!("backup failed: {e}");
                None
            }
        }
    }

    fn create_backup_inner(
        &self,
        category: Option<BackupCategory>,
    ) -> ReliquaryResult<BackupMetadata> {
        let now = Utc::now();
        let category = category.unwrap_or_else(|| Self::determine_backup_category(now));

        // Sequenced strictly before the copy so the WAL is folded in.
        let checkpoint = self.checkpoints.checkpoint_before_backup();
        if !checkpoint.success {
            tracing::warn!("pre-backup checkpoint did not complete; copying anyway");
        }

        let dir = self
            .config
            .backup_root
            .join(now.format("%Y").to_string())
            .join(category.dir_name());
        std::fs::create_dir_all(&dir)?;

        let backup_id = Uuid::new_v4().to_string();
        let file_name = format!(
            "archive-{}-{}.db",
            now.format("%Y%m%d-%H%M%S"),
            &backup_id[..8]
        );
        let dest = dir.join(file_name);

        self.engine
            .with_conn(|conn| storage_backup::create_backup(conn, &dest))?;
        let size_bytes = std::fs::metadata(&dest)?.len();

        let metadata = BackupMetadata {
            backup_id,
            category,
            file_path: dest,
            timestamp: now,
            size_bytes,
            verified: false,
        };

        let mut manifest = self.lock_manifest()?;
        manifest.backups.push(metadata.clone());
        manifest.last_backup = Some(now);
        let removed = retention::enforce(&mut manifest, &self.config);
        if removed > 0 {
            tracing::info!("retention removed {removed} old backups");
        }
        self.store.save(&manifest)?;

        tracing::info!(
            "created {} backup {} ({} bytes)",
            category.dir_name(),
            metadata.file_path.display(),
            size_bytes
        );
        Ok(metadata)
    }

    /// True when no backup exists yet or the last one is older than the
    /// configured interval.
    pub fn needs_backup(&self) -> bool {
        match self.lock_manifest() {
            Ok(manifest) => match manifest.last_backup {
                Some(last) => Utc::now() - last > self.config.interval(),
                None => true,
            },
            Err(_) => false,
        }
    }

    /// Flip an entry's verified flag after its content was validated.
    /// Called by the integrity checker / recovery system, never by the
    /// scheduler itself. Returns false when the id is unknown.
    pub fn mark_verified(&self, backup_id: &str) -> ReliquaryResult<bool> {
        let mut manifest = self.lock_manifest()?;
        let Some(entry) = manifest
            .backups
            .iter_mut()
            .find(|b| b.backup_id == backup_id)
        else {
            return Ok(false);
        };
        entry.verified = true;
        manifest.last_verification = Some(Utc::now());
        self.store.save(&manifest)?;
        Ok(true)
    }

    /// End-of-day step: daily entries not from the current calendar day are
    /// demoted into the recent category (files moved alongside), then
    /// retention runs. Returns the number of entries demoted.
    pub fn demote_daily(&self) -> ReliquaryResult<usize> {
        let today = Utc::now().date_naive();
        let mut manifest = self.lock_manifest()?;
        let mut demoted = 0;

        for entry in &mut manifest.backups {
            if entry.category != BackupCategory::Daily
                || entry.timestamp.date_naive() == today
            {
                continue;
            }
            let dir = self
                .config
                .backup_root
                .join(entry.timestamp.format("%Y").to_string())
                .join(BackupCategory::Recent.dir_name());
            std::fs::create_dir_all(&dir)?;
            let dest = match entry.file_path.file_name() {
                Some(name) => dir.join(name),
                None => continue,
            };
            if let Err(e) = std::fs::rename(&entry.file_path, &dest) {
                tracing::warn!(
                    "demotion: failed to move {}: {e}",
                    entry.file_path.display()
                );
                continue;
            }
            entry.category = BackupCategory::Recent;
            entry.file_path = dest;
            demoted += 1;
        }

        if demoted > 0 {
            retention::enforce(&mut manifest, &self.config);
            self.store.save(&manifest)?;
            tracing::info!("demoted {demoted} daily backups to recent");
        }
        Ok(demoted)
    }

    /// Snapshot of the manifest.
    pub fn manifest(&self) -> BackupManifest {
        self.lock_manifest()
            .map(|g| g.clone())
            .unwrap_or_default()
    }

    fn lock_manifest(&self) -> ReliquaryResult<MutexGuard<'_, BackupManifest>> {
        self.manifest.lock().map_err(|e| {
            StorageError::LockPoisoned {
                context: format!("backup manifest: {e}"),
            }
            .into()
        })
    }
}
