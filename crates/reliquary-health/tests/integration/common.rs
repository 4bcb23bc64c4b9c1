//! Shared fixtures: a populated on-disk database plus the scheduler stack
//! wired over it with test-friendly intervals.

use std::path::Path;
use std::sync::Arc;

use reliquary_core::config::{BackupConfig, CheckpointConfig, RecoveryConfig};
use reliquary_core::ReliquaryResult;
use reliquary_health::backup::BackupScheduler;
use reliquary_health::checkpoint::WalCheckpointScheduler;
use reliquary_health::integrity::IntegrityChecker;
use reliquary_health::recovery::RecoverySystem;
use reliquary_storage::StorageEngine;

pub fn sql_err(e: rusqlite::Error) -> reliquary_core::ReliquaryError {
    reliquary_core::errors::StorageError::Sqlite {
        message: e.to_string(),
    }
    .into()
}

/// Open `archive.db` under `dir` and seed it with `rows` items.
pub fn open_populated(dir: &Path, rows: usize) -> ReliquaryResult<Arc<StorageEngine>> {
    let engine = StorageEngine::create(&dir.join("archive.db"))?;
    engine.with_conn(|conn| {
        conn.execute_batch(
            "CREATE TABLE items (id INTEGER PRIMARY KEY, name TEXT NOT NULL, body TEXT)",
        )
        .map_err(sql_err)
    })?;
    for i in 0..rows {
        engine.with_conn(|conn| {
            conn.execute(
                "INSERT INTO items (name, body) VALUES (?1, ?2)",
                rusqlite::params![format!("item-{i}"), "x".repeat(256)],
            )
            .map_err(sql_err)
        })?;
    }
    Ok(Arc::new(engine))
}

pub fn count_items(engine: &StorageEngine) -> ReliquaryResult<i64> {
    engine.with_conn(|conn| {
        conn.query_row("SELECT COUNT(*) FROM items", [], |row| row.get(0))
            .map_err(sql_err)
    })
}

pub fn backup_config(dir: &Path) -> BackupConfig {
    BackupConfig {
        backup_root: dir.join("backups"),
        interval_secs: 3600,
        ..BackupConfig::default()
    }
}

pub fn backup_stack(
    dir: &Path,
    engine: &Arc<StorageEngine>,
) -> (Arc<WalCheckpointScheduler>, Arc<BackupScheduler>) {
    let checkpoints = Arc::new(WalCheckpointScheduler::new(
        Arc::clone(engine),
        CheckpointConfig::default(),
    ));
    let backups = Arc::new(BackupScheduler::new(
        Arc::clone(engine),
        Arc::clone(&checkpoints),
        backup_config(dir),
    ));
    backups.initialize().unwrap();
    (checkpoints, backups)
}

pub fn recovery_system(
    dir: &Path,
    engine: &Arc<StorageEngine>,
    backups: &Arc<BackupScheduler>,
    max_attempts: u32,
    cooldown_secs: u64,
) -> RecoverySystem {
    RecoverySystem::new(
        Arc::clone(engine),
        Arc::new(IntegrityChecker::new(Arc::clone(engine))),
        Arc::clone(backups),
        RecoveryConfig {
            max_attempts,
            cooldown_secs,
            emergency_dir: dir.join("emergency"),
        },
    )
}

/// Overwrite the database file with garbage. The engine is left in the
/// closed state; `reopen` on the garbage file fails.
pub fn corrupt(engine: &StorageEngine) {
    let path = engine.db_path().unwrap().to_path_buf();
    engine.close().unwrap();
    std::fs::write(&path, b"not a sqlite database at all").unwrap();
    let _ = engine.reopen();
}
