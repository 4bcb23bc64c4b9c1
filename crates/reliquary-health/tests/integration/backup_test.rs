use std::sync::Arc;

use chrono::{Duration, Utc};
use tempfile::TempDir;

use reliquary_core::config::BackupConfig;
use reliquary_core::constants;
use reliquary_core::models::{BackupCategory, BackupManifest, BackupMetadata};
use reliquary_health::backup::BackupScheduler;

use crate::common;

#[test]
fn backup_lands_in_category_directory_and_manifest_persists() {
    let dir = TempDir::new().unwrap();
    let engine = common::open_populated(dir.path(), 20).unwrap();
    let (_checkpoints, backups) = common::backup_stack(dir.path(), &engine);

    let meta = backups
        .create_backup(Some(BackupCategory::Weekly))
        .expect("backup should be created");

    assert_eq!(meta.category, BackupCategory::Weekly);
    assert!(meta.file_path.exists());
    assert!(meta.size_bytes > 0);
    assert!(!meta.verified);
    let parent = meta.file_path.parent().unwrap();
    assert!(parent.ends_with(BackupCategory::Weekly.dir_name()));

    // The manifest file on disk reflects the new entry.
    let raw = std::fs::read_to_string(
        dir.path()
            .join("backups")
            .join(constants::MANIFEST_FILE_NAME),
    )
    .unwrap();
    let persisted: BackupManifest = serde_json::from_str(&raw).unwrap();
    assert_eq!(persisted.backups.len(), 1);
    assert_eq!(persisted.backups[0].backup_id, meta.backup_id);
    assert!(persisted.last_backup.is_some());
}

#[test]
fn backup_copy_is_a_valid_database() {
    let dir = TempDir::new().unwrap();
    let engine = common::open_populated(dir.path(), 12).unwrap();
    let (_checkpoints, backups) = common::backup_stack(dir.path(), &engine);

    let meta = backups.create_backup(None).unwrap();

    let copy = reliquary_storage::StorageEngine::open(&meta.file_path).unwrap();
    assert_eq!(common::count_items(&copy).unwrap(), 12);
}

#[test]
fn needs_backup_clears_after_a_backup() {
    let dir = TempDir::new().unwrap();
    let engine = common::open_populated(dir.path(), 3).unwrap();
    let (_checkpoints, backups) = common::backup_stack(dir.path(), &engine);

    assert!(backups.needs_backup());
    backups.create_backup(None).unwrap();
    assert!(!backups.needs_backup());
}

#[test]
fn mark_verified_flips_flag_and_unknown_id_is_rejected() {
    let dir = TempDir::new().unwrap();
    let engine = common::open_populated(dir.path(), 3).unwrap();
    let (_checkpoints, backups) = common::backup_stack(dir.path(), &engine);

    let meta = backups.create_backup(None).unwrap();
    assert!(backups.mark_verified(&meta.backup_id).unwrap());
    assert!(!backups.mark_verified("no-such-id").unwrap());

    let manifest = backups.manifest();
    assert!(manifest.backups[0].verified);
    assert!(manifest.last_verification.is_some());
}

#[test]
fn retention_caps_a_category_and_deletes_the_oldest_file() {
    let dir = TempDir::new().unwrap();
    let engine = common::open_populated(dir.path(), 5).unwrap();
    let checkpoints = common::backup_stack(dir.path(), &engine).0;
    let backups = Arc::new(BackupScheduler::new(
        Arc::clone(&engine),
        checkpoints,
        BackupConfig {
            cap_daily: 2,
            ..common::backup_config(dir.path())
        },
    ));
    backups.initialize().unwrap();

    let first = backups.create_backup(Some(BackupCategory::Daily)).unwrap();
    backups.create_backup(Some(BackupCategory::Daily)).unwrap();
    backups.create_backup(Some(BackupCategory::Daily)).unwrap();

    let manifest = backups.manifest();
    assert_eq!(manifest.in_category(BackupCategory::Daily).len(), 2);
    assert!(
        !manifest
            .backups
            .iter()
            .any(|b| b.backup_id == first.backup_id),
        "oldest entry should have been evicted"
    );
    assert!(!first.file_path.exists());
}

#[test]
fn stale_daily_backups_demote_to_recent() {
    let dir = TempDir::new().unwrap();
    let engine = common::open_populated(dir.path(), 3).unwrap();
    let root = dir.path().join("backups");

    // Seed a manifest with a daily entry dated two days ago and a real
    // backup file behind it, then let the scheduler load it.
    let yesterday = Utc::now() - Duration::days(2);
    let daily_dir = root
        .join(yesterday.format("%Y").to_string())
        .join(BackupCategory::Daily.dir_name());
    std::fs::create_dir_all(&daily_dir).unwrap();
    let stale_file = daily_dir.join("archive-stale.db");
    std::fs::write(&stale_file, b"payload").unwrap();

    let manifest = BackupManifest {
        backups: vec![BackupMetadata {
            backup_id: "stale".to_string(),
            category: BackupCategory::Daily,
            file_path: stale_file.clone(),
            timestamp: yesterday,
            size_bytes: 7,
            verified: false,
        }],
        last_backup: Some(yesterday),
        last_verification: None,
    };
    std::fs::write(
        root.join(constants::MANIFEST_FILE_NAME),
        serde_json::to_string(&manifest).unwrap(),
    )
    .unwrap();

    let (_checkpoints, backups) = common::backup_stack(dir.path(), &engine);
    assert_eq!(backups.demote_daily().unwrap(), 1);

    let manifest = backups.manifest();
    assert_eq!(manifest.backups[0].category, BackupCategory::Recent);
    assert!(manifest.backups[0].file_path.exists());
    assert!(!stale_file.exists());

    // A second pass finds nothing left to demote.
    assert_eq!(backups.demote_daily().unwrap(), 0);
}

#[test]
fn in_flight_guard_releases_between_runs() {
    let dir = TempDir::new().unwrap();
    let engine = common::open_populated(dir.path(), 3).unwrap();
    let (_checkpoints, backups) = common::backup_stack(dir.path(), &engine);

    assert!(backups.create_backup(None).is_some());
    assert!(backups.create_backup(None).is_some());
    assert_eq!(backups.manifest().backups.len(), 2);
}
