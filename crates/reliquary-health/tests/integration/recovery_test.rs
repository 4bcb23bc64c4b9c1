use tempfile::TempDir;

use reliquary_core::models::{RecoveryAction, RecoveryState};

use crate::common;

#[test]
fn healthy_database_needs_no_recovery() {
    let dir = TempDir::new().unwrap();
    let engine = common::open_populated(dir.path(), 10).unwrap();
    let (_checkpoints, backups) = common::backup_stack(dir.path(), &engine);
    let recovery = common::recovery_system(dir.path(), &engine, &backups, 3, 300);

    assert!(recovery.check_and_recover().is_none());
    assert!(!recovery.is_read_only());
}

#[test]
fn corruption_restores_from_a_verified_backup() {
    let dir = TempDir::new().unwrap();
    let engine = common::open_populated(dir.path(), 25).unwrap();
    let (_checkpoints, backups) = common::backup_stack(dir.path(), &engine);
    let recovery = common::recovery_system(dir.path(), &engine, &backups, 3, 300);

    let meta = backups.create_backup(None).unwrap();
    backups.mark_verified(&meta.backup_id).unwrap();

    common::corrupt(&engine);

    let result = recovery.check_and_recover().expect("corruption detected");
    assert!(result.success);
    assert_eq!(result.action, RecoveryAction::BackupRestored);
    assert_eq!(result.backup_used.as_deref(), Some(meta.backup_id.as_str()));

    // Data is back and the state machine is fully reset.
    assert_eq!(common::count_items(&engine).unwrap(), 25);
    assert_eq!(recovery.state(), RecoveryState::initial());
}

#[test]
fn unverified_backup_is_verified_on_the_fly_during_recovery() {
    let dir = TempDir::new().unwrap();
    let engine = common::open_populated(dir.path(), 8).unwrap();
    let (_checkpoints, backups) = common::backup_stack(dir.path(), &engine);
    let recovery = common::recovery_system(dir.path(), &engine, &backups, 3, 300);

    let meta = backups.create_backup(None).unwrap();
    common::corrupt(&engine);

    let result = recovery.attempt_recovery();
    assert!(result.success);
    assert_eq!(result.action, RecoveryAction::BackupRestored);

    // The restore path verified the candidate and recorded it.
    let manifest = backups.manifest();
    let entry = manifest
        .backups
        .iter()
        .find(|b| b.backup_id == meta.backup_id)
        .unwrap();
    assert!(entry.verified);
}

#[test]
fn no_backups_means_read_only_mode_until_manual_exit() {
    let dir = TempDir::new().unwrap();
    let engine = common::open_populated(dir.path(), 5).unwrap();
    let (_checkpoints, backups) = common::backup_stack(dir.path(), &engine);
    let recovery = common::recovery_system(dir.path(), &engine, &backups, 3, 0);

    common::corrupt(&engine);

    let result = recovery.attempt_recovery();
    assert!(!result.success);
    assert_eq!(result.action, RecoveryAction::ReadOnlyMode);
    assert!(recovery.is_read_only());

    let state = recovery.state();
    assert_eq!(state.recovery_attempt_count, 1);
    assert!(state.last_recovery_attempt.is_some());

    recovery.exit_read_only_mode();
    assert_eq!(recovery.state(), RecoveryState::initial());
}

#[test]
fn attempts_are_bounded_and_the_counter_stops_moving() {
    let dir = TempDir::new().unwrap();
    let engine = common::open_populated(dir.path(), 5).unwrap();
    let (_checkpoints, backups) = common::backup_stack(dir.path(), &engine);
    let recovery = common::recovery_system(dir.path(), &engine, &backups, 2, 0);

    common::corrupt(&engine);

    for _ in 0..2 {
        let result = recovery.attempt_recovery();
        assert!(!result.success);
        assert_eq!(result.action, RecoveryAction::ReadOnlyMode);
    }
    assert_eq!(recovery.state().recovery_attempt_count, 2);
    assert!(!recovery.state().can_attempt_recovery);

    // Past the limit: refused without touching the counter.
    let refused = recovery.attempt_recovery();
    assert!(!refused.success);
    assert_eq!(refused.action, RecoveryAction::None);
    assert_eq!(recovery.state().recovery_attempt_count, 2);
}

#[test]
fn cooldown_rejects_a_back_to_back_attempt() {
    let dir = TempDir::new().unwrap();
    let engine = common::open_populated(dir.path(), 5).unwrap();
    let (_checkpoints, backups) = common::backup_stack(dir.path(), &engine);
    let recovery = common::recovery_system(dir.path(), &engine, &backups, 3, 300);

    common::corrupt(&engine);

    let first = recovery.attempt_recovery();
    assert_eq!(first.action, RecoveryAction::ReadOnlyMode);
    assert_eq!(recovery.state().recovery_attempt_count, 1);

    let second = recovery.attempt_recovery();
    assert!(!second.success);
    assert_eq!(second.action, RecoveryAction::None);
    assert_eq!(recovery.state().recovery_attempt_count, 1);
}

#[test]
fn clean_full_check_is_a_false_alarm_and_resets_state() {
    let dir = TempDir::new().unwrap();
    let engine = common::open_populated(dir.path(), 5).unwrap();
    let (_checkpoints, backups) = common::backup_stack(dir.path(), &engine);
    let recovery = common::recovery_system(dir.path(), &engine, &backups, 3, 300);

    let result = recovery.attempt_recovery();
    assert!(result.success);
    assert_eq!(result.action, RecoveryAction::None);
    assert_eq!(recovery.state(), RecoveryState::initial());
}

#[test]
fn emergency_backup_copies_the_live_file() {
    let dir = TempDir::new().unwrap();
    let engine = common::open_populated(dir.path(), 5).unwrap();
    let (_checkpoints, backups) = common::backup_stack(dir.path(), &engine);
    let recovery = common::recovery_system(dir.path(), &engine, &backups, 3, 300);

    let result = recovery.create_emergency_backup();
    assert!(result.success);
    assert_eq!(result.action, RecoveryAction::EmergencyBackup);

    let copies: Vec<_> = std::fs::read_dir(dir.path().join("emergency"))
        .unwrap()
        .collect();
    assert_eq!(copies.len(), 1);
}
