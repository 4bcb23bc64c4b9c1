use std::sync::Arc;

use tempfile::TempDir;

use reliquary_core::config::CheckpointConfig;
use reliquary_core::models::CheckpointMode;
use reliquary_health::checkpoint::WalCheckpointScheduler;

use crate::common;

fn scheduler(
    engine: &Arc<reliquary_storage::StorageEngine>,
    config: CheckpointConfig,
) -> WalCheckpointScheduler {
    WalCheckpointScheduler::new(Arc::clone(engine), config)
}

#[test]
fn truncate_checkpoint_resets_the_wal_file() {
    let dir = TempDir::new().unwrap();
    let engine = common::open_populated(dir.path(), 200).unwrap();
    let wal = engine.wal_path().unwrap();
    assert!(std::fs::metadata(&wal).unwrap().len() > 0);

    let scheduler = scheduler(&engine, CheckpointConfig::default());
    let result = scheduler.run_checkpoint(CheckpointMode::Truncate);

    assert!(result.success);
    assert!(!result.skipped);
    assert!(result.checkpointed_pages >= 0);
    assert_eq!(std::fs::metadata(&wal).unwrap().len(), 0);

    let stats = scheduler.wal_stats();
    assert_eq!(stats.wal_size_bytes, 0);
    assert!(stats.last_checkpoint.is_some());
}

#[test]
fn passive_checkpoint_succeeds_on_a_quiet_database() {
    let dir = TempDir::new().unwrap();
    let engine = common::open_populated(dir.path(), 10).unwrap();
    let scheduler = scheduler(&engine, CheckpointConfig::default());

    let result = scheduler.run_checkpoint(CheckpointMode::Passive);
    assert!(result.success);
    assert_eq!(result.mode, CheckpointMode::Passive);
}

#[test]
fn checkpoint_on_a_closed_engine_reports_failure() {
    let dir = TempDir::new().unwrap();
    let engine = common::open_populated(dir.path(), 5).unwrap();
    let scheduler = scheduler(&engine, CheckpointConfig::default());
    engine.close().unwrap();

    let result = scheduler.run_checkpoint(CheckpointMode::Passive);
    assert!(!result.success);
    assert!(!result.skipped);
}

#[test]
fn needs_checkpoint_follows_the_size_threshold() {
    let dir = TempDir::new().unwrap();
    let engine = common::open_populated(dir.path(), 100).unwrap();

    let tight = scheduler(
        &engine,
        CheckpointConfig {
            wal_size_threshold_bytes: 1,
            ..CheckpointConfig::default()
        },
    );
    assert!(tight.needs_checkpoint());

    let loose = scheduler(
        &engine,
        CheckpointConfig {
            wal_size_threshold_bytes: u64::MAX,
            ..CheckpointConfig::default()
        },
    );
    assert!(!loose.needs_checkpoint());
}

#[tokio::test]
async fn shutdown_cancels_the_idle_monitor() {
    let dir = TempDir::new().unwrap();
    let engine = common::open_populated(dir.path(), 5).unwrap();
    let scheduler = Arc::new(scheduler(
        &engine,
        CheckpointConfig {
            startup_delay_secs: 3600,
            idle_interval_secs: 3600,
            ..CheckpointConfig::default()
        },
    ));

    scheduler.initialize();
    scheduler.shutdown().await;
    // A second shutdown is a no-op.
    scheduler.shutdown().await;
}
