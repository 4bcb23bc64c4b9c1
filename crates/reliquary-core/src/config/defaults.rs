//! Default values for every configuration section.

// Backup retention caps per GFS category.
pub const DEFAULT_CAP_YEARLY: usize = 4;
pub const DEFAULT_CAP_MONTHLY: usize = 12;
pub const DEFAULT_CAP_WEEKLY: usize = 4;
pub const DEFAULT_CAP_DAILY: usize = 7;
pub const DEFAULT_CAP_RECENT: usize = 5;

/// Interval between scheduled backups (seconds).
pub const DEFAULT_BACKUP_INTERVAL_SECS: u64 = 86_400;

/// WAL file size above which a checkpoint is due (bytes).
pub const DEFAULT_WAL_SIZE_THRESHOLD_BYTES: u64 = 4 * 1024 * 1024;
/// Interval between idle checkpoint polls (seconds).
pub const DEFAULT_CHECKPOINT_IDLE_INTERVAL_SECS: u64 = 60;
/// Delay before the one-shot startup checkpoint (seconds).
pub const DEFAULT_CHECKPOINT_STARTUP_DELAY_SECS: u64 = 30;

/// Maximum automatic recovery attempts before refusal.
pub const DEFAULT_MAX_RECOVERY_ATTEMPTS: u32 = 3;
/// Cooldown between recovery attempts (seconds).
pub const DEFAULT_RECOVERY_COOLDOWN_SECS: u64 = 300;

/// Samples retained per operation in the rolling window.
pub const DEFAULT_METRICS_WINDOW: usize = 100;
/// Duration above which an operation is logged as slow (milliseconds).
pub const DEFAULT_SLOW_OP_THRESHOLD_MS: u64 = 5_000;
/// Days of daily metric snapshots retained on disk.
pub const DEFAULT_METRICS_HISTORY_DAYS: usize = 30;
/// Daily alert threshold: slow operations.
pub const DEFAULT_ALERT_SLOW_OPS: usize = 10;
/// Daily alert threshold: failed operations.
pub const DEFAULT_ALERT_ERRORS: usize = 5;
/// Daily alert threshold: average duration (milliseconds).
pub const DEFAULT_ALERT_AVG_DURATION_MS: f64 = 1_000.0;

// Disk thresholds: the worse of the byte check and the percent check wins.
pub const DEFAULT_DISK_WARNING_BYTES: u64 = 2 * 1024 * 1024 * 1024;
pub const DEFAULT_DISK_CRITICAL_BYTES: u64 = 1024 * 1024 * 1024;
pub const DEFAULT_DISK_EMERGENCY_BYTES: u64 = 256 * 1024 * 1024;
pub const DEFAULT_DISK_WARNING_PCT: f64 = 80.0;
pub const DEFAULT_DISK_CRITICAL_PCT: f64 = 90.0;
pub const DEFAULT_DISK_EMERGENCY_PCT: f64 = 95.0;

/// Interval between periodic health ticks (seconds).
pub const DEFAULT_MONITOR_TICK_SECS: u64 = 300;
/// Age after which the cached integrity result is refreshed (seconds).
pub const DEFAULT_INTEGRITY_STALE_SECS: u64 = 6 * 3600;

/// Days between VACUUM runs before one is considered due.
pub const DEFAULT_VACUUM_INTERVAL_DAYS: i64 = 7;
/// Days between ANALYZE runs before one is considered due.
pub const DEFAULT_ANALYZE_INTERVAL_DAYS: i64 = 3;
