/// Reliquary system version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// File name of the persisted backup manifest inside the backup root.
pub const MANIFEST_FILE_NAME: &str = "backups.json";

/// File name of the capped daily metrics history inside the metrics dir.
pub const METRICS_HISTORY_FILE_NAME: &str = "daily-metrics.json";

/// File name of the persisted maintenance stamps inside the metrics dir.
pub const MAINTENANCE_STATE_FILE_NAME: &str = "maintenance.json";

/// Suffix SQLite appends to the database path for the write-ahead log.
pub const WAL_SUFFIX: &str = "-wal";

/// Suffix SQLite appends to the database path for the shared-memory index.
pub const SHM_SUFFIX: &str = "-shm";
