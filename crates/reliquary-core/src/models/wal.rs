use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Derived-on-demand WAL statistics, never persisted.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WalStats {
    pub wal_size_bytes: u64,
    pub wal_pages: u64,
    pub checkpointed_pages: u64,
    pub last_checkpoint: Option<DateTime<Utc>>,
}

/// SQLite checkpoint mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CheckpointMode {
    Passive,
    Full,
    Restart,
    Truncate,
}

impl CheckpointMode {
    /// Keyword accepted by `PRAGMA wal_checkpoint(...)`.
    pub fn as_sql(self) -> &'static str {
        match self {
            CheckpointMode::Passive => "PASSIVE",
            CheckpointMode::Full => "FULL",
            CheckpointMode::Restart => "RESTART",
            CheckpointMode::Truncate => "TRUNCATE",
        }
    }
}

/// Outcome of a single checkpoint run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CheckpointResult {
    pub success: bool,
    /// True when the call was rejected because another run was in flight.
    pub skipped: bool,
    pub mode: CheckpointMode,
    pub log_pages: i64,
    pub checkpointed_pages: i64,
    pub space_recovered_bytes: u64,
    pub duration_ms: u64,
}

impl CheckpointResult {
    /// Rejected because another checkpoint was in flight.
    pub fn skipped(mode: CheckpointMode) -> Self {
        Self {
            success: false,
            skipped: true,
            mode,
            log_pages: 0,
            checkpointed_pages: 0,
            space_recovered_bytes: 0,
            duration_ms: 0,
        }
    }

    /// Zero-result returned when the engine call failed.
    pub fn failed(mode: CheckpointMode, duration_ms: u64) -> Self {
        Self {
            success: false,
            skipped: false,
            mode,
            log_pages: 0,
            checkpointed_pages: 0,
            space_recovered_bytes: 0,
            duration_ms,
        }
    }
}
