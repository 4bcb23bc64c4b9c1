use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Process-lifetime recovery state snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RecoveryState {
    pub is_in_read_only_mode: bool,
    pub last_recovery_attempt: Option<DateTime<Utc>>,
    pub recovery_attempt_count: u32,
    pub can_attempt_recovery: bool,
}

impl RecoveryState {
    /// State of a healthy system that has never attempted recovery.
    pub fn initial() -> Self {
        Self {
            is_in_read_only_mode: false,
            last_recovery_attempt: None,
            recovery_attempt_count: 0,
            can_attempt_recovery: true,
        }
    }
}

/// What a recovery attempt ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecoveryAction {
    None,
    BackupRestored,
    ReadOnlyMode,
    EmergencyBackup,
}

/// Outcome of a recovery attempt, surfaced to the user-notification layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecoveryResult {
    pub success: bool,
    pub action: RecoveryAction,
    pub message: String,
    pub backup_used: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub duration_ms: u64,
}

impl RecoveryResult {
    pub fn new(success: bool, action: RecoveryAction, message: impl Into<String>) -> Self {
        Self {
            success,
            action,
            message: message.into(),
            backup_used: None,
            timestamp: Utc::now(),
            duration_ms: 0,
        }
    }
}
