use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of a structural validation pass. Never carries an error out of
/// the checker; unreadable files are reported through `errors`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntegrityResult {
    pub is_healthy: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

impl IntegrityResult {
    pub fn healthy() -> Self {
        Self {
            is_healthy: true,
            errors: Vec::new(),
            warnings: Vec::new(),
            timestamp: Utc::now(),
        }
    }

    pub fn unhealthy(errors: Vec<String>) -> Self {
        Self {
            is_healthy: false,
            errors,
            warnings: Vec::new(),
            timestamp: Utc::now(),
        }
    }

    /// Seconds since this result was computed.
    pub fn age_secs(&self) -> i64 {
        (Utc::now() - self.timestamp).num_seconds()
    }
}
