use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Whether VACUUM / ANALYZE are due, with their last-run stamps.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct MaintenanceStatus {
    pub last_vacuum: Option<DateTime<Utc>>,
    pub last_analyze: Option<DateTime<Utc>>,
    pub vacuum_due: bool,
    pub analyze_due: bool,
}
