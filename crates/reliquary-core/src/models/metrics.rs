use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One timed sample in an operation's rolling window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationMetric {
    pub duration_ms: u64,
    pub success: bool,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

/// In-memory aggregation over one operation's window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSummary {
    pub operation: String,
    pub count: usize,
    pub avg_duration_ms: f64,
    pub min_duration_ms: u64,
    pub max_duration_ms: u64,
    pub success_rate: f64,
    pub last_run: DateTime<Utc>,
}

/// Whole-process view used by the performance component check.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SystemMetrics {
    pub startup_at: Option<DateTime<Utc>>,
    pub startup_duration_ms: Option<u64>,
    pub total_samples: usize,
    /// Average duration across read/query-like operations.
    pub avg_read_duration_ms: f64,
    pub slow_op_count: usize,
    pub error_count: usize,
}

/// A threshold breach found while building a daily snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricAlert {
    pub message: String,
    pub value: f64,
    pub threshold: f64,
}

/// One day's persisted snapshot in the capped history file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyMetrics {
    pub date: NaiveDate,
    pub summaries: Vec<MetricsSummary>,
    pub alerts: Vec<MetricAlert>,
}
