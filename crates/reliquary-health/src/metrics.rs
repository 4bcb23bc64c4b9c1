//! Rolling-window operation metrics with persisted daily summaries.
//!
//! Samples live in a fixed-size FIFO ring per operation. The daily
//! snapshot is upserted into a 30-day capped JSON history; persistence
//! failures are logged and never disturb the in-memory state.

use std::collections::{HashMap, VecDeque};
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use chrono::{DateTime, Utc};

use reliquary_core::config::MetricsConfig;
use reliquary_core::models::{
    DailyMetrics, MetricAlert, MetricsSummary, OperationMetric, SystemMetrics,
};
use reliquary_core::{constants, ReliquaryResult};

/// Operation-name prefixes counted as read/query-like for the system view.
const READ_PREFIXES: [&str; 2] = ["read", "query"];

pub struct MetricsCollector {
    config: MetricsConfig,
    samples: Mutex<HashMap<String, VecDeque<OperationMetric>>>,
    startup: Mutex<Option<(DateTime<Utc>, u64)>>,
    history_path: PathBuf,
}

/// In-flight timer handed out by [`MetricsCollector::start_timer`].
/// Consuming `stop` guarantees the sample is recorded exactly once.
pub struct MetricTimer<'a> {
    collector: &'a MetricsCollector,
    operation: String,
    started: Instant,
    metadata: Option<serde_json::Value>,
}

impl MetricTimer<'_> {
    /// Record the elapsed time with the given success flag.
    pub fn stop(self, success: bool) {
        let Self {
            collector,
            operation,
            started,
            metadata,
        } = self;
        collector.record(
            &operation,
            started.elapsed().as_millis() as u64,
            success,
            metadata,
        );
    }
}

impl MetricsCollector {
    pub fn new(config: MetricsConfig) -> Self {
        let history_path = config
            .metrics_dir
            .join(constants::METRICS_HISTORY_FILE_NAME);
        Self {
            config,
            samples: Mutex::new(HashMap::new()),
            startup: Mutex::new(None),
            history_path,
        }
    }

    /// Ensure the metrics directory exists.
    pub fn initialize(&self) -> ReliquaryResult<()> {
        std::fs::create_dir_all(&self.config.metrics_dir)?;
        Ok(())
    }

    pub fn config(&self) -> &MetricsConfig {
        &self.config
    }

    /// Append a sample to the operation's ring, evicting oldest-first past
    /// the window capacity.
    pub fn record(
        &self,
        operation: &str,
        duration_ms: u64,
        success: bool,
        metadata: Option<serde_json::Value>,
    ) {
        if duration_ms > self.config.slow_op_threshold_ms {
            tracing::warn!("slow operation {operation}: {duration_ms}ms");
        }
        let mut samples = self.lock_samples();
        let ring = samples.entry(operation.to_string()).or_default();
        ring.push_back(OperationMetric {
            duration_ms,
            success,
            timestamp: Utc::now(),
            metadata,
        });
        while ring.len() > self.config.window {
            ring.pop_front();
        }
    }

    /// Start timing an operation.
    pub fn start_timer(&self, operation: &str) -> MetricTimer<'_> {
        self.start_timer_with(operation, None)
    }

    /// Start timing an operation, attaching metadata to the sample.
    pub fn start_timer_with(
        &self,
        operation: &str,
        metadata: Option<serde_json::Value>,
    ) -> MetricTimer<'_> {
        MetricTimer {
            collector: self,
            operation: operation.to_string(),
            started: Instant::now(),
            metadata,
        }
    }

    /// Record the total startup duration once initialization finishes.
    pub fn record_startup(&self, duration_ms: u64) {
        let mut startup = self.startup.lock().unwrap_or_else(PoisonError::into_inner);
        *startup = Some((Utc::now(), duration_ms));
    }

    /// Aggregate one operation's window.
    pub fn summary(&self, operation: &str) -> Option<MetricsSummary> {
        let samples = self.lock_samples();
        samples
            .get(operation)
            .and_then(|ring| Self::summarize(operation, ring))
    }

    /// Aggregate every operation's window, sorted by operation name.
    pub fn all_summaries(&self) -> Vec<MetricsSummary> {
        let samples = self.lock_samples();
        let mut summaries: Vec<MetricsSummary> = samples
            .iter()
            .filter_map(|(op, ring)| Self::summarize(op, ring))
            .collect();
        summaries.sort_by(|a, b| a.operation.cmp(&b.operation));
        summaries
    }

    /// Whole-process view for the performance component check.
    pub fn system_metrics(&self) -> SystemMetrics {
        let samples = self.lock_samples();
        let mut total_samples = 0;
        let mut slow_op_count = 0;
        let mut error_count = 0;
        let mut read_total_ms: u64 = 0;
        let mut read_count = 0;
        for (operation, ring) in samples.iter() {
            total_samples += ring.len();
            for sample in ring {
                if sample.duration_ms > self.config.slow_op_threshold_ms {
                    slow_op_count += 1;
                }
                if !sample.success {
                    error_count += 1;
                }
                if READ_PREFIXES.iter().any(|p| operation.starts_with(p)) {
                    read_total_ms += sample.duration_ms;
                    read_count += 1;
                }
            }
        }
        let (startup_at, startup_duration_ms) = self
            .startup
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .map(|(at, ms)| (Some(at), Some(ms)))
            .unwrap_or((None, None));
        SystemMetrics {
            startup_at,
            startup_duration_ms,
            total_samples,
            avg_read_duration_ms: if read_count > 0 {
                read_total_ms as f64 / read_count as f64
            } else {
                0.0
            },
            slow_op_count,
            error_count,
        }
    }

    /// Upsert today's snapshot into the capped on-disk history. In-memory
    /// metrics are untouched when the write fails.
    pub fn persist_daily(&self) -> ReliquaryResult<()> {
        let today = Utc::now().date_naive();
        let summaries = self.all_summaries();
        let alerts = self.evaluate_alerts();
        let entry = DailyMetrics {
            date: today,
            summaries,
            alerts,
        };

        let mut history: Vec<DailyMetrics> = if self.history_path.exists() {
            serde_json::from_slice(&std::fs::read(&self.history_path)?)?
        } else {
            Vec::new()
        };

        match history.iter_mut().find(|d| d.date == today) {
            Some(existing) => *existing = entry,
            None => history.push(entry),
        }
        history.sort_by_key(|d| d.date);
        while history.len() > self.config.history_days {
            history.remove(0);
        }

        let bytes = serde_json::to_vec_pretty(&history)?;
        let tmp = self.history_path.with_extension("json.tmp");
        std::fs::write(&tmp, bytes)?;
        std::fs::rename(&tmp, &self.history_path)?;
        Ok(())
    }

    /// Load the persisted daily history (empty when missing).
    pub fn history(&self) -> ReliquaryResult<Vec<DailyMetrics>> {
        if !self.history_path.exists() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_slice(&std::fs::read(&self.history_path)?)?)
    }

    fn evaluate_alerts(&self) -> Vec<MetricAlert> {
        let system = self.system_metrics();
        let mut alerts = Vec::new();
        if system.slow_op_count > self.config.alert_slow_ops {
            alerts.push(MetricAlert {
                message: format!("{} slow operations in window", system.slow_op_count),
                value: system.slow_op_count as f64,
                threshold: self.config.alert_slow_ops as f64,
            });
        }
        if system.error_count > self.config.alert_errors {
            alerts.push(MetricAlert {
                message: format!("{} failed operations in window", system.error_count),
                value: system.error_count as f64,
                threshold: self.config.alert_errors as f64,
            });
        }
        let samples = self.lock_samples();
        let (total_ms, count) = samples.values().flatten().fold((0u64, 0usize), |acc, s| {
            (acc.0 + s.duration_ms, acc.1 + 1)
        });
        if count > 0 {
            let avg = total_ms as f64 / count as f64;
            if avg > self.config.alert_avg_duration_ms {
                alerts.push(MetricAlert {
                    message: format!("average operation duration {avg:.0}ms"),
                    value: avg,
                    threshold: self.config.alert_avg_duration_ms,
                });
            }
        }
        alerts
    }

    fn summarize(operation: &str, ring: &VecDeque<OperationMetric>) -> Option<MetricsSummary> {
        let last = ring.back()?;
        let count = ring.len();
        let total: u64 = ring.iter().map(|s| s.duration_ms).sum();
        let successes = ring.iter().filter(|s| s.success).count();
        Some(MetricsSummary {
            operation: operation.to_string(),
            count,
            avg_duration_ms: total as f64 / count as f64,
            min_duration_ms: ring.iter().map(|s| s.duration_ms).min().unwrap_or(0),
            max_duration_ms: ring.iter().map(|s| s.duration_ms).max().unwrap_or(0),
            success_rate: successes as f64 / count as f64,
            last_run: last.timestamp,
        })
    }

    fn lock_samples(&self) -> MutexGuard<'_, HashMap<String, VecDeque<OperationMetric>>> {
        self.samples.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
