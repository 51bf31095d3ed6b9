//! Request outcome aggregation

use chrono::{DateTime, Utc};
use hdrhistogram::Histogram;
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::warn;

/// Receives one entry per issued request
pub trait MetricsSink: Send + Sync {
    fn record(&self, label: &str, status: u16, duration: Duration);
}

/// Status 0 (no response) and every 4xx/5xx count as failures
pub fn is_failure(status: u16) -> bool {
    status == 0 || status >= 400
}

/// One request as seen by the metrics sink
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordedOutcome {
    pub label: String,
    pub status: u16,
    pub duration: Duration,
}

impl RecordedOutcome {
    pub fn new(label: impl Into<String>, status: u16, duration: Duration) -> Self {
        Self {
            label: label.into(),
            status,
            duration,
        }
    }

    pub fn is_failure(&self) -> bool {
        is_failure(self.status)
    }
}

struct LabelStats {
    requests: u64,
    failures: u64,
    status_codes: BTreeMap<u16, u64>,
    // microseconds
    latencies: Option<Histogram<u64>>,
}

impl LabelStats {
    fn new() -> Self {
        Self {
            requests: 0,
            failures: 0,
            status_codes: BTreeMap::new(),
            // 3 significant digits of precision
            latencies: Histogram::new(3).ok(),
        }
    }

    fn record(&mut self, status: u16, duration: Duration) {
        self.requests += 1;
        if is_failure(status) {
            self.failures += 1;
        }
        *self.status_codes.entry(status).or_default() += 1;

        if let Some(ref mut hist) = self.latencies {
            let micros = duration.as_micros().min(u128::from(u64::MAX)) as u64;
            // auto-resizing, so only a value past u64 range can fail
            if let Err(e) = hist.record(micros) {
                warn!("Dropping latency sample of {}us: {}", micros, e);
            }
        }
    }

    fn latency_stats(&self) -> LatencyStats {
        match self.latencies {
            Some(ref hist) if !hist.is_empty() => LatencyStats {
                min_ms: micros_to_ms(hist.min()),
                mean_ms: hist.mean() / 1000.0,
                p50_ms: micros_to_ms(hist.value_at_quantile(0.50)),
                p95_ms: micros_to_ms(hist.value_at_quantile(0.95)),
                p99_ms: micros_to_ms(hist.value_at_quantile(0.99)),
                max_ms: micros_to_ms(hist.max()),
            },
            _ => LatencyStats::default(),
        }
    }
}

fn micros_to_ms(value: u64) -> f64 {
    value as f64 / 1000.0
}

/// Thread-safe per-label aggregation shared by every user of a run
#[derive(Clone)]
pub struct MetricsCollector {
    labels: Arc<RwLock<BTreeMap<String, LabelStats>>>,
    start_time: Instant,
    started_at: DateTime<Utc>,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self {
            labels: Arc::new(RwLock::new(BTreeMap::new())),
            start_time: Instant::now(),
            started_at: Utc::now(),
        }
    }

    /// `(requests, failures)` over all labels
    pub fn totals(&self) -> (u64, u64) {
        self.labels
            .read()
            .values()
            .fold((0, 0), |(requests, failures), stats| {
                (requests + stats.requests, failures + stats.failures)
            })
    }

    pub fn requests_for(&self, label: &str) -> u64 {
        self.labels
            .read()
            .get(label)
            .map(|stats| stats.requests)
            .unwrap_or(0)
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    pub fn report(&self) -> MetricsReport {
        let labels = self.labels.read();
        let elapsed_secs = self.elapsed().as_secs_f64();

        let summaries: Vec<LabelSummary> = labels
            .iter()
            .map(|(label, stats)| LabelSummary {
                label: label.clone(),
                requests: stats.requests,
                failures: stats.failures,
                status_codes: stats.status_codes.clone(),
                latency: stats.latency_stats(),
            })
            .collect();

        let total_requests = summaries.iter().map(|s| s.requests).sum();
        let total_failures = summaries.iter().map(|s| s.failures).sum();

        MetricsReport {
            started_at: self.started_at,
            elapsed_secs,
            total_requests,
            total_failures,
            requests_per_second: if elapsed_secs > 0.0 {
                total_requests as f64 / elapsed_secs
            } else {
                0.0
            },
            labels: summaries,
        }
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsSink for MetricsCollector {
    fn record(&self, label: &str, status: u16, duration: Duration) {
        let mut labels = self.labels.write();
        match labels.get_mut(label) {
            Some(stats) => stats.record(status, duration),
            None => {
                let mut stats = LabelStats::new();
                stats.record(status, duration);
                labels.insert(label.to_string(), stats);
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LatencyStats {
    pub min_ms: f64,
    pub mean_ms: f64,
    pub p50_ms: f64,
    pub p95_ms: f64,
    pub p99_ms: f64,
    pub max_ms: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct LabelSummary {
    pub label: String,
    pub requests: u64,
    pub failures: u64,
    pub status_codes: BTreeMap<u16, u64>,
    pub latency: LatencyStats,
}

impl LabelSummary {
    pub fn failure_rate(&self) -> f64 {
        if self.requests == 0 {
            0.0
        } else {
            self.failures as f64 / self.requests as f64
        }
    }
}

/// Snapshot of everything recorded so far
#[derive(Debug, Clone, Serialize)]
pub struct MetricsReport {
    pub started_at: DateTime<Utc>,
    pub elapsed_secs: f64,
    pub total_requests: u64,
    pub total_failures: u64,
    pub requests_per_second: f64,
    pub labels: Vec<LabelSummary>,
}

impl MetricsReport {
    pub fn label(&self, label: &str) -> Option<&LabelSummary> {
        self.labels.iter().find(|s| s.label == label)
    }
}
