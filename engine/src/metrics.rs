//! Prometheus metrics for PUTKI

use crate::error::{EngineError, Result};
use prometheus::{
    register_counter_vec, register_gauge, register_histogram_vec, CounterVec, Encoder, Gauge,
    HistogramVec, TextEncoder,
};
use std::sync::OnceLock;

/// Global metrics instance
static METRICS: OnceLock<Metrics> = OnceLock::new();

/// All PUTKI metrics
pub struct Metrics {
    /// Polls performed (by source, outcome)
    pub polls_total: CounterVec,

    /// Poll duration in seconds (by source)
    pub poll_duration_seconds: HistogramVec,

    /// Deliveries handed to consumers (by source, sink, outcome)
    pub deliveries_total: CounterVec,

    /// Deliveries dropped before reaching the consumer (by sink, reason)
    pub deliveries_dropped_total: CounterVec,

    /// Producer tasks currently running
    pub producers_active: Gauge,

    /// Consumer tasks currently running
    pub consumers_active: Gauge,

    /// Throttle cache lookups (by outcome: hit/miss)
    pub throttle_calls_total: CounterVec,
}

impl Metrics {
    /// Initialize metrics (call once at startup)
    ///
    /// Returns error if metric registration fails.
    #[allow(clippy::result_large_err)]
    pub fn init() -> Result<&'static Metrics> {
        if let Some(metrics) = METRICS.get() {
            return Ok(metrics);
        }

        let metrics = Metrics {
            polls_total: register_counter_vec!(
                "putki_polls_total",
                "Total poll attempts per pull plugin",
                &["source", "outcome"]
            )
            .map_err(|e| EngineError::Metrics(format!("polls_total: {e}")))?,

            poll_duration_seconds: register_histogram_vec!(
                "putki_poll_duration_seconds",
                "Time spent inside a pull plugin's poll call",
                &["source"],
                vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 30.0]
            )
            .map_err(|e| EngineError::Metrics(format!("poll_duration_seconds: {e}")))?,

            deliveries_total: register_counter_vec!(
                "putki_deliveries_total",
                "Total deliveries per producer/consumer edge",
                &["source", "sink", "outcome"]
            )
            .map_err(|e| EngineError::Metrics(format!("deliveries_total: {e}")))?,

            deliveries_dropped_total: register_counter_vec!(
                "putki_deliveries_dropped_total",
                "Deliveries dropped before reaching the consumer",
                &["sink", "reason"]
            )
            .map_err(|e| EngineError::Metrics(format!("deliveries_dropped_total: {e}")))?,

            producers_active: register_gauge!(
                "putki_producers_active",
                "Number of running producer tasks"
            )
            .map_err(|e| EngineError::Metrics(format!("producers_active: {e}")))?,

            consumers_active: register_gauge!(
                "putki_consumers_active",
                "Number of running consumer tasks"
            )
            .map_err(|e| EngineError::Metrics(format!("consumers_active: {e}")))?,

            throttle_calls_total: register_counter_vec!(
                "putki_throttle_calls_total",
                "Throttle cache lookups by outcome",
                &["outcome"]
            )
            .map_err(|e| EngineError::Metrics(format!("throttle_calls_total: {e}")))?,
        };

        // Set the metrics (only succeeds once)
        let _ = METRICS.set(metrics);

        METRICS
            .get()
            .ok_or_else(|| EngineError::Metrics("failed to initialize metrics".to_string()))
    }

    /// Get the global metrics instance
    ///
    /// Returns None if metrics haven't been initialized yet.
    pub fn get() -> Option<&'static Metrics> {
        METRICS.get()
    }

    /// Record a poll attempt and its outcome
    pub fn record_poll(&self, source: &str, ok: bool, duration: std::time::Duration) {
        let outcome = if ok { "ok" } else { "error" };
        self.polls_total.with_label_values(&[source, outcome]).inc();
        self.poll_duration_seconds
            .with_label_values(&[source])
            .observe(duration.as_secs_f64());
    }

    /// Record a delivery attempt on one edge
    pub fn record_delivery(&self, source: &str, sink: &str, ok: bool) {
        let outcome = if ok { "ok" } else { "error" };
        self.deliveries_total
            .with_label_values(&[source, sink, outcome])
            .inc();
    }

    /// Record a delivery dropped before the consumer saw it
    pub fn record_dropped(&self, sink: &str, reason: &str) {
        self.deliveries_dropped_total
            .with_label_values(&[sink, reason])
            .inc();
    }

    /// Record a throttle cache lookup
    pub fn record_throttle(&self, hit: bool) {
        let outcome = if hit { "hit" } else { "miss" };
        self.throttle_calls_total
            .with_label_values(&[outcome])
            .inc();
    }

    /// Track producer task lifecycle
    pub fn producer_started(&self) {
        self.producers_active.inc();
    }

    /// Producer task finished or died
    pub fn producer_stopped(&self) {
        self.producers_active.dec();
    }

    /// Track consumer task lifecycle
    pub fn consumer_started(&self) {
        self.consumers_active.inc();
    }

    /// Consumer task finished or died
    pub fn consumer_stopped(&self) {
        self.consumers_active.dec();
    }
}

/// Gather all metrics and encode as Prometheus text format
///
/// Returns the metrics as a String, ready to be served over HTTP by the
/// embedding application.
pub fn gather() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if encoder.encode(&metric_families, &mut buffer).is_ok() {
        String::from_utf8(buffer).unwrap_or_default()
    } else {
        String::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_init() {
        // Metrics::init() may fail if already initialized from another test
        // so we just check get() works after any successful init
        let _ = Metrics::init();
        if let Some(metrics) = Metrics::get() {
            metrics.record_poll("ticker", true, std::time::Duration::from_millis(2));
            metrics.record_delivery("ticker", "stdout", true);
            metrics.record_dropped("stdout", "queue_full");
            metrics.record_throttle(true);
        }
    }

    #[test]
    fn test_gather_renders_text_format() {
        let _ = Metrics::init();
        if Metrics::get().is_some() {
            if let Some(metrics) = Metrics::get() {
                metrics.record_poll("probe", true, std::time::Duration::from_millis(1));
            }
            let text = gather();
            assert!(text.contains("putki_polls_total"));
        }
    }

    #[test]
    fn test_task_gauges() {
        let _ = Metrics::init();
        if let Some(metrics) = Metrics::get() {
            metrics.producer_started();
            metrics.consumer_started();
            metrics.producer_stopped();
            metrics.consumer_stopped();
        }
    }
}
