//! Pull adapter - one task per producer
//!
//! Drives one pull plugin on its schedule, fans successful polls out to
//! the wired consumers, and retires itself when the schedule exhausts,
//! shutdown is signalled, or the plugin fails too many times in a row.
//!
//! Polls never overlap: the next delay is computed from the previous
//! poll's start, and the poll itself is awaited inline. A poll that
//! overruns its interval defers the next fire (zero delay), it never
//! drops it.

use super::{AdapterExit, AdapterReport, Delivery, Edge};
use crate::metrics::Metrics;
use crate::schedule::Schedule;
use putki_core::{Payload, PluginError, Pull, Routed};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::Instant;
use tracing::{debug, info, warn};
use ulid::Ulid;

pub(super) struct PullAdapter {
    pub(super) plugin: Arc<dyn Pull>,
    pub(super) schedule: Schedule,
    pub(super) edges: Vec<Edge>,
    pub(super) shutdown: watch::Receiver<bool>,
    pub(super) poll_timeout: Option<Duration>,
    pub(super) max_consecutive_failures: u32,
}

impl PullAdapter {
    pub(super) async fn run(mut self) -> AdapterReport {
        let name = self.plugin.identity().name().to_string();
        info!(source = %name, edges = self.edges.len(), "producer started");

        if let Some(metrics) = Metrics::get() {
            metrics.producer_started();
        }

        let mut last_run: Option<Instant> = None;
        let mut polls = 0u64;
        let mut failures = 0u64;
        let mut consecutive_failures = 0u32;

        let exit = loop {
            let Some(delay) = self.schedule.next_delay(last_run) else {
                debug!(source = %name, "schedule exhausted");
                break AdapterExit::Completed;
            };

            // Biased so a pending shutdown always beats a due tick; with
            // an overrun (zero delay) both branches are ready at once and
            // an unbiased pick could keep starting new polls.
            tokio::select! {
                biased;

                changed = self.shutdown.changed() => {
                    // A dropped sender means the engine is gone; treat it
                    // the same as an explicit shutdown.
                    if changed.is_err() || *self.shutdown.borrow() {
                        break AdapterExit::Completed;
                    }
                    continue;
                }
                _ = tokio::time::sleep(delay) => {}
            }

            // Fire time is the poll's start, so intervals are spaced
            // start-to-start regardless of how long the poll takes.
            let started = Instant::now();
            last_run = Some(started);
            polls += 1;

            let result = self.poll_once().await;
            if let Some(metrics) = Metrics::get() {
                metrics.record_poll(&name, result.is_ok(), started.elapsed());
            }

            match result {
                Ok(payload) => {
                    consecutive_failures = 0;
                    self.fan_out(&name, payload);
                }
                Err(e) => {
                    failures += 1;
                    consecutive_failures += 1;
                    warn!(
                        source = %name,
                        error = %e,
                        consecutive = consecutive_failures,
                        "poll failed"
                    );
                    // Budget of 0 means never retire
                    if self.max_consecutive_failures > 0
                        && consecutive_failures >= self.max_consecutive_failures
                    {
                        break AdapterExit::Fatal {
                            reason: format!(
                                "{consecutive_failures} consecutive poll failures, last: {e}"
                            ),
                        };
                    }
                }
            }
        };

        if let Err(e) = self.plugin.shutdown().await {
            warn!(source = %name, error = %e, "producer shutdown error");
        }

        if let Some(metrics) = Metrics::get() {
            metrics.producer_stopped();
        }

        info!(source = %name, polls, failures, "producer stopped");
        AdapterReport {
            name,
            processed: polls,
            failed: failures,
            exit,
        }
    }

    async fn poll_once(&self) -> Result<Payload, PluginError> {
        let call = self.plugin.poll();
        match self.poll_timeout {
            Some(limit) => match tokio::time::timeout(limit, call).await {
                Ok(result) => result,
                Err(_) => Err(PluginError::Timeout(limit)),
            },
            None => call.await,
        }
    }

    /// Hand one polled payload to every wired consumer
    ///
    /// Each edge gets its own copy, runs its own transform, and fails
    /// independently. A full or closed consumer queue drops the delivery
    /// for that edge only.
    fn fan_out(&self, source: &str, payload: Payload) {
        for edge in &self.edges {
            let payload = payload.clone();

            let transformed = match &edge.transform {
                Some(transform) => match transform.apply(payload) {
                    Ok(Some(p)) => p,
                    Ok(None) => {
                        debug!(
                            source = %source,
                            sink = %edge.sink,
                            transform = transform.name(),
                            "delivery filtered by transform"
                        );
                        if let Some(metrics) = Metrics::get() {
                            metrics.record_dropped(&edge.sink, "transform_filtered");
                        }
                        continue;
                    }
                    Err(e) => {
                        warn!(
                            source = %source,
                            sink = %edge.sink,
                            transform = transform.name(),
                            error = %e,
                            "transform failed"
                        );
                        if let Some(metrics) = Metrics::get() {
                            metrics.record_dropped(&edge.sink, "transform_error");
                        }
                        continue;
                    }
                },
                None => payload,
            };

            // The envelope shape check happens exactly once, here.
            let (data, overrides) = Routed::from_payload(transformed).split();
            let delivery = Delivery {
                id: Ulid::new(),
                source: source.to_string(),
                payload: data,
                overrides,
            };

            match edge.tx.try_send(delivery) {
                Ok(()) => {}
                Err(mpsc::error::TrySendError::Full(d)) => {
                    warn!(
                        source = %source,
                        sink = %edge.sink,
                        id = %d.id,
                        "consumer queue full, delivery dropped"
                    );
                    if let Some(metrics) = Metrics::get() {
                        metrics.record_dropped(&edge.sink, "queue_full");
                    }
                }
                Err(mpsc::error::TrySendError::Closed(d)) => {
                    warn!(
                        source = %source,
                        sink = %edge.sink,
                        id = %d.id,
                        "consumer gone, delivery dropped"
                    );
                    if let Some(metrics) = Metrics::get() {
                        metrics.record_dropped(&edge.sink, "consumer_gone");
                    }
                }
            }
        }
    }
}
