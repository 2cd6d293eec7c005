//! Push adapter - one task per consumer
//!
//! Owns the receiving end of the consumer's delivery channel and feeds
//! deliveries to the plugin one at a time, preserving arrival order. The
//! task exits when every producer holding a sender has dropped it, then
//! gives the plugin its shutdown call.

use super::{AdapterExit, AdapterReport, Delivery};
use crate::metrics::Metrics;
use putki_core::{PluginError, Push};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

pub(super) struct PushAdapter {
    pub(super) plugin: Arc<dyn Push>,
    pub(super) rx: mpsc::Receiver<Delivery>,
    pub(super) push_timeout: Option<Duration>,
}

impl PushAdapter {
    /// Consume deliveries until the channel closes, then shut the plugin down
    ///
    /// A failed delivery is logged and counted; it never stops the task.
    /// Channel closure doubles as the drain signal: producers drop their
    /// senders on shutdown and everything already queued is still
    /// delivered before this task exits.
    pub(super) async fn run(mut self) -> AdapterReport {
        let name = self.plugin.identity().name().to_string();
        info!(sink = %name, "consumer started");

        if let Some(metrics) = Metrics::get() {
            metrics.consumer_started();
        }

        let mut delivered = 0u64;
        let mut failed = 0u64;

        while let Some(delivery) = self.rx.recv().await {
            let result = self.push_one(&delivery).await;
            if let Some(metrics) = Metrics::get() {
                metrics.record_delivery(&delivery.source, &name, result.is_ok());
            }
            match result {
                Ok(()) => {
                    delivered += 1;
                    debug!(
                        sink = %name,
                        source = %delivery.source,
                        id = %delivery.id,
                        "delivered"
                    );
                }
                Err(e) => {
                    failed += 1;
                    warn!(
                        sink = %name,
                        source = %delivery.source,
                        id = %delivery.id,
                        error = %e,
                        "delivery failed"
                    );
                }
            }
        }

        if let Err(e) = self.plugin.shutdown().await {
            warn!(sink = %name, error = %e, "consumer shutdown error");
        }

        if let Some(metrics) = Metrics::get() {
            metrics.consumer_stopped();
        }

        info!(sink = %name, delivered, failed, "consumer stopped");
        AdapterReport {
            name,
            processed: delivered,
            failed,
            exit: AdapterExit::Completed,
        }
    }

    async fn push_one(&self, delivery: &Delivery) -> Result<(), PluginError> {
        let call = self.plugin.push(&delivery.payload, &delivery.overrides);
        match self.push_timeout {
            Some(limit) => match tokio::time::timeout(limit, call).await {
                Ok(result) => result,
                Err(_) => Err(PluginError::Timeout(limit)),
            },
            None => call.await,
        }
    }
}
