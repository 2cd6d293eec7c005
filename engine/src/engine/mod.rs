//! Engine - wiring, supervision, and graceful shutdown
//!
//! The [`Engine`] is a consuming builder: register pull plugins with
//! their schedules, push plugins, and the wires between them, then call
//! [`Engine::start`]. Topology errors (duplicate names, wires to
//! unregistered plugins) are caught at start, before any task spawns.
//!
//! At runtime every producer and every consumer is its own tokio task.
//! Producers fan polled payloads out over bounded per-consumer channels;
//! a slow or dead consumer costs that edge its deliveries but never
//! blocks siblings. Shutdown is a watch signal: producers stop polling
//! and drop their senders, consumers drain what is already queued, then
//! everything joins.

mod pull;
mod push;

use crate::config::Config;
use crate::error::{EngineError, Result};
use crate::metrics::Metrics;
use crate::schedule::Schedule;
use crate::transform::Transform;
use putki_core::{Overrides, Payload, PluginKind, Pull, Push};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};
use ulid::Ulid;

use pull::PullAdapter;
use push::PushAdapter;

/// One payload in flight on one producer→consumer edge
#[derive(Debug, Clone)]
pub struct Delivery {
    /// Unique id for log correlation
    pub id: Ulid,
    /// Name of the producing pull plugin
    pub source: String,
    /// Effective payload after the envelope shape check
    pub payload: Payload,
    /// Per-delivery overrides from the envelope, empty for plain payloads
    pub overrides: Overrides,
}

/// A wired producer→consumer edge as seen by the pull adapter
struct Edge {
    sink: String,
    transform: Option<Arc<dyn Transform>>,
    tx: mpsc::Sender<Delivery>,
}

/// Why an adapter task exited
#[derive(Debug)]
pub enum AdapterExit {
    /// Normal exit: shutdown, schedule exhaustion, or channel closure
    Completed,
    /// The adapter gave up on its plugin
    Fatal {
        /// Human-readable cause
        reason: String,
    },
}

/// Lifetime summary of one adapter task
#[derive(Debug)]
pub struct AdapterReport {
    /// Plugin instance name
    pub name: String,
    /// Polls performed (producers) or deliveries made (consumers)
    pub processed: u64,
    /// Failed polls or deliveries
    pub failed: u64,
    /// Why the task exited
    pub exit: AdapterExit,
}

struct Wire {
    source: String,
    sink: String,
    transform: Option<Arc<dyn Transform>>,
}

/// Consuming builder for a pipeline
pub struct Engine {
    config: Config,
    pulls: Vec<(Schedule, Arc<dyn Pull>)>,
    pushes: Vec<Arc<dyn Push>>,
    wires: Vec<Wire>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    /// Builder with default tuning
    pub fn new() -> Self {
        Self::from_config(Config::default())
    }

    /// Builder with explicit tuning (usually [`Config::from_env`])
    pub fn from_config(config: Config) -> Self {
        Self {
            config,
            pulls: Vec::new(),
            pushes: Vec::new(),
            wires: Vec::new(),
        }
    }

    /// Register a producer with its schedule
    pub fn pull(mut self, schedule: Schedule, plugin: Arc<dyn Pull>) -> Self {
        self.pulls.push((schedule, plugin));
        self
    }

    /// Register a consumer
    pub fn push(mut self, plugin: Arc<dyn Push>) -> Self {
        self.pushes.push(plugin);
        self
    }

    /// Override the per-consumer delivery queue depth
    pub fn channel_capacity(mut self, capacity: usize) -> Self {
        self.config.channel_capacity = capacity.max(1);
        self
    }

    /// Override the per-poll deadline; `None` trusts the plugin
    pub fn poll_timeout(mut self, timeout: Option<std::time::Duration>) -> Self {
        self.config.poll_timeout = timeout;
        self
    }

    /// Override the per-delivery deadline; `None` trusts the plugin
    pub fn push_timeout(mut self, timeout: Option<std::time::Duration>) -> Self {
        self.config.push_timeout = timeout;
        self
    }

    /// Override the consecutive-failure budget; `0` never retires
    pub fn max_consecutive_failures(mut self, budget: u32) -> Self {
        self.config.max_consecutive_failures = budget;
        self
    }

    /// Wire a producer to a consumer by name
    pub fn wire(mut self, source: impl Into<String>, sink: impl Into<String>) -> Self {
        self.wires.push(Wire {
            source: source.into(),
            sink: sink.into(),
            transform: None,
        });
        self
    }

    /// Wire a producer to a consumer through a transform
    pub fn wire_via(
        mut self,
        source: impl Into<String>,
        sink: impl Into<String>,
        transform: impl Transform + 'static,
    ) -> Self {
        self.wires.push(Wire {
            source: source.into(),
            sink: sink.into(),
            transform: Some(Arc::new(transform)),
        });
        self
    }

    /// Validate the topology and spawn all adapter tasks
    ///
    /// # Errors
    ///
    /// Duplicate plugin names within a kind and wires referencing
    /// unregistered plugins are rejected here; nothing is spawned on
    /// error.
    pub fn start(self) -> Result<EngineHandle> {
        self.validate()?;

        // Ignore "already initialized"; a real registration failure only
        // costs observability, never the pipeline.
        if let Err(e) = Metrics::init() {
            warn!(error = %e, "metrics unavailable");
        }

        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        // One bounded channel per consumer. Per-sender FIFO of mpsc is
        // what preserves delivery order on each edge.
        let mut senders: HashMap<String, mpsc::Sender<Delivery>> = HashMap::new();
        let mut push_tasks = Vec::with_capacity(self.pushes.len());
        for plugin in self.pushes {
            let (tx, rx) = mpsc::channel(self.config.channel_capacity);
            senders.insert(plugin.identity().name().to_string(), tx);
            let adapter = PushAdapter {
                plugin,
                rx,
                push_timeout: self.config.push_timeout,
            };
            push_tasks.push(tokio::spawn(adapter.run()));
        }

        let mut pull_tasks = Vec::with_capacity(self.pulls.len());
        for (schedule, plugin) in self.pulls {
            let name = plugin.identity().name();
            let edges: Vec<Edge> = self
                .wires
                .iter()
                .filter(|w| w.source == name)
                .filter_map(|w| {
                    senders.get(&w.sink).map(|tx| Edge {
                        sink: w.sink.clone(),
                        transform: w.transform.clone(),
                        tx: tx.clone(),
                    })
                })
                .collect();

            let adapter = PullAdapter {
                plugin,
                schedule,
                edges,
                shutdown: shutdown_rx.clone(),
                poll_timeout: self.config.poll_timeout,
                max_consecutive_failures: self.config.max_consecutive_failures,
            };
            pull_tasks.push(tokio::spawn(adapter.run()));
        }

        // Original senders drop here; consumer channels now close as
        // soon as the last producer holding a clone exits.
        drop(senders);

        info!(
            producers = pull_tasks.len(),
            consumers = push_tasks.len(),
            "engine started"
        );

        Ok(EngineHandle {
            shutdown_tx,
            pull_tasks,
            push_tasks,
        })
    }

    fn validate(&self) -> Result<()> {
        let mut pull_names: HashSet<&str> = HashSet::new();
        for (_, plugin) in &self.pulls {
            if !pull_names.insert(plugin.identity().name()) {
                return Err(EngineError::DuplicatePlugin {
                    kind: PluginKind::Pull,
                    name: plugin.identity().name().to_string(),
                });
            }
        }

        let mut push_names: HashSet<&str> = HashSet::new();
        for plugin in &self.pushes {
            if !push_names.insert(plugin.identity().name()) {
                return Err(EngineError::DuplicatePlugin {
                    kind: PluginKind::Push,
                    name: plugin.identity().name().to_string(),
                });
            }
        }

        for wire in &self.wires {
            if !pull_names.contains(wire.source.as_str()) {
                return Err(EngineError::UnknownPlugin {
                    kind: PluginKind::Pull,
                    name: wire.source.clone(),
                });
            }
            if !push_names.contains(wire.sink.as_str()) {
                return Err(EngineError::UnknownPlugin {
                    kind: PluginKind::Push,
                    name: wire.sink.clone(),
                });
            }
        }

        for name in &pull_names {
            if !self.wires.iter().any(|w| w.source == *name) {
                warn!(source = %name, "producer has no wired consumer");
            }
        }
        for name in &push_names {
            if !self.wires.iter().any(|w| w.sink == *name) {
                warn!(sink = %name, "consumer has no wired producer");
            }
        }

        Ok(())
    }
}

/// Handle to a running pipeline
///
/// Dropping the handle without calling [`shutdown`](Self::shutdown)
/// drops the shutdown sender, which producers treat as a shutdown
/// signal, but nothing waits for the drain.
#[derive(Debug)]
pub struct EngineHandle {
    shutdown_tx: watch::Sender<bool>,
    pull_tasks: Vec<JoinHandle<AdapterReport>>,
    push_tasks: Vec<JoinHandle<AdapterReport>>,
}

impl EngineHandle {
    /// Signal shutdown and wait for the drain
    ///
    /// Producers stop polling (an in-flight poll finishes first),
    /// consumers deliver everything already queued, then all tasks
    /// join. Returns every adapter's lifetime report.
    pub async fn shutdown(self) -> Vec<AdapterReport> {
        let _ = self.shutdown_tx.send(true);
        self.join_all().await
    }

    /// Wait for the pipeline to finish on its own
    ///
    /// Only terminates when every producer's schedule exhausts (one-shot
    /// schedules, retired producers); with recurring schedules this
    /// waits forever.
    pub async fn join(self) -> Vec<AdapterReport> {
        self.join_all().await
    }

    async fn join_all(self) -> Vec<AdapterReport> {
        // Keep shutdown_tx alive while joining: producers still polling
        // must see a live channel until they observe the signal.
        let mut reports = Vec::with_capacity(self.pull_tasks.len() + self.push_tasks.len());

        // Producers first: their exits drop the last delivery senders,
        // which is what lets consumers drain and stop.
        for task in self.pull_tasks {
            match task.await {
                Ok(report) => reports.push(report),
                Err(e) => warn!(error = %e, "producer task panicked"),
            }
        }
        for task in self.push_tasks {
            match task.await {
                Ok(report) => reports.push(report),
                Err(e) => warn!(error = %e, "consumer task panicked"),
            }
        }

        for report in &reports {
            match &report.exit {
                AdapterExit::Completed => info!(
                    task = %report.name,
                    processed = report.processed,
                    failed = report.failed,
                    "adapter exited"
                ),
                AdapterExit::Fatal { reason } => error!(
                    task = %report.name,
                    processed = report.processed,
                    failed = report.failed,
                    reason = %reason,
                    "adapter exited fatally"
                ),
            }
        }

        reports
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use putki_core::{PluginError, PluginIdentity};
    use serde_json::json;

    struct NullSource {
        identity: PluginIdentity,
    }

    impl NullSource {
        fn new(name: &str) -> Arc<Self> {
            Arc::new(Self {
                identity: PluginIdentity::new(PluginKind::Pull, name),
            })
        }
    }

    #[async_trait]
    impl Pull for NullSource {
        fn identity(&self) -> &PluginIdentity {
            &self.identity
        }

        async fn poll(&self) -> std::result::Result<Payload, PluginError> {
            Ok(json!(null))
        }
    }

    struct NullSink {
        identity: PluginIdentity,
    }

    impl NullSink {
        fn new(name: &str) -> Arc<Self> {
            Arc::new(Self {
                identity: PluginIdentity::new(PluginKind::Push, name),
            })
        }
    }

    #[async_trait]
    impl Push for NullSink {
        fn identity(&self) -> &PluginIdentity {
            &self.identity
        }

        async fn push(
            &self,
            _payload: &Payload,
            _overrides: &Overrides,
        ) -> std::result::Result<(), PluginError> {
            Ok(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn duplicate_pull_names_are_rejected() {
        let err = Engine::new()
            .pull(Schedule::once(), NullSource::new("a"))
            .pull(Schedule::once(), NullSource::new("a"))
            .start()
            .unwrap_err();

        assert!(matches!(
            err,
            EngineError::DuplicatePlugin {
                kind: PluginKind::Pull,
                ..
            }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn wire_to_unregistered_sink_is_rejected() {
        let err = Engine::new()
            .pull(Schedule::once(), NullSource::new("src"))
            .wire("src", "nowhere")
            .start()
            .unwrap_err();

        match err {
            EngineError::UnknownPlugin { kind, name } => {
                assert_eq!(kind, PluginKind::Push);
                assert_eq!(name, "nowhere");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn wire_from_unregistered_source_is_rejected() {
        let err = Engine::new()
            .push(NullSink::new("sink"))
            .wire("ghost", "sink")
            .start()
            .unwrap_err();

        assert!(matches!(
            err,
            EngineError::UnknownPlugin {
                kind: PluginKind::Pull,
                ..
            }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn one_shot_pipeline_runs_to_completion() {
        let handle = Engine::new()
            .pull(Schedule::once(), NullSource::new("src"))
            .push(NullSink::new("sink"))
            .wire("src", "sink")
            .start()
            .unwrap();

        let reports = handle.join().await;
        assert_eq!(reports.len(), 2);
        assert!(reports
            .iter()
            .all(|r| matches!(r.exit, AdapterExit::Completed)));

        let src = reports.iter().find(|r| r.name == "src").unwrap();
        assert_eq!(src.processed, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_stops_a_recurring_pipeline() {
        let handle = Engine::new()
            .pull(Schedule::every_secs(1).unwrap(), NullSource::new("src"))
            .push(NullSink::new("sink"))
            .wire("src", "sink")
            .start()
            .unwrap();

        tokio::time::sleep(std::time::Duration::from_millis(2500)).await;

        let reports = handle.shutdown().await;
        let src = reports.iter().find(|r| r.name == "src").unwrap();
        // First fire at t=0, then t=1s and t=2s
        assert_eq!(src.processed, 3);
    }
}
