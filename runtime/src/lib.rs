//! PUTKI Runtime - zero-boilerplate pipeline startup
//!
//! Provides [`run()`] for the common case and [`RuntimeBuilder`] for
//! callers who need to override configuration. Both load config from
//! `PUTKI_*` environment variables, initialise tracing and metrics,
//! hand you an [`Engine`] to wire up, then block until SIGINT or
//! SIGTERM and drain the pipeline.
//!
//! # Quick start
//!
//! ```ignore
//! use putki_runtime::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     putki_runtime::run(|engine| async move {
//!         Ok(engine
//!             .pull(Schedule::every_secs(10)?, Arc::new(TickSource::new("tick")))
//!             .push(Arc::new(StdoutSink::new("out", "info")))
//!             .wire("tick", "out"))
//!     })
//!     .await
//! }
//! ```

#![deny(unsafe_code)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::panic)]

pub mod prelude;

use putki_engine::{Config, Engine, LogFormat, Metrics};
use std::future::Future;
use tokio::signal;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Run a PUTKI pipeline with configuration from the environment.
///
/// Initialises tracing and metrics, calls your closure to wire up the
/// pipeline, then runs it with graceful shutdown on SIGINT/SIGTERM.
pub async fn run<F, Fut>(configure: F) -> anyhow::Result<()>
where
    F: FnOnce(Engine) -> Fut,
    Fut: Future<Output = anyhow::Result<Engine>>,
{
    RuntimeBuilder::new().configure(configure).await
}

/// Builder for callers who need control over the runtime.
///
/// # Example
///
/// ```ignore
/// RuntimeBuilder::new()
///     .config(my_config)
///     .configure(|engine| async move {
///         Ok(engine.push(Arc::new(StdoutSink::new("out", "info"))))
///     })
///     .await
/// ```
pub struct RuntimeBuilder {
    config: Option<Config>,
}

impl RuntimeBuilder {
    /// Create a builder that loads config from the environment.
    pub fn new() -> Self {
        Self { config: None }
    }

    /// Use an explicit [`Config`] instead of reading `PUTKI_*` variables.
    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Configure the pipeline and run it to completion.
    ///
    /// This is the terminal method - it blocks until a shutdown signal
    /// arrives and the pipeline has drained.
    pub async fn configure<F, Fut>(self, configure: F) -> anyhow::Result<()>
    where
        F: FnOnce(Engine) -> Fut,
        Fut: Future<Output = anyhow::Result<Engine>>,
    {
        let config = match self.config {
            Some(config) => config,
            None => Config::from_env()?,
        };

        init_tracing(&config);

        info!(
            channel_capacity = config.channel_capacity,
            max_consecutive_failures = config.max_consecutive_failures,
            "starting PUTKI"
        );

        Metrics::init()?;

        let engine = configure(Engine::from_config(config)).await?;
        let handle = engine.start()?;

        shutdown_signal().await;

        info!("draining pipeline");
        let reports = handle.shutdown().await;
        info!(adapters = reports.len(), "PUTKI shutdown complete");

        Ok(())
    }
}

impl Default for RuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Initialise the tracing subscriber based on config.
fn init_tracing(config: &Config) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| config.log_level.clone().into());

    let registry = tracing_subscriber::registry().with(env_filter);

    match config.log_format {
        LogFormat::Json => {
            registry
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        LogFormat::Pretty => {
            registry.with(tracing_subscriber::fmt::layer()).init();
        }
    }
}

/// Wait for SIGINT (Ctrl+C) or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = ?e, "failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = ?e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received Ctrl+C, shutting down"),
        _ = terminate => info!("received SIGTERM, shutting down"),
    }
}
