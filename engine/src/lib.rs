//! PUTKI engine - plugin execution and dispatch runtime
//!
//! Connects pull plugins (producers on their own schedules) to push plugins
//! (consumers reached by per-edge channels), with optional transforms
//! evaluated against in-flight payloads.
//!
//! ```text
//! Schedule ──► PullAdapter ──► [transform] ──► envelope split ──► PushAdapter(s)
//! ```
//!
//! Each adapter is an independent tokio task supervised by the [`Engine`].
//! One producer's or consumer's fault never stops the others; delivery
//! ordering is preserved per producer→consumer edge.

#![deny(unsafe_code)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::panic)]

pub mod config;
pub mod engine;
pub mod error;
pub mod metrics;
pub mod pull;
pub mod push;
pub mod schedule;
pub mod throttle;
pub mod transform;
pub mod udf;

pub use config::{Config, LogFormat};
pub use engine::{AdapterExit, AdapterReport, Delivery, Engine, EngineHandle};
pub use error::{EngineError, Result};
pub use metrics::Metrics;
pub use pull::TickSource;
pub use push::StdoutSink;
pub use schedule::Schedule;
pub use throttle::ThrottleCache;
pub use transform::{FnTransform, Transform, UdfTransform};
pub use udf::{Counter, Memory, Throttled};

// Re-export the shared plugin vocabulary so pipeline authors only need
// one dependency.
pub use putki_core::{
    envelope, Overrides, Payload, PluginError, PluginIdentity, PluginKind, Pull, Push, Routed, Udf,
    DATA_KEY,
};
