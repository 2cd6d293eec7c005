//! Convenience re-exports for pipeline authors.
//!
//! ```rust
//! use putki_runtime::prelude::*;
//! ```

// Plugin vocabulary
pub use putki_engine::{
    Overrides, Payload, PluginError, PluginIdentity, PluginKind, Pull, Push, Routed, Udf,
};

// Pipeline builder
pub use putki_engine::{Engine, EngineHandle, Schedule};

// Built-in plugins
pub use putki_engine::{StdoutSink, TickSource};

// Transforms and UDFs
pub use putki_engine::{Counter, FnTransform, Memory, Throttled, Transform, UdfTransform};

// Throttling
pub use putki_engine::ThrottleCache;

// Configuration and errors
pub use putki_engine::{Config, EngineError, LogFormat};

// Runtime
pub use crate::{run, RuntimeBuilder};

// Plugins are registered as shared trait objects
pub use std::sync::Arc;
