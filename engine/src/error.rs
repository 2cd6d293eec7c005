//! Error types for the PUTKI engine

use putki_core::PluginKind;
use thiserror::Error;

// Re-export the per-call plugin error from putki-core
pub use putki_core::PluginError;

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;

/// Main error type for the PUTKI engine
///
/// Every variant is fatal at topology build time. Runtime per-call
/// failures are [`PluginError`]s, caught at the adapter boundary and never
/// surfaced through this type - nothing a plugin does at runtime can crash
/// the engine.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Invalid schedule (zero interval, malformed cron expression, cron
    /// with no future fire time)
    #[error("invalid schedule: {0}")]
    Schedule(String),

    /// A wire references a plugin name that was never registered
    #[error("unknown {kind} plugin '{name}' in wiring")]
    UnknownPlugin {
        /// Capability kind the wire expected
        kind: PluginKind,
        /// The unregistered name
        name: String,
    },

    /// Two plugins of the same kind share a name
    #[error("duplicate {kind} plugin '{name}'")]
    DuplicatePlugin {
        /// Capability kind of the colliding plugins
        kind: PluginKind,
        /// The colliding name
        name: String,
    },

    /// A plugin failed to initialize at build time
    #[error("plugin '{plugin}' failed to initialize: {message}")]
    PluginInit {
        /// Rendered plugin identity
        plugin: String,
        /// Initialization failure detail
        message: String,
    },

    /// Metrics registration error
    #[error("metrics error: {0}")]
    Metrics(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
