//! Error types for PUTKI plugins

use thiserror::Error;

/// Error type for plugin operations
///
/// This is the standard error type used by all PUTKI plugins including
/// pulls, pushes, and UDFs. It provides structured error categories that
/// the engine maps onto its fault-isolation policy: every variant except
/// [`PluginError::Init`] is a per-call failure that never stops sibling
/// adapters.
///
/// # Example
///
/// ```
/// use putki_core::PluginError;
///
/// fn read_sensor() -> Result<f64, PluginError> {
///     Err(PluginError::Poll("device busy".to_string()))
/// }
///
/// match read_sensor() {
///     Ok(v) => println!("reading: {v}"),
///     Err(PluginError::Poll(msg)) => println!("transient: {msg}"),
///     Err(e) => println!("other error: {e}"),
/// }
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PluginError {
    /// Initialization failed
    ///
    /// Returned when a plugin fails to construct or initialize.
    /// Examples: invalid configuration, missing credentials, bad device index.
    /// This is the only variant treated as fatal at topology build time.
    #[error("initialization failed: {0}")]
    Init(String),

    /// Poll failed
    ///
    /// A pull plugin's underlying I/O failed for this one call (network
    /// blip, device busy). The adapter logs it and the next scheduled tick
    /// proceeds normally. Routine conditions like "host unreachable" should
    /// be encoded as payload content instead, reserving this for real
    /// failures.
    #[error("poll failed: {0}")]
    Poll(String),

    /// Delivery failed
    ///
    /// A push plugin rejected or failed to process a payload. Reported
    /// per-edge; sibling edges and the producer are unaffected.
    #[error("delivery failed: {0}")]
    Deliver(String),

    /// Transform failed
    ///
    /// A transform or UDF failed to process an in-flight payload.
    /// The delivery for that edge is dropped after being reported.
    #[error("transform failed: {0}")]
    Transform(String),

    /// Call exceeded its configured deadline
    ///
    /// Treated like a transient failure for retry purposes, but reported
    /// distinctly for observability.
    #[error("call timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// A push plugin received an override key it cannot honor
    ///
    /// Consumers are encouraged to ignore unknown keys (logged) rather
    /// than reject the whole delivery with this error.
    #[error("unsupported override key '{0}'")]
    UnsupportedOverride(String),

    /// Not ready
    ///
    /// The plugin was invoked before it is ready to handle calls. This is
    /// typically a transient state during startup or recovery.
    #[error("plugin not ready")]
    NotReady,

    /// Shutdown error
    ///
    /// Graceful shutdown failed, e.g. a final flush did not complete.
    #[error("shutdown error: {0}")]
    Shutdown(String),
}
