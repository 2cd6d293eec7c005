//! Pull trait for PUTKI plugins
//!
//! The [`Pull`] trait defines the producer side of the pipeline: a source
//! that yields one payload per poll, driven by a schedule owned by the
//! engine.

use crate::envelope::Payload;
use crate::error::PluginError;
use crate::identity::PluginIdentity;
use async_trait::async_trait;

/// Pull trait - produces payloads on demand
///
/// The engine calls [`poll`](Pull::poll) on the plugin's schedule, never
/// concurrently for the same instance. Different instances poll fully
/// independently.
///
/// # Implementation Requirements
///
/// - Must be `Send + Sync` for use across async tasks
/// - `poll` must be safely callable repeatedly
/// - Routine transient conditions (a host temporarily unreachable, an
///   empty mailbox) should be encoded as payload content (e.g.
///   `{"reachable": false}`) rather than returned as errors; reserve
///   [`PluginError`] for real failures
///
/// # Example
///
/// ```ignore
/// use putki_core::{Payload, PluginError, PluginIdentity, PluginKind, Pull};
/// use async_trait::async_trait;
/// use serde_json::json;
///
/// struct PortCheck {
///     identity: PluginIdentity,
///     addr: String,
/// }
///
/// #[async_trait]
/// impl Pull for PortCheck {
///     fn identity(&self) -> &PluginIdentity {
///         &self.identity
///     }
///
///     async fn poll(&self) -> Result<Payload, PluginError> {
///         let open = tokio::net::TcpStream::connect(&self.addr).await.is_ok();
///         Ok(json!({"addr": self.addr, "open": open}))
///     }
/// }
/// ```
#[async_trait]
pub trait Pull: Send + Sync {
    /// Identity of this configured instance
    ///
    /// The name must be unique among pull plugins in one engine.
    fn identity(&self) -> &PluginIdentity;

    /// Produce the next payload
    ///
    /// Called once per scheduled tick with no overlap per instance. A slow
    /// poll defers the next tick; it never causes a second concurrent poll.
    ///
    /// # Errors
    ///
    /// - [`PluginError::Poll`] - the underlying I/O failed for this call;
    ///   the adapter logs it and waits for the next tick
    /// - [`PluginError::NotReady`] - the source is still warming up
    async fn poll(&self) -> Result<Payload, PluginError>;

    /// Graceful shutdown
    ///
    /// Called when the adapter retires. The default implementation is a
    /// no-op for sources without resources to release.
    async fn shutdown(&self) -> Result<(), PluginError> {
        Ok(())
    }
}
