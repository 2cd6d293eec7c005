//! Push trait for PUTKI plugins
//!
//! The [`Push`] trait defines the consumer side of the pipeline: a sink
//! that accepts a payload and performs a side effect. Sinks receive routed
//! payloads asynchronously and may be invoked with per-delivery overrides.

use crate::envelope::{Overrides, Payload};
use crate::error::PluginError;
use crate::identity::PluginIdentity;
use async_trait::async_trait;

/// Push trait - delivers payloads to a destination
///
/// Each push plugin handles one destination. A producer wired to several
/// push plugins fans out independent copies of each payload; one sink's
/// failure never prevents delivery to the others.
///
/// # Overrides
///
/// The override map carries per-delivery behavioral overrides extracted
/// from the payload's envelope. An override value takes precedence over
/// the instance's configured default *for that single delivery*; the
/// stored configuration is never mutated. Unknown override keys should be
/// ignored (log and continue) - return
/// [`PluginError::UnsupportedOverride`] only when silently ignoring a key
/// would be misleading.
///
/// # Example
///
/// ```ignore
/// use putki_core::{Overrides, Payload, PluginError, PluginIdentity, Push};
/// use async_trait::async_trait;
///
/// struct Webhook {
///     identity: PluginIdentity,
///     client: reqwest::Client,
///     url: String,
/// }
///
/// #[async_trait]
/// impl Push for Webhook {
///     fn identity(&self) -> &PluginIdentity {
///         &self.identity
///     }
///
///     async fn push(&self, payload: &Payload, overrides: &Overrides) -> Result<(), PluginError> {
///         // "url" override redirects this one delivery
///         let url = overrides
///             .get("url")
///             .and_then(|v| v.as_str())
///             .unwrap_or(&self.url);
///
///         self.client
///             .post(url)
///             .json(payload)
///             .send()
///             .await
///             .map_err(|e| PluginError::Deliver(e.to_string()))?;
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Push: Send + Sync {
    /// Identity of this configured instance
    ///
    /// The name must be unique among push plugins in one engine.
    fn identity(&self) -> &PluginIdentity;

    /// Deliver one payload
    ///
    /// Called exactly once per arriving payload, in emission order per
    /// producer. The override map is owned by this delivery; implementations
    /// must not stash it or write override values into their configuration.
    ///
    /// # Errors
    ///
    /// - [`PluginError::Deliver`] - the destination rejected or failed to
    ///   process the payload; the delivery is dropped after being reported
    /// - [`PluginError::UnsupportedOverride`] - an override key cannot be
    ///   honored and ignoring it would be wrong
    async fn push(&self, payload: &Payload, overrides: &Overrides) -> Result<(), PluginError>;

    /// Graceful shutdown
    ///
    /// Called after the adapter drains its queue. Implementations should
    /// flush buffers and release resources. The default is a no-op.
    async fn shutdown(&self) -> Result<(), PluginError> {
        Ok(())
    }
}
