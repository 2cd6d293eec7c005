//! Udf trait for PUTKI plugins
//!
//! UDFs are synchronous callables usable inside the payload transform step.
//! They are pure aside from explicit local memory (a counter's value, a
//! memory cell, a throttle cache owned by the instance).

use crate::envelope::Payload;
use crate::error::PluginError;
use crate::identity::PluginIdentity;

/// Udf trait - a callable evaluated against in-flight payloads
///
/// All arguments and results are payloads (primitive or simple structured
/// values). UDFs run synchronously inside the transform step of the
/// producing adapter's loop, so implementations must not block on I/O.
///
/// Stateful UDFs (counter, memory) keep their state in plugin-private
/// fields; nothing is shared across instances.
pub trait Udf: Send + Sync {
    /// Identity of this configured instance
    fn identity(&self) -> &PluginIdentity;

    /// Evaluate the callable
    ///
    /// When bridged into a transform, the in-flight payload arrives as the
    /// single argument and the returned value replaces it (`Null` drops the
    /// delivery for that edge).
    fn call(&self, args: &[Payload]) -> Result<Payload, PluginError>;
}
