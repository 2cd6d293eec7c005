//! putki-core - Core types for the PUTKI pipeline runtime
//!
//! This crate provides the foundational types shared between the PUTKI
//! engine and external plugins (pulls, pushes, UDFs):
//!
//! - [`Payload`] - the opaque structured value flowing through the pipeline
//! - [`Routed`] / [`Overrides`] - the envelope protocol for per-delivery overrides
//! - [`Pull`] / [`Push`] / [`Udf`] traits - the three plugin capability contracts
//! - [`PluginIdentity`] - deterministic plugin identity for logging
//! - [`PluginError`] - error type for plugin operations
//!
//! # Why this crate exists
//!
//! External plugins need to implement the capability traits and speak the
//! envelope protocol. Without `putki-core` they would depend on
//! `putki-engine`, but the engine also wants to optionally depend on bundled
//! plugins, creating a cyclic dependency.
//!
//! By extracting the shared vocabulary here, we break the cycle:
//!
//! ```text
//! putki-core ◄── putki-engine
//!     ▲
//!     └────────── third-party pull/push/udf crates
//! ```

#![deny(unsafe_code)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::panic)]
#![warn(missing_docs)]

mod error;
/// The envelope protocol: payloads, overrides, and the routed tagged union
pub mod envelope;
/// Deterministic plugin identity for logging and debugging
pub mod identity;
mod pull;
mod push;
mod udf;

pub use envelope::{Overrides, Payload, Routed, DATA_KEY};
pub use error::PluginError;
pub use identity::{PluginIdentity, PluginKind};
pub use pull::Pull;
pub use push::Push;
pub use udf::Udf;
