//! Tick source for smoke tests and examples
//!
//! Emits a small JSON object with a sequence number and a wall-clock
//! timestamp on every poll. Handy for verifying a pipeline end to end
//! without any external dependency.

use async_trait::async_trait;
use chrono::Utc;
use putki_core::{Payload, PluginError, PluginIdentity, PluginKind, Pull};
use serde_json::json;
use std::sync::atomic::{AtomicU64, Ordering};

/// Pull plugin emitting `{"seq": n, "at": <rfc3339>}` per poll
pub struct TickSource {
    identity: PluginIdentity,
    seq: AtomicU64,
}

impl TickSource {
    /// Create a tick source with the given instance name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            identity: PluginIdentity::new(PluginKind::Pull, name),
            seq: AtomicU64::new(0),
        }
    }

    /// Number of polls so far
    pub fn count(&self) -> u64 {
        self.seq.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl Pull for TickSource {
    fn identity(&self) -> &PluginIdentity {
        &self.identity
    }

    async fn poll(&self) -> Result<Payload, PluginError> {
        let seq = self.seq.fetch_add(1, Ordering::Relaxed);
        Ok(json!({
            "seq": seq,
            "at": Utc::now().to_rfc3339(),
        }))
    }
}
