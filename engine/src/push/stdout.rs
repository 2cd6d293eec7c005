//! Stdout sink for debugging
//!
//! Prints deliveries to stdout in a single-line format. Useful for
//! development and as the reference consumer for override handling: the
//! configured default tag can be replaced per delivery by a `tag`
//! override, without ever changing the configured default.

use async_trait::async_trait;
use putki_core::{Overrides, Payload, PluginError, PluginIdentity, PluginKind, Push};
use std::sync::atomic::{AtomicU64, Ordering};

/// Push plugin printing `[tag] <payload json>` lines
pub struct StdoutSink {
    identity: PluginIdentity,
    /// Default tag, used when a delivery carries no `tag` override
    tag: String,
    /// Pretty print payloads as indented JSON
    pretty: bool,
    written: AtomicU64,
}

impl StdoutSink {
    /// Create a stdout sink with a default tag
    pub fn new(name: impl Into<String>, tag: impl Into<String>) -> Self {
        let tag = tag.into();
        Self {
            identity: PluginIdentity::new(PluginKind::Push, name).with_param("tag", tag.as_str()),
            tag,
            pretty: false,
            written: AtomicU64::new(0),
        }
    }

    /// Pretty print payloads as indented JSON
    pub fn pretty(mut self) -> Self {
        self.pretty = true;
        self
    }

    /// Lines written so far
    pub fn written(&self) -> u64 {
        self.written.load(Ordering::Relaxed)
    }

    /// Render one delivery to its output line
    ///
    /// A `tag` override applies to this line only; `self.tag` stays
    /// untouched.
    fn render(&self, payload: &Payload, overrides: &Overrides) -> String {
        let tag = overrides
            .get("tag")
            .and_then(Payload::as_str)
            .unwrap_or(&self.tag);
        if self.pretty {
            let body = serde_json::to_string_pretty(payload).unwrap_or_else(|_| payload.to_string());
            format!("[{tag}]\n{body}")
        } else {
            format!("[{tag}] {payload}")
        }
    }
}

#[async_trait]
impl Push for StdoutSink {
    fn identity(&self) -> &PluginIdentity {
        &self.identity
    }

    async fn push(&self, payload: &Payload, overrides: &Overrides) -> Result<(), PluginError> {
        use std::io::Write;

        for key in overrides.keys() {
            if key != "tag" {
                tracing::debug!(sink = %self.identity.name(), key = %key, "ignoring unknown override");
            }
        }

        let line = self.render(payload, overrides);
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{line}")
            .map_err(|e| PluginError::Deliver(format!("stdout write failed: {e}")))?;

        self.written.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}
