//! Deterministic plugin identity for logging and debugging
//!
//! Every configured plugin instance carries a [`PluginIdentity`]: its kind,
//! a name unique within that kind, and its configuration parameters. The
//! `Display` rendering is deterministic - parameters are sorted by key
//! regardless of construction order - so log lines and debug output are
//! stable across runs.
//!
//! Sensitive parameters (API keys, tokens) are excluded by an explicit
//! redaction list rather than ad hoc masking.

use crate::envelope::Payload;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// The three plugin capability kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PluginKind {
    /// A producer: yields payloads on its own schedule
    Pull,
    /// A consumer: accepts payloads and performs a side effect
    Push,
    /// A transform callable usable inside the payload path
    Udf,
}

impl fmt::Display for PluginKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PluginKind::Pull => write!(f, "pull"),
            PluginKind::Push => write!(f, "push"),
            PluginKind::Udf => write!(f, "udf"),
        }
    }
}

/// Identity of one configured plugin instance
///
/// The name is immutable after construction and must be unique within its
/// kind. Parameters are kept in a sorted map so the rendering is
/// deterministic.
///
/// # Example
///
/// ```
/// use putki_core::{PluginIdentity, PluginKind};
///
/// let id = PluginIdentity::new(PluginKind::Pull, "weather")
///     .with_param("city", "Helsinki")
///     .with_param("api_key", "s3cret")
///     .redact("api_key");
///
/// assert_eq!(
///     id.to_string(),
///     r#"pull:weather{api_key=<redacted>, city="Helsinki"}"#
/// );
/// ```
#[derive(Debug, Clone)]
pub struct PluginIdentity {
    kind: PluginKind,
    name: String,
    params: BTreeMap<String, Payload>,
    redacted: BTreeSet<String>,
}

impl PluginIdentity {
    /// Create an identity with no parameters
    pub fn new(kind: PluginKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            params: BTreeMap::new(),
            redacted: BTreeSet::new(),
        }
    }

    /// Record a configuration parameter
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Payload>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Mark a parameter key as sensitive; it renders as `<redacted>`
    pub fn redact(mut self, key: impl Into<String>) -> Self {
        self.redacted.insert(key.into());
        self
    }

    /// Instance name, unique within the kind
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Capability kind of this instance
    pub fn kind(&self) -> PluginKind {
        self.kind
    }

    /// Look up a recorded parameter
    pub fn param(&self, key: &str) -> Option<&Payload> {
        self.params.get(key)
    }
}

impl fmt::Display for PluginIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.name)?;
        if self.params.is_empty() {
            return Ok(());
        }
        write!(f, "{{")?;
        for (i, (key, value)) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            if self.redacted.contains(key) {
                write!(f, "{key}=<redacted>")?;
            } else {
                write!(f, "{key}={value}")?;
            }
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn render_without_params() {
        let id = PluginIdentity::new(PluginKind::Push, "stdout");
        assert_eq!(id.to_string(), "push:stdout");
    }

    #[test]
    fn render_is_sorted_regardless_of_insertion_order() {
        let a = PluginIdentity::new(PluginKind::Pull, "probe")
            .with_param("zone", "eu")
            .with_param("host", "example.com");
        let b = PluginIdentity::new(PluginKind::Pull, "probe")
            .with_param("host", "example.com")
            .with_param("zone", "eu");

        assert_eq!(a.to_string(), b.to_string());
        assert_eq!(
            a.to_string(),
            r#"pull:probe{host="example.com", zone="eu"}"#
        );
    }

    #[test]
    fn redacted_params_never_render_their_value() {
        let id = PluginIdentity::new(PluginKind::Push, "notify")
            .with_param("token", "hunter2")
            .with_param("channel", "ops")
            .redact("token");

        let rendered = id.to_string();
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("token=<redacted>"));
        assert!(rendered.contains(r#"channel="ops""#));
    }

    #[test]
    fn params_accept_structured_values() {
        let id = PluginIdentity::new(PluginKind::Udf, "throttle")
            .with_param("window_secs", 60)
            .with_param("tags", json!(["a", "b"]));

        assert_eq!(id.param("window_secs"), Some(&json!(60)));
        assert_eq!(
            id.to_string(),
            r#"udf:throttle{tags=["a","b"], window_secs=60}"#
        );
    }

    #[test]
    fn kind_displays_lowercase() {
        assert_eq!(PluginKind::Pull.to_string(), "pull");
        assert_eq!(PluginKind::Push.to_string(), "push");
        assert_eq!(PluginKind::Udf.to_string(), "udf");
    }
}
