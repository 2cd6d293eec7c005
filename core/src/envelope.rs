//! The envelope protocol for PUTKI
//!
//! Every value flowing through the pipeline is a [`Payload`] - an opaque,
//! arbitrarily structured JSON value. A producer may wrap a payload in an
//! *envelope*: an object carrying the real payload under the reserved
//! [`DATA_KEY`] plus sibling fields that become per-delivery [`Overrides`]
//! for the receiving push plugin.
//!
//! # Wire shape
//!
//! ```text
//! {"data": {"temp": 21.5}, "tag": "urgent"}
//!    │                        │
//!    └─ effective payload     └─ override for this delivery only
//! ```
//!
//! A value without the reserved key is equivalent to an envelope with empty
//! overrides. The shape check happens exactly once, at ingestion into the
//! routing step, producing the [`Routed`] tagged union - downstream code
//! never duck-types payloads.
//!
//! Overrides apply to exactly one delivery. The consumer's persisted
//! configuration (a default title, channel, tag) is never mutated by an
//! override.

use std::collections::BTreeMap;

/// The opaque data unit flowing through the pipeline
///
/// PUTKI does not interpret payloads beyond the single envelope shape check.
/// Pull plugins decide what they emit, push plugins decide what they accept.
pub type Payload = serde_json::Value;

/// Per-delivery override map, keyed by consumer-specific override names
///
/// A `BTreeMap` so iteration order (and therefore log output) is
/// deterministic. Override keys are validated by the consumer, not the
/// router - unknown keys are forwarded as-is.
pub type Overrides = BTreeMap<String, Payload>;

/// Reserved envelope key holding the real payload
pub const DATA_KEY: &str = "data";

/// A payload after the single ingestion-time shape check
///
/// Either a plain value, or an envelope carrying the effective payload plus
/// overrides for one delivery.
///
/// # Example
///
/// ```
/// use putki_core::Routed;
/// use serde_json::json;
///
/// let routed = Routed::from_payload(json!({"data": 42, "tag": "hot"}));
/// let (payload, overrides) = routed.split();
/// assert_eq!(payload, json!(42));
/// assert_eq!(overrides.get("tag"), Some(&json!("hot")));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Routed {
    /// A bare payload, equivalent to an envelope with empty overrides
    Plain(Payload),
    /// An envelope: effective payload plus per-delivery overrides
    Envelope {
        /// The real payload, forwarded to the consumer
        data: Payload,
        /// Sibling keys of [`DATA_KEY`], applied for exactly one delivery
        overrides: Overrides,
    },
}

impl Routed {
    /// Classify a raw payload by the envelope shape check
    ///
    /// An object containing the reserved [`DATA_KEY`] is an envelope whose
    /// sibling keys become overrides. Anything else - scalars, arrays,
    /// objects without the reserved key - is a plain payload.
    pub fn from_payload(raw: Payload) -> Self {
        match raw {
            Payload::Object(mut map) if map.contains_key(DATA_KEY) => {
                let data = map.remove(DATA_KEY).unwrap_or(Payload::Null);
                let overrides = map.into_iter().collect();
                Routed::Envelope { data, overrides }
            }
            other => Routed::Plain(other),
        }
    }

    /// Decompose into `(effective_payload, overrides)`
    ///
    /// Plain payloads yield an empty override map.
    pub fn split(self) -> (Payload, Overrides) {
        match self {
            Routed::Plain(payload) => (payload, Overrides::new()),
            Routed::Envelope { data, overrides } => (data, overrides),
        }
    }

    /// Whether this payload carried any overrides
    pub fn has_overrides(&self) -> bool {
        match self {
            Routed::Plain(_) => false,
            Routed::Envelope { overrides, .. } => !overrides.is_empty(),
        }
    }
}

/// Build an envelope payload from data and overrides (authoring helper)
///
/// The inverse of [`Routed::from_payload`] for producers and tooling that
/// want to attach per-delivery overrides.
pub fn wrap(data: Payload, overrides: Overrides) -> Payload {
    let mut map = serde_json::Map::with_capacity(overrides.len() + 1);
    map.insert(DATA_KEY.to_string(), data);
    for (key, value) in overrides {
        map.insert(key, value);
    }
    Payload::Object(map)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn plain_scalar_has_no_overrides() {
        let routed = Routed::from_payload(json!(42));
        assert!(!routed.has_overrides());

        let (payload, overrides) = routed.split();
        assert_eq!(payload, json!(42));
        assert!(overrides.is_empty());
    }

    #[test]
    fn plain_object_without_data_key_passes_unchanged() {
        let raw = json!({"temp": 21.5, "unit": "C"});
        let (payload, overrides) = Routed::from_payload(raw.clone()).split();

        // Identity round-trip: untouched payload, empty overrides
        assert_eq!(payload, raw);
        assert!(overrides.is_empty());
    }

    #[test]
    fn plain_array_passes_unchanged() {
        let raw = json!([1, 2, 3]);
        let (payload, overrides) = Routed::from_payload(raw.clone()).split();
        assert_eq!(payload, raw);
        assert!(overrides.is_empty());
    }

    #[test]
    fn envelope_splits_data_and_overrides() {
        let raw = json!({"data": {"msg": "hi"}, "tag": "urgent", "channel": "ops"});
        let routed = Routed::from_payload(raw);
        assert!(routed.has_overrides());

        let (payload, overrides) = routed.split();
        assert_eq!(payload, json!({"msg": "hi"}));
        assert_eq!(overrides.len(), 2);
        assert_eq!(overrides.get("tag"), Some(&json!("urgent")));
        assert_eq!(overrides.get("channel"), Some(&json!("ops")));
    }

    #[test]
    fn envelope_with_only_data_key_has_empty_overrides() {
        let (payload, overrides) = Routed::from_payload(json!({"data": [1, 2]})).split();
        assert_eq!(payload, json!([1, 2]));
        assert!(overrides.is_empty());
    }

    #[test]
    fn envelope_data_may_itself_contain_a_data_key() {
        // Only one level of unwrapping: the shape check happens once
        let raw = json!({"data": {"data": "inner", "keep": true}});
        let (payload, overrides) = Routed::from_payload(raw).split();
        assert_eq!(payload, json!({"data": "inner", "keep": true}));
        assert!(overrides.is_empty());
    }

    #[test]
    fn null_payload_is_plain() {
        let (payload, overrides) = Routed::from_payload(json!(null)).split();
        assert_eq!(payload, json!(null));
        assert!(overrides.is_empty());
    }

    #[test]
    fn envelope_helper_round_trips() {
        let mut overrides = Overrides::new();
        overrides.insert("tag".to_string(), json!("loud"));

        let wrapped = wrap(json!({"v": 1}), overrides.clone());
        let (payload, got) = Routed::from_payload(wrapped).split();

        assert_eq!(payload, json!({"v": 1}));
        assert_eq!(got, overrides);
    }

    #[test]
    fn overrides_iterate_in_sorted_order() {
        let raw = json!({"data": 1, "zebra": 1, "alpha": 2, "mid": 3});
        let (_, overrides) = Routed::from_payload(raw).split();

        let keys: Vec<&str> = overrides.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["alpha", "mid", "zebra"]);
    }
}
