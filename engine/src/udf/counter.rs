//! Monotonic counter UDF

use putki_core::{Payload, PluginError, PluginIdentity, PluginKind, Udf};
use serde_json::json;
use std::sync::atomic::{AtomicI64, Ordering};

/// Counter starting at a configured value, incremented on every call
///
/// Each call returns the value *before* the increment, so the first call
/// observes the initial value. A negative initial value clamps to zero.
pub struct Counter {
    identity: PluginIdentity,
    value: AtomicI64,
}

impl Counter {
    /// Create a counter with the given starting value
    pub fn new(name: impl Into<String>, initial: i64) -> Self {
        let initial = initial.max(0);
        Self {
            identity: PluginIdentity::new(PluginKind::Udf, name)
                .with_param("initial", json!(initial)),
            value: AtomicI64::new(initial),
        }
    }

    /// The current tally without incrementing
    pub fn peek(&self) -> i64 {
        self.value.load(Ordering::SeqCst)
    }
}

impl Udf for Counter {
    fn identity(&self) -> &PluginIdentity {
        &self.identity
    }

    fn call(&self, _args: &[Payload]) -> Result<Payload, PluginError> {
        let before = self.value.fetch_add(1, Ordering::SeqCst);
        Ok(json!(before))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn returns_pre_increment_value() {
        let counter = Counter::new("hits", 5);
        assert_eq!(counter.call(&[]).unwrap(), json!(5));
        assert_eq!(counter.call(&[]).unwrap(), json!(6));
        assert_eq!(counter.peek(), 7);
    }

    #[test]
    fn negative_initial_clamps_to_zero() {
        let counter = Counter::new("hits", -3);
        assert_eq!(counter.call(&[]).unwrap(), json!(0));
        assert_eq!(counter.call(&[]).unwrap(), json!(1));
    }

    #[test]
    fn instances_do_not_share_state() {
        let a = Counter::new("a", 0);
        let b = Counter::new("b", 0);

        a.call(&[]).unwrap();
        a.call(&[]).unwrap();

        assert_eq!(b.call(&[]).unwrap(), json!(0));
    }
}
