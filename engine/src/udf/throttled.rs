//! Throttled UDF wrapper

use crate::throttle::ThrottleCache;
use putki_core::{Payload, PluginError, PluginIdentity, Udf};
use serde_json::json;
use std::time::Duration;

/// Memoizes an inner UDF over a time window
///
/// Within the window every call returns the cached result of the first
/// call without invoking the inner UDF; the arguments of suppressed calls
/// are ignored. The cache is owned by this instance, so two throttled
/// wrappers around the same inner UDF throttle independently.
pub struct Throttled<U> {
    identity: PluginIdentity,
    inner: U,
    cache: ThrottleCache,
}

impl<U: Udf> Throttled<U> {
    /// Wrap `inner`, memoizing its results for `window`
    pub fn new(inner: U, window: Duration) -> Self {
        let identity = PluginIdentity::new(
            inner.identity().kind(),
            format!("{}.throttled", inner.identity().name()),
        )
        .with_param("window_secs", json!(window.as_secs()));
        Self {
            identity,
            inner,
            cache: ThrottleCache::new(window),
        }
    }

    /// The wrapped UDF
    pub fn inner(&self) -> &U {
        &self.inner
    }
}

impl<U: Udf> Udf for Throttled<U> {
    fn identity(&self) -> &PluginIdentity {
        &self.identity
    }

    fn call(&self, args: &[Payload]) -> Result<Payload, PluginError> {
        self.cache.get_or_compute(|| self.inner.call(args))
    }
}
