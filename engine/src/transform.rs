//! In-flight payload transforms
//!
//! A transform sits on a producer→consumer edge and rewrites the payload
//! before the envelope shape check. Returning `None` drops the delivery
//! for that edge only; sibling edges of the same poll are unaffected.
//!
//! Two implementations: [`FnTransform`] for closures, [`UdfTransform`]
//! bridging a registered [`Udf`] (a Null result means drop).

use putki_core::{Payload, PluginError, Udf};
use std::sync::Arc;

/// Edge-level payload rewrite
///
/// Transforms are synchronous and must be cheap; they run inline on the
/// producer's task before fan-out.
pub trait Transform: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Rewrite the payload, or return `None` to drop this delivery
    fn apply(&self, payload: Payload) -> Result<Option<Payload>, PluginError>;
}

/// Transform backed by a plain closure
pub struct FnTransform<F> {
    name: String,
    f: F,
}

impl<F> FnTransform<F>
where
    F: Fn(Payload) -> Result<Option<Payload>, PluginError> + Send + Sync,
{
    /// Wrap a closure as a named transform
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }
}

impl<F> Transform for FnTransform<F>
where
    F: Fn(Payload) -> Result<Option<Payload>, PluginError> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, payload: Payload) -> Result<Option<Payload>, PluginError> {
        (self.f)(payload)
    }
}

/// Transform that feeds the payload through a registered UDF
///
/// The UDF is called with the payload as its single argument. A Null
/// result drops the delivery, mirroring how filtering UDFs signal "not
/// this one". Any other result replaces the payload.
pub struct UdfTransform {
    udf: Arc<dyn Udf>,
}

impl UdfTransform {
    /// Bridge a UDF onto an edge
    pub fn new(udf: Arc<dyn Udf>) -> Self {
        Self { udf }
    }
}

impl Transform for UdfTransform {
    fn name(&self) -> &str {
        self.udf.identity().name()
    }

    fn apply(&self, payload: Payload) -> Result<Option<Payload>, PluginError> {
        match self.udf.call(&[payload])? {
            Payload::Null => Ok(None),
            other => Ok(Some(other)),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use putki_core::{PluginIdentity, PluginKind};
    use serde_json::json;

    #[test]
    fn fn_transform_rewrites_payload() {
        let double = FnTransform::new("double", |p: Payload| {
            let n = p.as_i64().unwrap_or(0);
            Ok(Some(json!(n * 2)))
        });

        assert_eq!(double.apply(json!(21)).unwrap(), Some(json!(42)));
        assert_eq!(double.name(), "double");
    }

    #[test]
    fn fn_transform_can_drop() {
        let evens_only = FnTransform::new("evens", |p: Payload| {
            match p.as_i64() {
                Some(n) if n % 2 == 0 => Ok(Some(p)),
                _ => Ok(None),
            }
        });

        assert_eq!(evens_only.apply(json!(4)).unwrap(), Some(json!(4)));
        assert_eq!(evens_only.apply(json!(3)).unwrap(), None);
    }

    struct Upper {
        identity: PluginIdentity,
    }

    impl Udf for Upper {
        fn identity(&self) -> &PluginIdentity {
            &self.identity
        }

        fn call(&self, args: &[Payload]) -> Result<Payload, PluginError> {
            match args.first().and_then(Payload::as_str) {
                Some(s) => Ok(json!(s.to_uppercase())),
                None => Ok(Payload::Null),
            }
        }
    }

    #[test]
    fn udf_transform_replaces_payload() {
        let udf = Arc::new(Upper {
            identity: PluginIdentity::new(PluginKind::Udf, "upper"),
        });
        let transform = UdfTransform::new(udf);

        assert_eq!(transform.apply(json!("hi")).unwrap(), Some(json!("HI")));
        assert_eq!(transform.name(), "upper");
    }

    #[test]
    fn udf_null_result_drops_delivery() {
        let udf = Arc::new(Upper {
            identity: PluginIdentity::new(PluginKind::Udf, "upper"),
        });
        let transform = UdfTransform::new(udf);

        // Non-string payload: the UDF answers Null, the edge drops it
        assert_eq!(transform.apply(json!(7)).unwrap(), None);
    }
}
