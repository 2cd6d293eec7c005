//! A custom producer with envelopes, fan-out, and an edge transform.
//!
//! The probe wraps failing checks in an envelope carrying an urgent
//! `tag` override. One sink logs every check; a second sink only sees
//! the failures, filtered by a per-edge transform.
//!
//! ```bash
//! cargo run -p putki-runtime --example reporter
//! ```

use async_trait::async_trait;
use putki_engine::{envelope, DATA_KEY};
use putki_runtime::prelude::*;
use serde_json::json;
use std::sync::atomic::{AtomicU64, Ordering};

struct PortProbe {
    identity: PluginIdentity,
    checks: AtomicU64,
}

impl PortProbe {
    fn new(host: &str, port: u16) -> Self {
        Self {
            identity: PluginIdentity::new(PluginKind::Pull, "port-probe")
                .with_param("host", host)
                .with_param("port", port as i64),
            checks: AtomicU64::new(0),
        }
    }
}

#[async_trait]
impl Pull for PortProbe {
    fn identity(&self) -> &PluginIdentity {
        &self.identity
    }

    async fn poll(&self) -> Result<Payload, PluginError> {
        let check = self.checks.fetch_add(1, Ordering::SeqCst);
        // Stand-in for a real TCP connect; every third check "fails"
        let up = check % 3 != 2;

        let data = json!({"check": check, "up": up});
        if up {
            Ok(data)
        } else {
            let mut overrides = Overrides::new();
            overrides.insert("tag".to_string(), json!("urgent"));
            Ok(envelope::wrap(data, overrides))
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    putki_runtime::run(|engine| async move {
        Ok(engine
            .pull(
                Schedule::every_secs(2)?,
                Arc::new(PortProbe::new("localhost", 8080)),
            )
            .push(Arc::new(StdoutSink::new("report", "status")))
            .push(Arc::new(StdoutSink::new("alerts", "alert")))
            .wire("port-probe", "report")
            .wire_via(
                "port-probe",
                "alerts",
                // Failures leave the probe enveloped; everything else is
                // a plain object and gets dropped on this edge
                FnTransform::new("down_only", |p: Payload| {
                    Ok(if p.get(DATA_KEY).is_some() { Some(p) } else { None })
                }),
            ))
    })
    .await
}
