//! Minimal PUTKI pipeline - a tick source printed to stdout.
//!
//! ```bash
//! cargo run -p putki-runtime --example heartbeat
//! ```

use putki_runtime::prelude::*;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    putki_runtime::run(|engine| async move {
        Ok(engine
            .pull(Schedule::every_secs(5)?, Arc::new(TickSource::new("tick")))
            .push(Arc::new(StdoutSink::new("out", "heartbeat")))
            .wire("tick", "out"))
    })
    .await
}
