//! Built-in push plugins

mod stdout;

pub use stdout::StdoutSink;
