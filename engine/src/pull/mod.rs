//! Built-in pull plugins

mod tick;

pub use tick::TickSource;
