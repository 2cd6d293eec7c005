//! Built-in UDFs
//!
//! Small stateful callables registered alongside plugins. Each instance
//! owns its state; two counters registered under different names never
//! share a tally.

mod counter;
mod memory;
mod throttled;

pub use counter::Counter;
pub use memory::Memory;
pub use throttled::Throttled;
