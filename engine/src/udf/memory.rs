//! Single-slot memory UDF

use parking_lot::Mutex;
use putki_core::{Payload, PluginError, PluginIdentity, PluginKind, Udf};

/// One-value store with read-before-write semantics
///
/// - no arguments: return the stored value, Null when nothing is stored
/// - one argument: store it, return what was there before
///
/// The previous value always comes back before the new one commits, so a
/// caller can chain `memory(new)` and still observe the old state.
pub struct Memory {
    identity: PluginIdentity,
    slot: Mutex<Option<Payload>>,
}

impl Memory {
    /// Create an empty memory slot
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            identity: PluginIdentity::new(PluginKind::Udf, name),
            slot: Mutex::new(None),
        }
    }
}

impl Udf for Memory {
    fn identity(&self) -> &PluginIdentity {
        &self.identity
    }

    fn call(&self, args: &[Payload]) -> Result<Payload, PluginError> {
        let mut slot = self.slot.lock();
        match args {
            [] => Ok(slot.clone().unwrap_or(Payload::Null)),
            [value] => Ok(slot.replace(value.clone()).unwrap_or(Payload::Null)),
            more => Err(PluginError::Transform(format!(
                "memory takes 0 or 1 arguments, got {}",
                more.len()
            ))),
        }
    }
}
