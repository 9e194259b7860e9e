//! The single current reconstructed state value.

use serde_json::{Map, Value};

/// Holds the live reconstructed application state.
///
/// Accepts any value without validation; the reconstruction pipeline is
/// responsible for only ever storing a fully-applied snapshot (or the
/// untouched previous one, when a patch fails).
#[derive(Debug, Clone, PartialEq)]
pub struct StateStore {
    current: Value,
}

impl Default for StateStore {
    /// Starts as an empty object, matching a store that has not yet seen
    /// an `initStore` event.
    fn default() -> Self {
        Self {
            current: Value::Object(Map::new()),
        }
    }
}

impl StateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> &Value {
        &self.current
    }

    /// An owned copy of the current state, for history snapshots.
    pub fn snapshot(&self) -> Value {
        self.current.clone()
    }

    pub fn set(&mut self, value: Value) {
        self.current = value;
    }
}
