//! # State Store
//!
//! The persisted side of compliance is a key-value store with one atomic
//! primitive: compare the current value, then set a new one. The pipeline
//! only ever reads and CAS-writes; it never holds a lock across calls.

use std::collections::HashMap;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use lqp_core::Hash32;

use crate::status::ComplianceStatus;

/// Values held by the compliance store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum StateValue {
    Status(ComplianceStatus),
    Root(Hash32),
}

/// A key-value store with compare-and-set updates.
pub trait StateStore: Send + Sync {
    fn get(&self, key: &str) -> Option<StateValue>;

    /// Atomically replace the value at `key` with `new` iff it currently
    /// equals `expected` (`None` = absent). Returns whether it did.
    fn compare_and_set(&self, key: &str, expected: Option<&StateValue>, new: StateValue) -> bool;
}

/// Process-local store behind a `parking_lot::RwLock`.
#[derive(Debug, Default)]
pub struct InMemoryStateStore {
    entries: RwLock<HashMap<String, StateValue>>,
}

impl InMemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys present.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl StateStore for InMemoryStateStore {
    fn get(&self, key: &str) -> Option<StateValue> {
        self.entries.read().get(key).cloned()
    }

    fn compare_and_set(&self, key: &str, expected: Option<&StateValue>, new: StateValue) -> bool {
        let mut entries = self.entries.write();
        if entries.get(key) != expected {
            return false;
        }
        entries.insert(key.to_string(), new);
        true
    }
}
