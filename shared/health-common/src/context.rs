use serde_json::Value;
use std::collections::HashMap;

/// Context keys written by the node sync checks
pub mod keys {
    /// Block height reported by the local node
    pub const ETH_BLOCK_NUMBER: &str = "ethBlockNumber";
    /// Block height reported by the reference source
    pub const REF_BLOCK_NUMBER: &str = "refBlockNumber";
}

/// Run-scoped mutable state shared by the checks of one engine run
///
/// A fresh context is created for every run and dropped when the run ends.
/// Keys written by an earlier check are visible to every later check.
#[derive(Debug, Clone, Default)]
pub struct CheckContext {
    values: HashMap<String, Value>,
}

impl CheckContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Read a key as an unsigned integer, `None` if absent or not a number
    pub fn get_u64(&self, key: &str) -> Option<u64> {
        self.values.get(key).and_then(Value::as_u64)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.values.remove(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
