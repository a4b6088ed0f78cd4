use std::collections::HashMap;
use std::sync::Mutex;

use crate::kv::{Entry, KeyValueStore, StoreError, StoreResult};

/// In-memory store, used by tests and when no data directory is configured.
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Entry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> StoreResult<Option<Entry>> {
        let entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: String) -> StoreResult<u64> {
        let mut entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        let revision = entries.get(key).map(|e| e.revision).unwrap_or(0) + 1;
        entries.insert(key.to_string(), Entry { value, revision });
        Ok(revision)
    }

    fn compare_and_set(&self, key: &str, expected_revision: u64, value: String) -> StoreResult<u64> {
        let mut entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        let actual = entries.get(key).map(|e| e.revision).unwrap_or(0);

        if actual != expected_revision {
            return Err(StoreError::RevisionMismatch {
                key: key.to_string(),
                expected: expected_revision,
                actual,
            });
        }

        let revision = actual + 1;
        entries.insert(key.to_string(), Entry { value, revision });
        Ok(revision)
    }
}
