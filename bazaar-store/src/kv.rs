use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;

/// A stored value together with its write revision.
///
/// Absent keys behave as revision `0`; every successful write bumps the
/// revision by one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub value: String,
    pub revision: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Stored data could not be (de)serialized: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Revision mismatch on {key}: expected {expected}, found {actual}")]
    RevisionMismatch {
        key: String,
        expected: u64,
        actual: u64,
    },

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage lock poisoned")]
    Poisoned,
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence collaborator: a flat string-keyed store of JSON documents.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> StoreResult<Option<Entry>>;

    /// Unconditional write. Returns the new revision.
    fn set(&self, key: &str, value: String) -> StoreResult<u64>;

    /// Write only if the key is still at `expected_revision`.
    fn compare_and_set(&self, key: &str, expected_revision: u64, value: String) -> StoreResult<u64>;
}

/// Typed list-per-key access on top of a [`KeyValueStore`].
#[derive(Clone)]
pub struct Collections {
    store: Arc<dyn KeyValueStore>,
}

impl Collections {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Load a collection, defaulting to empty.
    pub fn load<T: DeserializeOwned>(&self, key: &str) -> StoreResult<Vec<T>> {
        Ok(self.load_versioned(key)?.0)
    }

    pub fn load_versioned<T: DeserializeOwned>(&self, key: &str) -> StoreResult<(Vec<T>, u64)> {
        match self.store.get(key)? {
            Some(entry) => {
                let items = serde_json::from_str(&entry.value)?;
                Ok((items, entry.revision))
            }
            None => Ok((Vec::new(), 0)),
        }
    }

    pub fn save<T: Serialize>(&self, key: &str, items: &[T]) -> StoreResult<u64> {
        let json = serde_json::to_string(items)?;
        self.store.set(key, json)
    }

    pub fn save_if<T: Serialize>(&self, key: &str, expected_revision: u64, items: &[T]) -> StoreResult<u64> {
        let json = serde_json::to_string(items)?;
        self.store.compare_and_set(key, expected_revision, json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStore;

    #[test]
    fn test_missing_collection_is_empty() {
        let collections = Collections::new(Arc::new(MemoryStore::new()));
        let (items, revision) = collections.load_versioned::<String>("nothing").unwrap();
        assert!(items.is_empty());
        assert_eq!(revision, 0);
    }

    #[test]
    fn test_save_if_rejects_stale_revision() {
        let collections = Collections::new(Arc::new(MemoryStore::new()));
        collections.save("ids", &["a".to_string()]).unwrap();

        let (_, revision) = collections.load_versioned::<String>("ids").unwrap();
        collections.save("ids", &["b".to_string()]).unwrap();

        let result = collections.save_if("ids", revision, &["c".to_string()]);
        assert!(matches!(
            result,
            Err(StoreError::RevisionMismatch { expected: 1, actual: 2, .. })
        ));
        assert_eq!(collections.load::<String>("ids").unwrap(), vec!["b".to_string()]);
    }
}
