use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, info};

use crate::kv::{Entry, KeyValueStore, StoreError, StoreResult};

#[derive(Serialize, Deserialize)]
struct Envelope {
    revision: u64,
    data: serde_json::Value,
}

/// One JSON file per key under a data directory.
pub struct FileStore {
    root: PathBuf,
    // Serializes read-modify-write cycles within this process.
    write_lock: Mutex<()>,
}

impl FileStore {
    pub fn open(root: impl Into<PathBuf>) -> StoreResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        info!("File store opened at {}", root.display());
        Ok(Self {
            root,
            write_lock: Mutex::new(()),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> StoreResult<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(format!("{}.json", key)))
    }

    fn read(&self, key: &str) -> StoreResult<Option<Envelope>> {
        let path = self.path_for(key)?;
        if !path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(&path)?;
        Ok(Some(serde_json::from_str(&raw)?))
    }

    fn write(&self, key: &str, revision: u64, value: &str) -> StoreResult<()> {
        let path = self.path_for(key)?;
        let envelope = Envelope {
            revision,
            data: serde_json::from_str(value)?,
        };
        // Write-then-rename so readers never see a half-written file.
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(&envelope)?)?;
        fs::rename(&tmp, &path)?;
        debug!("Persisted {} at revision {}", key, revision);
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> StoreResult<Option<Entry>> {
        Ok(self.read(key)?.map(|envelope| Entry {
            value: envelope.data.to_string(),
            revision: envelope.revision,
        }))
    }

    fn set(&self, key: &str, value: String) -> StoreResult<u64> {
        let _guard = self.write_lock.lock().map_err(|_| StoreError::Poisoned)?;
        let revision = self.read(key)?.map(|e| e.revision).unwrap_or(0) + 1;
        self.write(key, revision, &value)?;
        Ok(revision)
    }

    fn compare_and_set(&self, key: &str, expected_revision: u64, value: String) -> StoreResult<u64> {
        let _guard = self.write_lock.lock().map_err(|_| StoreError::Poisoned)?;
        let actual = self.read(key)?.map(|e| e.revision).unwrap_or(0);

        if actual != expected_revision {
            return Err(StoreError::RevisionMismatch {
                key: key.to_string(),
                expected: expected_revision,
                actual,
            });
        }

        self.write(key, actual + 1, &value)?;
        Ok(actual + 1)
    }
}
