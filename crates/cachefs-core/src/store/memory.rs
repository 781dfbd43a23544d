//! In-memory blob store backend.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::FsResult;
use crate::store::BlobStore;
use crate::types::Blob;

/// In-memory backend: a mutex-guarded map from key to blob.
///
/// The default store for tests and short-lived mounts. Per-key get/put/delete
/// are atomic under the mutex.
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Blob>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Number of keys currently held. Exposed for consistency checks.
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BlobStore for MemoryStore {
    async fn get(&self, key: &str) -> FsResult<Option<Blob>> {
        let entries = self.entries.lock().unwrap();
        Ok(entries.get(key).cloned())
    }

    async fn put(&self, key: &str, blob: Blob) -> FsResult<()> {
        let mut entries = self.entries.lock().unwrap();
        entries.insert(key.to_string(), blob);
        Ok(())
    }

    async fn delete(&self, key: &str) -> FsResult<()> {
        let mut entries = self.entries.lock().unwrap();
        entries.remove(key);
        Ok(())
    }
}
