//! In-process object store

use super::BlobStore;
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

type Objects = BTreeMap<(String, String), Vec<u8>>;

/// Keeps objects in memory, keyed by `(container, key)`
///
/// Clones share the same underlying map, so a test can hand one clone to
/// the pipeline and inspect the other afterwards.
#[derive(Clone, Debug, Default)]
pub struct MemoryBlobStore {
    objects: Arc<Mutex<Objects>>,
}

impl MemoryBlobStore {
    /// Empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Body of an object, if present
    pub fn get(&self, container: &str, key: &str) -> Option<Vec<u8>> {
        self.lock()
            .get(&(container.to_string(), key.to_string()))
            .cloned()
    }

    /// Keys stored in `container`, sorted
    pub fn keys(&self, container: &str) -> Vec<String> {
        self.lock()
            .keys()
            .filter(|(c, _)| c == container)
            .map(|(_, k)| k.clone())
            .collect()
    }

    /// Total number of objects across all containers
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// True when nothing has been written
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Objects> {
        // a poisoned map is still a valid map
        self.objects
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(&self, container: &str, key: &str, body: Vec<u8>) -> Result<()> {
        if container.is_empty() || key.is_empty() {
            return Err(Error::StorageWrite {
                key: key.to_string(),
                reason: "container and key must not be empty".to_string(),
            });
        }
        self.lock()
            .insert((container.to_string(), key.to_string()), body);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
