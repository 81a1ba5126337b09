use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::{BlobError, BlobResult, BlobStore};

/// Named storage backends of one uploader.
///
/// Membership can change while requests are in flight, so callers resolve a
/// key every time they need a store instead of holding on to the `Arc`.
/// `resolve` only clones the `Arc` under the read lock; no I/O ever happens
/// while the lock is held.
#[derive(Default)]
pub struct StorageRegistry {
    stores: RwLock<HashMap<String, Arc<dyn BlobStore>>>,
}

impl StorageRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a store under a given key, replacing any previous one.
    pub fn register<K>(&self, key: K, store: Arc<dyn BlobStore>)
    where
        K: Into<String>,
    {
        let key = key.into();
        debug!(storage = %key, "registering store");
        self.stores.write().insert(key, store);
    }

    /// Remove a store. Requests resolved afterwards see it as missing.
    pub fn remove(&self, key: &str) -> Option<Arc<dyn BlobStore>> {
        debug!(storage = %key, "removing store");
        self.stores.write().remove(key)
    }

    /// Look up a store by key.
    pub fn resolve(&self, key: &str) -> BlobResult<Arc<dyn BlobStore>> {
        self.stores
            .read()
            .get(key)
            .cloned()
            .ok_or_else(|| BlobError::storage_not_found(key))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.stores.read().contains_key(key)
    }

    /// Registered keys in sorted order
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.stores.read().keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Independent copy holding the same stores.
    ///
    /// Registering or removing on the copy leaves `self` untouched.
    pub fn snapshot(&self) -> Self {
        Self {
            stores: RwLock::new(self.stores.read().clone()),
        }
    }
}

impl std::fmt::Debug for StorageRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageRegistry")
            .field("keys", &self.keys())
            .finish()
    }
}
