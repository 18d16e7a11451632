//! Per-collection lock registry.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// Maps collection names to the mutex that serializes their mutations.
///
/// The registry mutex is held only for lookup/insert. The returned
/// per-collection mutex is held by the caller for its whole critical
/// section, so operations on different collections never contend.
/// Entries are never removed.
#[derive(Debug, Default)]
pub struct LockRegistry {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl LockRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the lock for `collection`, creating it on first use.
    pub fn get_or_create(&self, collection: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock();
        if let Some(lock) = locks.get(collection) {
            return Arc::clone(lock);
        }
        let lock = Arc::new(Mutex::new(()));
        locks.insert(collection.to_string(), Arc::clone(&lock));
        lock
    }

    /// Number of collections that have been locked at least once.
    #[must_use]
    pub fn len(&self) -> usize {
        self.locks.lock().len()
    }

    /// Returns true if no lock has been created yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
