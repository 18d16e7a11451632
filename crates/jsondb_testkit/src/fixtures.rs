//! Test fixtures and store helpers.
//!
//! Provides convenience functions for setting up temporary stores
//! and common test scenarios.

use jsondb_core::{Config, NoopLogger, Store};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

/// A store in a temporary directory that is removed on drop.
pub struct TestStore {
    /// The store instance.
    pub store: Store,
    /// The temporary directory (kept alive to prevent cleanup).
    temp_dir: TempDir,
}

impl TestStore {
    /// Creates a store with a silent logger.
    pub fn new() -> Self {
        Self::with_config(Config::new().logger(Arc::new(NoopLogger)))
    }

    /// Creates a store with a custom configuration.
    pub fn with_config(config: Config) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store =
            Store::open_with_config(temp_dir.path(), config).expect("Failed to open store");
        Self { store, temp_dir }
    }

    /// Returns the root directory of the store.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Reopens the same directory with a fresh handle and configuration.
    pub fn reopen(self, config: Config) -> Self {
        let Self { store, temp_dir } = self;
        drop(store);
        let store =
            Store::open_with_config(temp_dir.path(), config).expect("Failed to reopen store");
        Self { store, temp_dir }
    }

    /// Splits into a shareable store handle and the directory guard.
    ///
    /// The directory is removed when the returned `TempDir` is dropped.
    pub fn into_shared(self) -> (TempDir, Arc<Store>) {
        (self.temp_dir, Arc::new(self.store))
    }
}

impl Default for TestStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::ops::Deref for TestStore {
    type Target = Store;

    fn deref(&self) -> &Self::Target {
        &self.store
    }
}

/// Runs a test with a temporary store.
///
/// # Example
///
/// ```rust,ignore
/// use jsondb_testkit::with_temp_store;
///
/// #[test]
/// fn my_test() {
///     with_temp_store(|store| {
///         store.write("users", "a", &1).unwrap();
///     });
/// }
/// ```
pub fn with_temp_store<F, R>(f: F) -> R
where
    F: FnOnce(&Store) -> R,
{
    let test_store = TestStore::new();
    f(&test_store.store)
}

/// Test scenario helpers.
pub mod scenarios {
    use super::*;
    use serde_json::json;

    /// Creates a store whose `test` collection holds `record_count` records
    /// keyed `r0000`, `r0001`, ... with content `{"index": i}`.
    pub fn populated_store(record_count: usize) -> TestStore {
        let test_store = TestStore::new();

        for i in 0..record_count {
            test_store
                .write("test", &format!("r{i:04}"), &json!({ "index": i }))
                .expect("Failed to write record");
        }

        test_store
    }

    /// Creates a store with `collection_count` collections named
    /// `collection_0`, `collection_1`, ..., each holding one record.
    pub fn multi_collection_store(collection_count: usize) -> (TestStore, Vec<String>) {
        let test_store = TestStore::new();
        let mut collections = Vec::with_capacity(collection_count);

        for i in 0..collection_count {
            let name = format!("collection_{i}");
            test_store
                .write(&name, "only", &json!({ "collection": i }))
                .expect("Failed to write record");
            collections.push(name);
        }

        (test_store, collections)
    }
}
