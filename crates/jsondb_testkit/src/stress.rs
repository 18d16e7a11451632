//! Stress runners for jsondb.
//!
//! These exercise the store under concurrent writers and check that
//! per-collection mutual exclusion holds.

use jsondb_core::Store;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::{Duration, Instant};

/// Result of a stress test run.
#[derive(Debug, Clone)]
pub struct StressTestResult {
    /// Total operations performed.
    pub total_ops: usize,
    /// Successful operations.
    pub successful_ops: usize,
    /// Failed operations.
    pub failed_ops: usize,
    /// Total duration.
    pub duration: Duration,
    /// Operations per second.
    pub ops_per_second: f64,
}

impl StressTestResult {
    /// Creates a new result.
    pub fn new(successful: usize, failed: usize, duration: Duration) -> Self {
        let total = successful + failed;
        let ops_per_second = if duration.as_secs_f64() > 0.0 {
            total as f64 / duration.as_secs_f64()
        } else {
            0.0
        };

        Self {
            total_ops: total,
            successful_ops: successful,
            failed_ops: failed,
            duration,
            ops_per_second,
        }
    }
}

/// Configuration for stress tests.
#[derive(Debug, Clone)]
pub struct StressConfig {
    /// Operations per thread.
    pub operations: usize,
    /// Number of concurrent threads.
    pub threads: usize,
    /// Size of each record's payload string in bytes.
    pub payload_size: usize,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            operations: 50,
            threads: 4,
            payload_size: 4 * 1024,
        }
    }
}

/// The record thread `writer` writes on its `op`-th operation.
pub fn stress_record(writer: usize, op: usize, payload_size: usize) -> Value {
    let fill = char::from(b'a' + (writer % 26) as u8);
    json!({
        "writer": writer,
        "op": op,
        "payload": fill.to_string().repeat(payload_size),
    })
}

fn run_threads<F>(store: &Arc<Store>, config: &StressConfig, op: F) -> StressTestResult
where
    F: Fn(&Store, usize, usize) -> bool + Send + Sync + 'static,
{
    let successful = Arc::new(AtomicUsize::new(0));
    let failed = Arc::new(AtomicUsize::new(0));
    let barrier = Arc::new(Barrier::new(config.threads));
    let op = Arc::new(op);

    let start = Instant::now();
    let handles: Vec<_> = (0..config.threads)
        .map(|writer| {
            let store = Arc::clone(store);
            let successful = Arc::clone(&successful);
            let failed = Arc::clone(&failed);
            let barrier = Arc::clone(&barrier);
            let op = Arc::clone(&op);
            let operations = config.operations;

            thread::spawn(move || {
                barrier.wait();
                for i in 0..operations {
                    if (*op)(store.as_ref(), writer, i) {
                        successful.fetch_add(1, Ordering::Relaxed);
                    } else {
                        failed.fetch_add(1, Ordering::Relaxed);
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        if handle.join().is_err() {
            failed.fetch_add(1, Ordering::Relaxed);
        }
    }

    StressTestResult::new(
        successful.load(Ordering::Relaxed),
        failed.load(Ordering::Relaxed),
        start.elapsed(),
    )
}

/// All threads repeatedly overwrite the same `(collection, key)`.
pub fn stress_same_key_writes(
    store: &Arc<Store>,
    collection: &str,
    key: &str,
    config: &StressConfig,
) -> StressTestResult {
    let collection = collection.to_string();
    let key = key.to_string();
    let payload_size = config.payload_size;

    run_threads(store, config, move |store, writer, i| {
        store
            .write(&collection, &key, &stress_record(writer, i, payload_size))
            .is_ok()
    })
}

/// Each thread writes distinct keys into its own collection
/// `<prefix>_<thread>`.
pub fn stress_cross_collection_writes(
    store: &Arc<Store>,
    prefix: &str,
    config: &StressConfig,
) -> StressTestResult {
    let prefix = prefix.to_string();
    let payload_size = config.payload_size;

    run_threads(store, config, move |store, writer, i| {
        store
            .write(
                &format!("{prefix}_{writer}"),
                &format!("r{i:06}"),
                &stress_record(writer, i, payload_size),
            )
            .is_ok()
    })
}

/// Half the threads update an existing record while the other half read
/// it. Reads may see a transient not-found under the default update mode;
/// those are counted as failures but must never observe torn content.
pub fn stress_update_while_reading(
    store: &Arc<Store>,
    collection: &str,
    key: &str,
    config: &StressConfig,
) -> StressTestResult {
    let collection = collection.to_string();
    let key = key.to_string();
    let payload_size = config.payload_size;

    run_threads(store, config, move |store, writer, i| {
        if writer % 2 == 0 {
            store
                .update(&collection, &key, &stress_record(writer, i, payload_size))
                .is_ok()
        } else {
            match store.read(&collection, &key) {
                Ok(content) => is_intact_record(&content, payload_size),
                Err(_) => false,
            }
        }
    })
}

/// Returns true if `content` decodes to a record produced by
/// [`stress_record`] with an unbroken payload.
pub fn is_intact_record(content: &str, payload_size: usize) -> bool {
    let Ok(value) = serde_json::from_str::<Value>(content) else {
        return false;
    };
    let (Some(writer), Some(payload)) = (value["writer"].as_u64(), value["payload"].as_str())
    else {
        return false;
    };
    let fill = char::from(b'a' + (writer % 26) as u8);
    payload.len() == payload_size && payload.chars().all(|c| c == fill)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::TestStore;
    use jsondb_core::{Config, NoopLogger, UpdateMode};
    use tempfile::TempDir;

    fn shared_store(config: Config) -> (TempDir, Arc<Store>) {
        TestStore::with_config(config).into_shared()
    }

    fn quiet() -> Config {
        Config::new().logger(Arc::new(NoopLogger)).sync_writes(false)
    }

    #[test]
    fn same_key_writes_leave_one_intact_record() {
        let (_guard, store) = shared_store(quiet());
        let config = StressConfig {
            operations: 20,
            threads: 4,
            payload_size: 8 * 1024,
        };

        let result = stress_same_key_writes(&store, "shared", "k", &config);
        assert_eq!(result.failed_ops, 0);
        assert_eq!(result.successful_ops, 80);
        assert_eq!(result.total_ops, 80);
        assert!(result.ops_per_second > 0.0);

        let content = store.read("shared", "k").unwrap();
        assert!(is_intact_record(&content, config.payload_size));
        assert_eq!(store.keys("shared").unwrap(), vec!["k"]);
    }

    #[test]
    fn cross_collection_writes_all_land() {
        let (_guard, store) = shared_store(quiet());
        let config = StressConfig {
            operations: 10,
            threads: 4,
            payload_size: 64,
        };

        let result = stress_cross_collection_writes(&store, "col", &config);
        assert_eq!(result.failed_ops, 0);
        for t in 0..config.threads {
            assert_eq!(store.keys(&format!("col_{t}")).unwrap().len(), 10);
        }
    }

    #[test]
    fn replace_mode_readers_always_see_a_record() {
        let (_guard, store) = shared_store(quiet().update_mode(UpdateMode::Replace));
        let config = StressConfig {
            operations: 25,
            threads: 4,
            payload_size: 2 * 1024,
        };
        store
            .write("hot", "k", &stress_record(0, 0, config.payload_size))
            .unwrap();

        let result = stress_update_while_reading(&store, "hot", "k", &config);
        assert_eq!(result.failed_ops, 0);
        assert!(is_intact_record(
            &store.read("hot", "k").unwrap(),
            config.payload_size
        ));
    }

    #[test]
    fn throughput_from_counts() {
        let result = StressTestResult::new(90, 10, Duration::from_secs(2));
        assert_eq!(result.total_ops, 100);
        assert!((result.ops_per_second - 50.0).abs() < f64::EPSILON);

        let instant = StressTestResult::new(5, 0, Duration::ZERO);
        assert_eq!(instant.ops_per_second, 0.0);
    }

    #[test]
    fn intact_record_check() {
        let record = stress_record(3, 1, 16).to_string();
        assert!(is_intact_record(&record, 16));
        assert!(!is_intact_record(&record, 17));
        assert!(!is_intact_record(&record[..record.len() - 4], 16));
    }
}
