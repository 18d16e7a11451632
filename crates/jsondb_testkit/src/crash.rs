//! Crash simulation for jsondb.
//!
//! A write commits by renaming a fully written temporary file over the
//! record. These helpers put the on-disk state a crash would leave at
//! each point of that protocol, so tests can check what readers see
//! afterwards.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use jsondb_testkit::crash::{simulate_crash, CrashPoint};
//!
//! simulate_crash(&store, "users", "42", CrashPoint::DuringTempWrite, b"{\"v\":2}")?;
//! assert_eq!(store.read("users", "42")?, committed);
//! ```

use jsondb_core::{path, Store, StoreError, StoreResult};
use std::fs;
use std::io;
use std::path::PathBuf;

/// Points at which a write can be interrupted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrashPoint {
    /// Crash after the collection directory was created, before any bytes.
    BeforeTempWrite,
    /// Crash halfway through writing the temporary file.
    DuringTempWrite,
    /// Crash after the temporary file is complete but before the rename.
    BeforeRename,
}

impl CrashPoint {
    /// Every crash point, in protocol order.
    pub const ALL: [CrashPoint; 3] = [
        CrashPoint::BeforeTempWrite,
        CrashPoint::DuringTempWrite,
        CrashPoint::BeforeRename,
    ];
}

/// Returns the temporary path a write of `key` into `collection` uses.
pub fn temp_path_for(store: &Store, collection: &str, key: &str) -> PathBuf {
    path::temp_path(
        &store
            .collection_path(collection)
            .join(path::record_file_name(key)),
    )
}

/// Leaves the on-disk state of a write of `bytes` interrupted at `point`.
///
/// Returns the path of the temporary file, if one was left behind.
pub fn simulate_crash(
    store: &Store,
    collection: &str,
    key: &str,
    point: CrashPoint,
    bytes: &[u8],
) -> io::Result<Option<PathBuf>> {
    fs::create_dir_all(store.collection_path(collection))?;
    let temp = temp_path_for(store, collection, key);

    match point {
        CrashPoint::BeforeTempWrite => Ok(None),
        CrashPoint::DuringTempWrite => {
            fs::write(&temp, &bytes[..bytes.len() / 2])?;
            Ok(Some(temp))
        }
        CrashPoint::BeforeRename => {
            fs::write(&temp, bytes)?;
            Ok(Some(temp))
        }
    }
}

/// Result of a crash check.
#[derive(Debug, Clone)]
pub struct CrashCheck {
    /// The crash point exercised.
    pub point: CrashPoint,
    /// What `read` returned afterwards (`None` if not found).
    pub visible: Option<String>,
    /// Number of records `read_all` returned afterwards.
    pub listed: usize,
}

/// Commits `committed` (if any) under `key`, interrupts a second write at
/// `point`, and reports what readers observe.
pub fn check_crash(
    store: &Store,
    collection: &str,
    key: &str,
    committed: Option<&serde_json::Value>,
    point: CrashPoint,
) -> StoreResult<CrashCheck> {
    if let Some(value) = committed {
        store.write(collection, key, value)?;
    }

    let dir = store.collection_path(collection);
    simulate_crash(store, collection, key, point, b"{\n\t\"interrupted\": true\n}\n")
        .map_err(|e| StoreError::io("simulating crash in", &dir, e))?;

    let visible = match store.read(collection, key) {
        Ok(content) => Some(content),
        Err(e) if e.is_not_found() => None,
        Err(e) => return Err(e),
    };
    let listed = store.read_all(collection)?.len();

    Ok(CrashCheck {
        point,
        visible,
        listed,
    })
}
