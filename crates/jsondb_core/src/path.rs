//! On-disk layout and path resolution.
//!
//! ```text
//! <root>/
//! └─ <collection>/
//!    ├─ <key>.json        # committed record
//!    └─ <key>.json.tmp    # in-flight (or abandoned) write
//! ```
//!
//! Callers may address a record either by its bare key or by its file name
//! (`"42"` and `"42.json"` both resolve to `42.json`).

use crate::error::{StoreError, StoreResult};
use std::ffi::OsString;
use std::fs::{self, Metadata};
use std::io;
use std::path::{Component, Path, PathBuf};

/// Extension of committed record files.
pub const RECORD_EXTENSION: &str = "json";

/// Suffix appended to a record's file name while it is being written.
pub const TEMP_SUFFIX: &str = ".tmp";

/// Lexically normalizes a path: drops `.` components and folds `..` into
/// the preceding component where possible. Does not touch the filesystem.
#[must_use]
pub fn clean(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                // `/..` is `/`
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}

/// Checks a collection name and returns its canonical form: the normal
/// components joined by `/`, so `"./users/"` and `"users"` name the same
/// collection.
///
/// The name must be non-empty, relative and free of `..`. Nested
/// collections (`"users/archive"`) are allowed.
pub fn validate_collection(collection: &str) -> StoreResult<String> {
    if collection.is_empty() {
        return Err(StoreError::invalid_argument(
            "missing collection, no place to store data",
        ));
    }
    let mut segments = Vec::new();
    for component in Path::new(collection).components() {
        match component {
            Component::Normal(segment) => match segment.to_str() {
                Some(segment) => segments.push(segment),
                None => return Err(escapes_root(collection)),
            },
            Component::CurDir => {}
            _ => return Err(escapes_root(collection)),
        }
    }
    if segments.is_empty() {
        return Err(escapes_root(collection));
    }
    Ok(segments.join("/"))
}

fn escapes_root(collection: &str) -> StoreError {
    StoreError::invalid_argument(format!(
        "collection {collection:?} must be a relative path inside the store"
    ))
}

/// Checks a record key: non-empty, a single path segment, not `.` or `..`.
pub fn validate_key(key: &str) -> StoreResult<()> {
    if key.is_empty() {
        return Err(StoreError::invalid_argument(
            "missing key, no identifier for the record",
        ));
    }
    let mut components = Path::new(key).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(segment)), None) if segment == key => Ok(()),
        _ => Err(StoreError::invalid_argument(format!(
            "key {key:?} must be a single file name segment"
        ))),
    }
}

/// File name of the record stored under `key`.
#[must_use]
pub fn record_file_name(key: &str) -> String {
    format!("{key}.{RECORD_EXTENSION}")
}

/// `path` with the record extension appended (not substituted).
#[must_use]
pub fn with_record_extension(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".");
    name.push(RECORD_EXTENSION);
    PathBuf::from(name)
}

/// Temporary sibling used while writing `final_path`.
#[must_use]
pub fn temp_path(final_path: &Path) -> PathBuf {
    let mut name = OsString::from(final_path.as_os_str());
    name.push(TEMP_SUFFIX);
    PathBuf::from(name)
}

/// Returns the record key for a directory entry name, or `None` if the
/// entry is not a committed record file.
#[must_use]
pub fn key_from_file_name(name: &str) -> Option<&str> {
    name.strip_suffix(RECORD_EXTENSION)
        .and_then(|stem| stem.strip_suffix('.'))
        .filter(|stem| !stem.is_empty())
}

/// Resolves the first existing entry among `base` and `base.json`.
///
/// Only `NotFound` moves on to the next candidate; any other stat failure
/// is returned.
pub fn resolve_entry(base: &Path) -> io::Result<Option<(PathBuf, Metadata)>> {
    for candidate in [base.to_path_buf(), with_record_extension(base)] {
        match fs::metadata(&candidate) {
            Ok(metadata) => return Ok(Some((candidate, metadata))),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e),
        }
    }
    Ok(None)
}

/// Resolves the first regular file among `base` and `base.json`.
pub fn find_record_file(base: &Path) -> io::Result<Option<PathBuf>> {
    for candidate in [base.to_path_buf(), with_record_extension(base)] {
        match fs::metadata(&candidate) {
            Ok(metadata) if metadata.is_file() => return Ok(Some(candidate)),
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e),
        }
    }
    Ok(None)
}
