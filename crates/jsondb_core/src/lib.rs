//! # jsondb core
//!
//! A small document store that keeps every record as its own JSON file.
//!
//! ```text
//! <root>/
//! ├─ users/
//! │  ├─ 42.json
//! │  └─ 43.json
//! └─ posts/
//!    └─ hello-world.json
//! ```
//!
//! Collections are directories created on first write. Records are
//! committed with write-then-rename so a reader never sees a partial file,
//! and mutations of one collection are serialized by a per-collection lock
//! while different collections proceed in parallel.
//!
//! ## Example
//!
//! ```rust
//! use jsondb_core::Store;
//! use serde_json::json;
//!
//! let dir = tempfile::tempdir().unwrap();
//! let store = Store::open(dir.path()).unwrap();
//!
//! store.write("users", "42", &json!({"name": "Andra"})).unwrap();
//! assert_eq!(store.read("users", "42.json").unwrap(), store.read("users", "42").unwrap());
//!
//! store.delete_collection("users").unwrap();
//! assert!(store.read_all("users").unwrap_err().is_not_found());
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod locks;
mod logger;
pub mod path;
mod store;

pub use config::{Config, UpdateMode};
pub use error::{ErrorKind, StoreError, StoreResult};
pub use locks::LockRegistry;
pub use logger::{LogLevel, Logger, NoopLogger, TracingLogger};
pub use path::{RECORD_EXTENSION, TEMP_SUFFIX};
pub use store::Store;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
