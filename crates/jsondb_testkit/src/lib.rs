//! # jsondb testkit
//!
//! Test utilities for jsondb.
//!
//! This crate provides:
//! - Temporary store fixtures and scenario builders
//! - Property-based test generators using proptest
//! - A logger that captures messages for assertions
//! - Stress runners for concurrent writers
//! - Crash helpers that leave interrupted writes on disk
//!
//! ## Usage
//!
//! ```rust,ignore
//! use jsondb_testkit::prelude::*;
//!
//! #[test]
//! fn test_with_store() {
//!     with_temp_store(|store| {
//!         store.write("users", "a", &1).unwrap();
//!     });
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod crash;
pub mod fixtures;
pub mod generators;
pub mod logging;
pub mod stress;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::crash::*;
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::logging::*;
    pub use crate::stress::*;
}

pub use crash::*;
pub use fixtures::*;
pub use generators::*;
pub use logging::*;
pub use stress::*;
