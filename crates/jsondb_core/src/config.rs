//! Store configuration.

use crate::logger::{LogLevel, Logger, TracingLogger};
use std::fmt;
use std::sync::Arc;

/// How [`Store::update`](crate::Store::update) replaces an existing record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UpdateMode {
    /// Delete the record, then write it again, each phase under its own
    /// lock acquisition. A crash between the phases loses the record, and
    /// readers can observe a transient not-found.
    #[default]
    DeleteThenWrite,
    /// Check the record exists and atomically rename the new content over
    /// it, all under one lock acquisition.
    Replace,
}

/// Configuration for opening a store.
#[derive(Clone)]
pub struct Config {
    /// Logger the store reports to.
    pub logger: Arc<dyn Logger>,

    /// Whether to create the root directory if it doesn't exist.
    pub create_if_missing: bool,

    /// Whether to fsync the temporary file and its directory around the
    /// commit rename.
    pub sync_writes: bool,

    /// Strategy used by `update`.
    pub update_mode: UpdateMode,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            logger: Arc::new(TracingLogger::new(LogLevel::Info)),
            create_if_missing: true,
            sync_writes: true,
            update_mode: UpdateMode::DeleteThenWrite,
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("logger", &"<dyn Logger>")
            .field("create_if_missing", &self.create_if_missing)
            .field("sync_writes", &self.sync_writes)
            .field("update_mode", &self.update_mode)
            .finish()
    }
}

impl Config {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the logger.
    #[must_use]
    pub fn logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = logger;
        self
    }

    /// Sets whether to create the root directory if missing.
    #[must_use]
    pub fn create_if_missing(mut self, value: bool) -> Self {
        self.create_if_missing = value;
        self
    }

    /// Sets whether writes are fsynced before and after the rename.
    #[must_use]
    pub fn sync_writes(mut self, value: bool) -> Self {
        self.sync_writes = value;
        self
    }

    /// Sets the update strategy.
    #[must_use]
    pub fn update_mode(mut self, mode: UpdateMode) -> Self {
        self.update_mode = mode;
        self
    }
}
