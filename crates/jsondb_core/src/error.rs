//! Error types for store operations.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Coarse classification of a [`StoreError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Empty or malformed collection name or key.
    InvalidArgument,
    /// The collection or record does not exist.
    NotFound,
    /// The filesystem rejected an operation.
    Io,
    /// A value could not be serialized to JSON.
    Encode,
    /// Stored content could not be deserialized.
    Decode,
}

/// Errors that can occur in store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// An argument was empty or would escape the store root.
    #[error("invalid argument: {message}")]
    InvalidArgument {
        /// What was wrong with the argument.
        message: String,
    },

    /// The addressed collection or record does not exist.
    #[error("unable to find {path:?}")]
    NotFound {
        /// The collection/key path as addressed by the caller.
        path: String,
    },

    /// A filesystem operation failed.
    #[error("I/O error while {operation} {}: {source}", .path.display())]
    Io {
        /// The operation that failed (e.g. "renaming").
        operation: &'static str,
        /// The path the operation was applied to.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: io::Error,
    },

    /// The caller's value could not be encoded.
    #[error("failed to encode record {collection}/{key}: {source}")]
    Encode {
        /// Target collection.
        collection: String,
        /// Target key.
        key: String,
        /// The underlying serializer error.
        #[source]
        source: serde_json::Error,
    },

    /// Stored content could not be decoded into the requested type.
    #[error("failed to decode record {path:?}: {source}")]
    Decode {
        /// The collection/key path that was read.
        path: String,
        /// The underlying deserializer error.
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    /// Creates an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound { path: path.into() }
    }

    /// Creates an I/O error bound to the path it occurred on.
    pub fn io(operation: &'static str, path: &Path, source: io::Error) -> Self {
        Self::Io {
            operation,
            path: path.to_path_buf(),
            source,
        }
    }

    /// Returns the classification of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidArgument { .. } => ErrorKind::InvalidArgument,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Io { .. } => ErrorKind::Io,
            Self::Encode { .. } => ErrorKind::Encode,
            Self::Decode { .. } => ErrorKind::Decode,
        }
    }

    /// Returns true if the target collection or record does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }
}
