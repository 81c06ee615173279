//! Error handling module for toolshelf
//!
//! Provides centralized error handling with proper error types using thiserror.
//! Structural and reference problems are not errors; they are returned as
//! reports from [`crate::validation`].

use crate::collection::ModelError;
use crate::snapshot::{SnapshotError, SnapshotId};
use thiserror::Error;

/// Main error type for toolshelf
#[derive(Error, Debug)]
pub enum ShelfError {
    /// IO errors outside snapshot reads and writes (directories, preferences)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Out-of-range index passed to a direct store call
    #[error("Index error: {0}")]
    Index(#[from] ModelError),

    /// A snapshot could not be loaded; the active collection is unchanged
    #[error("Failed to load {id}: {source}")]
    Load {
        id: SnapshotId,
        #[source]
        source: SnapshotError,
    },

    /// The active collection could not be written; it stays dirty
    #[error("Failed to save {id}: {source}")]
    Save {
        id: SnapshotId,
        #[source]
        source: SnapshotError,
    },

    /// An operation needed an active collection and none is loaded
    #[error("No active collection")]
    NoActiveCollection,

    /// Discovery index outside the discovered list
    #[error("No snapshot at index {index} ({count} discovered)")]
    UnknownSnapshot { index: usize, count: usize },

    /// Structural validation refused an operation
    #[error("Validation error: {0}")]
    Invalid(String),

    /// Preference store content could not be parsed or written
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for toolshelf operations
pub type Result<T> = std::result::Result<T, ShelfError>;

impl ShelfError {
    /// Create a validation error
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::Invalid(msg.into())
    }

    /// True for failures that leave the previous state fully intact
    pub fn is_load_failure(&self) -> bool {
        matches!(self, Self::Load { .. } | Self::UnknownSnapshot { .. })
    }
}
