//! Error types for the monorepo tracker.

use monorepo_tracker_repository::DocumentStoreError;
use thiserror::Error;

/// Errors that can occur while resolving groups, checking convergence or
/// tracking pending markers.
#[derive(Error, Debug)]
pub enum TrackerError {
    /// The document store failed or could not be reached.
    ///
    /// Never retried here; the caller (or the next sweep tick) decides.
    #[error("Store error: {0}")]
    Store(#[from] DocumentStoreError),

    /// A group name that is not configured.
    #[error("Unknown monorepo group: {0}")]
    UnknownGroup(String),

    /// Group definitions that cannot be loaded.
    #[error("Invalid group definitions: {0}")]
    InvalidGroups(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error encoding or decoding a document body.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Error reading a definitions file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TrackerError {
    /// Create an unknown group error.
    pub fn unknown_group(group: impl Into<String>) -> Self {
        Self::UnknownGroup(group.into())
    }

    /// Create an invalid group definitions error.
    pub fn invalid_groups(msg: impl Into<String>) -> Self {
        Self::InvalidGroups(msg.into())
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
