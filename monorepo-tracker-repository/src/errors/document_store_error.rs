//! Document store error types.
//!
//! Any error surfaced by a `DocumentStore` means the store itself could not
//! serve the request. Individual missing or unreadable keys inside a bulk read
//! are not errors; they are reported per row (see `BulkGetRow`).

use thiserror::Error;

/// Errors from document store operations.
///
/// Used by the `DocumentStore` trait for every operation. Callers treat all
/// variants as the store being unavailable and do not retry on their own.
#[derive(Debug, Error)]
pub enum DocumentStoreError {
    /// The database rejected the query or the connection failed.
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    /// Applying schema migrations failed.
    #[error("Migration error: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),

    /// A document body could not be encoded for storage.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// The backend is unreachable or refused the operation.
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl DocumentStoreError {
    /// Create an unavailable error.
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }
}
