//! Document store trait definition.
//!
//! This module defines the abstract interface the tracker needs from its
//! persistence layer, allowing different backends (PostgreSQL, in-memory, etc.).

use async_trait::async_trait;
use monorepo_tracker_shared::Document;

use crate::errors::DocumentStoreError;
use crate::types::BulkGetRow;

/// Abstracts the underlying document store (PostgreSQL, in-memory, etc.).
///
/// Implementations are injected into the convergence checker and the pending
/// tracker as `Arc<dyn DocumentStore>`, which keeps the core independent of the
/// storage engine and lets tests substitute mock stores.
///
/// All methods return `Result<T, DocumentStoreError>`. An `Err` always means
/// the store as a whole failed; a single missing key is never an error.
///
/// # Concurrency
///
/// Implementations must be safe to call from many tasks at once. Writes to the
/// same id are last-writer-wins; no method spans more than one statement.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch a single document by id.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(Document))` - If the document exists
    /// * `Ok(None)` - If no document has this id
    /// * `Err(DocumentStoreError)` - If the store could not be read
    async fn get(&self, id: &str) -> Result<Option<Document>, DocumentStoreError>;

    /// Fetch many documents in one batched read.
    ///
    /// The result holds exactly one row per input key, in input order. All rows
    /// come from a single query so they reflect approximately the same snapshot.
    ///
    /// # Arguments
    ///
    /// * `keys` - Document ids to read
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<BulkGetRow>)` - One `Found`, `Missing` or `Error` row per key
    /// * `Err(DocumentStoreError)` - If the batch read failed entirely
    async fn bulk_get(&self, keys: &[String]) -> Result<Vec<BulkGetRow>, DocumentStoreError>;

    /// Insert or replace a document by id.
    async fn put(&self, document: &Document) -> Result<(), DocumentStoreError>;

    /// Delete a document by id.
    ///
    /// Deleting an id that does not exist is considered successful.
    async fn delete(&self, id: &str) -> Result<(), DocumentStoreError>;

    /// List every document whose id starts with `prefix`, ordered by id.
    ///
    /// An empty result is not an error.
    async fn query_by_prefix(&self, prefix: &str) -> Result<Vec<Document>, DocumentStoreError>;
}
