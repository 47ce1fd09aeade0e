//! In-memory document store.
//!
//! Holds documents in an ordered map for the lifetime of the process. Used for
//! local development and unit tests; it has the same observable semantics as
//! the PostgreSQL store (upsert by id, id-ordered prefix scans, per-key rows in
//! bulk reads).

use std::collections::BTreeMap;

use async_trait::async_trait;
use monorepo_tracker_shared::Document;
use tokio::sync::RwLock;

use crate::errors::DocumentStoreError;
use crate::interfaces::DocumentStore;
use crate::types::BulkGetRow;

/// In-memory storage backend for testing/development.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    documents: RwLock<BTreeMap<String, serde_json::Value>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored documents (primarily for tests).
    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    /// Whether the store holds no documents.
    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn get(&self, id: &str) -> Result<Option<Document>, DocumentStoreError> {
        let documents = self.documents.read().await;
        Ok(documents
            .get(id)
            .map(|body| Document::new(id, body.clone())))
    }

    async fn bulk_get(&self, keys: &[String]) -> Result<Vec<BulkGetRow>, DocumentStoreError> {
        // One read guard for the whole batch so every row sees the same state.
        let documents = self.documents.read().await;
        Ok(keys
            .iter()
            .map(|key| match documents.get(key) {
                Some(body) => BulkGetRow::from_body(key.clone(), body.clone()),
                None => BulkGetRow::Missing { key: key.clone() },
            })
            .collect())
    }

    async fn put(&self, document: &Document) -> Result<(), DocumentStoreError> {
        let mut documents = self.documents.write().await;
        documents.insert(document.id.clone(), document.body.clone());
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), DocumentStoreError> {
        let mut documents = self.documents.write().await;
        documents.remove(id);
        Ok(())
    }

    async fn query_by_prefix(&self, prefix: &str) -> Result<Vec<Document>, DocumentStoreError> {
        let documents = self.documents.read().await;
        Ok(documents
            .range(prefix.to_string()..)
            .take_while(|(id, _)| id.starts_with(prefix))
            .map(|(id, body)| Document::new(id.clone(), body.clone()))
            .collect())
    }
}
