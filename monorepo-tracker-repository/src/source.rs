//! Backend selection for the document store.
//!
//! ## Usage
//!
//! ```ignore
//! use monorepo_tracker_repository::StoreSource;
//!
//! // Development: use in-memory store
//! let store = StoreSource::mock().into_store().await?;
//!
//! // Production: use PostgreSQL
//! let store = StoreSource::live("postgres://...").into_store().await?;
//! ```

use std::sync::Arc;

use crate::config::PostgresStoreConfig;
use crate::errors::DocumentStoreError;
use crate::interfaces::DocumentStore;
use crate::memory::MemoryDocumentStore;
use crate::postgres::PostgresDocumentStore;

/// Configuration for the document store backend.
///
/// Use this to explicitly choose between mock (in-memory) and live (PostgreSQL) storage.
#[derive(Debug, Clone)]
pub enum StoreSource {
    /// Use the in-memory store for testing/development.
    Mock,

    /// Use PostgreSQL storage.
    Live {
        /// PostgreSQL connection URL
        database_url: String,
        /// Pool settings
        config: PostgresStoreConfig,
    },
}

impl StoreSource {
    /// Create a mock (in-memory) store source.
    pub fn mock() -> Self {
        Self::Mock
    }

    /// Create a live store source with the given PostgreSQL URL.
    pub fn live(database_url: impl Into<String>) -> Self {
        Self::Live {
            database_url: database_url.into(),
            config: PostgresStoreConfig::default(),
        }
    }

    /// Create the store with the appropriate backend.
    ///
    /// The live backend is connected and migrated before it is returned.
    pub async fn into_store(self) -> Result<Arc<dyn DocumentStore>, DocumentStoreError> {
        match self {
            Self::Mock => Ok(Arc::new(MemoryDocumentStore::new())),
            Self::Live {
                database_url,
                config,
            } => {
                let store = PostgresDocumentStore::with_config(&database_url, &config).await?;
                store.migrate().await?;
                Ok(Arc::new(store))
            }
        }
    }
}
