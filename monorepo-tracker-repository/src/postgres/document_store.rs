use std::collections::HashMap;

use async_trait::async_trait;
use monorepo_tracker_shared::Document;
use sqlx::postgres::PgPoolOptions;
use tracing::{debug, info, instrument};

use crate::config::PostgresStoreConfig;
use crate::errors::DocumentStoreError;
use crate::interfaces::DocumentStore;
use crate::types::BulkGetRow;

/// PostgreSQL-backed document store.
///
/// Every operation is a single statement, so concurrent writers to the same id
/// resolve as last-writer-wins and a bulk read observes one snapshot.
pub struct PostgresDocumentStore {
    /// PostgreSQL connection pool
    pool: sqlx::PgPool,
}

impl PostgresDocumentStore {
    /// Connect to the database with the default pool configuration.
    pub async fn new(database_url: &str) -> Result<Self, DocumentStoreError> {
        Self::with_config(database_url, &PostgresStoreConfig::default()).await
    }

    /// Connect to the database with a custom pool configuration.
    ///
    /// # Arguments
    ///
    /// * `database_url` - PostgreSQL connection URL
    /// * `config` - Pool size and acquire timeout
    ///
    /// # Returns
    ///
    /// * `Ok(PostgresDocumentStore)` - Ready-to-use store (call `migrate` once at startup)
    /// * `Err(DocumentStoreError)` - If the pool cannot connect
    pub async fn with_config(
        database_url: &str,
        config: &PostgresStoreConfig,
    ) -> Result<Self, DocumentStoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect(database_url)
            .await?;

        info!(
            max_connections = config.max_connections,
            "Connected PostgreSQL document store"
        );

        Ok(Self { pool })
    }

    /// Wrap an existing pool. The schema must already exist.
    pub fn from_pool(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }

    /// Apply the embedded schema migrations.
    pub async fn migrate(&self) -> Result<(), DocumentStoreError> {
        sqlx::migrate!("./src/postgres/migrations")
            .run(&self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for PostgresDocumentStore {
    #[instrument(skip(self))]
    async fn get(&self, id: &str) -> Result<Option<Document>, DocumentStoreError> {
        let body: Option<serde_json::Value> =
            sqlx::query_scalar("SELECT body FROM documents WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(body.map(|body| Document::new(id, body)))
    }

    #[instrument(skip(self, keys), fields(key_count = keys.len()))]
    async fn bulk_get(&self, keys: &[String]) -> Result<Vec<BulkGetRow>, DocumentStoreError> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }

        let rows: Vec<(String, serde_json::Value)> =
            sqlx::query_as("SELECT id, body FROM documents WHERE id = ANY($1)")
                .bind(keys)
                .fetch_all(&self.pool)
                .await?;

        debug!(found = rows.len(), "Bulk read completed");

        let found: HashMap<String, serde_json::Value> = rows.into_iter().collect();

        // Reassemble in input order. A key repeated in the input gets the same
        // answer each time.
        Ok(keys
            .iter()
            .map(|key| match found.get(key) {
                Some(body) => BulkGetRow::from_body(key.clone(), body.clone()),
                None => BulkGetRow::Missing { key: key.clone() },
            })
            .collect())
    }

    #[instrument(skip(self, document), fields(id = %document.id))]
    async fn put(&self, document: &Document) -> Result<(), DocumentStoreError> {
        sqlx::query(
            "INSERT INTO documents (id, body, updated_at) VALUES ($1, $2, now()) \
             ON CONFLICT (id) DO UPDATE SET body = EXCLUDED.body, updated_at = now()",
        )
        .bind(&document.id)
        .bind(&document.body)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: &str) -> Result<(), DocumentStoreError> {
        sqlx::query("DELETE FROM documents WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn query_by_prefix(&self, prefix: &str) -> Result<Vec<Document>, DocumentStoreError> {
        // `left()` instead of LIKE so `%` and `_` in ids need no escaping.
        let rows: Vec<(String, serde_json::Value)> = sqlx::query_as(
            "SELECT id, body FROM documents WHERE left(id, length($1)) = $1 \
             ORDER BY id COLLATE \"C\"",
        )
        .bind(prefix)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(id, body)| Document::new(id, body))
            .collect())
    }
}
