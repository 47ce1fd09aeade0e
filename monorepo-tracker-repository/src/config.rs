//! Configuration types for the PostgreSQL document store.

use std::time::Duration;

/// Connection pool settings for `PostgresDocumentStore`.
///
/// The tracker issues short single-statement queries, so a small pool is
/// enough even with many concurrent publish events.
#[derive(Debug, Clone)]
pub struct PostgresStoreConfig {
    /// Maximum number of pooled connections.
    pub max_connections: u32,

    /// How long to wait for a free connection before failing the operation.
    pub acquire_timeout: Duration,
}

impl Default for PostgresStoreConfig {
    fn default() -> Self {
        Self {
            max_connections: 20,
            acquire_timeout: Duration::from_secs(10),
        }
    }
}

impl PostgresStoreConfig {
    /// Create a config with a custom pool size.
    ///
    /// # Arguments
    ///
    /// * `max_connections` - Maximum number of pooled connections
    pub fn with_max_connections(max_connections: u32) -> Self {
        Self {
            max_connections,
            ..Self::default()
        }
    }
}
