//! # Monorepo Tracker Repository
//!
//! This crate provides the document store abstraction the monorepo tracker reads
//! registry entries from and writes pending markers to. It includes definitions for
//! errors, the `DocumentStore` interface, an in-memory implementation for
//! development and tests, and a concrete implementation for PostgreSQL.

pub mod config;
pub mod errors;
pub mod interfaces;
pub mod memory;
pub mod postgres;
pub mod source;
pub mod types;

pub use config::PostgresStoreConfig;
pub use errors::DocumentStoreError;
pub use interfaces::DocumentStore;
pub use memory::MemoryDocumentStore;
pub use postgres::PostgresDocumentStore;
pub use source::StoreSource;
pub use types::BulkGetRow;
