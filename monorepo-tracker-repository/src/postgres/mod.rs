//! PostgreSQL implementation of the document store.
//!
//! Documents live in a single `documents` table keyed by id with a JSONB body.
//! Schema migrations are embedded from `src/postgres/migrations`.

mod document_store;

pub use document_store::PostgresDocumentStore;
