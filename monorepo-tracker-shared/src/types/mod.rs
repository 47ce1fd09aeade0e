//! This module defines the core data structures used across the monorepo tracker.
//! It re-exports the document, registry entry and pending marker types.

pub mod document;
pub mod pending_marker;
pub mod registry_entry;

pub use document::{DistTags, Document};
pub use pending_marker::{marker_id, PendingMarker, MONOREPO_PREFIX};
pub use registry_entry::RegistryEntry;
