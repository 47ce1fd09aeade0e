//! # Monorepo Tracker Shared
//!
//! This crate defines the data structures shared across the monorepo release tracker.
//! It includes the generic store document, the mirrored registry entry of a package,
//! and the pending marker recorded for groups that have not converged yet.

pub mod types;

pub use types::{
    marker_id, DistTags, Document, PendingMarker, RegistryEntry, MONOREPO_PREFIX,
};
