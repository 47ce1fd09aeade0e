//! Pending marker types.
//!
//! A pending marker records the last time a group was observed as not yet
//! converged. Markers live in the same store as registry entries, under ids
//! prefixed with [`MONOREPO_PREFIX`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::document::{DistTags, Document};

/// Id prefix shared by every pending marker.
pub const MONOREPO_PREFIX: &str = "monorepo:";

/// Derive the marker id for a group.
pub fn marker_id(group: &str) -> String {
    format!("{MONOREPO_PREFIX}{group}")
}

/// Marker for a group that has been seen without full convergence.
///
/// # Fields
///
/// - `id`: Document id, always `monorepo:<group>`
/// - `dist_tags`: `latest` holds the version that last triggered the check
/// - `updated_at`: Last time the group was found not converged
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PendingMarker {
    #[serde(skip)]
    pub id: String,
    #[serde(default)]
    pub dist_tags: DistTags,
    pub updated_at: DateTime<Utc>,
}

impl PendingMarker {
    /// Build the marker for `group` observed at `version` at time `now`.
    pub fn for_group(group: &str, version: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: marker_id(group),
            dist_tags: DistTags::latest(version),
            updated_at: now,
        }
    }

    /// The group name this marker tracks.
    pub fn group(&self) -> &str {
        self.id.strip_prefix(MONOREPO_PREFIX).unwrap_or(&self.id)
    }

    /// The version last seen for this group.
    pub fn latest_version(&self) -> Option<&str> {
        self.dist_tags.latest.as_deref()
    }

    /// Decode a marker from a store document.
    pub fn from_document(document: &Document) -> Result<Self, serde_json::Error> {
        let mut marker: PendingMarker = document.decode()?;
        marker.id = document.id.clone();
        Ok(marker)
    }

    /// Encode the marker as a store document.
    pub fn to_document(&self) -> Result<Document, serde_json::Error> {
        Document::from_typed(self.id.clone(), self)
    }
}
