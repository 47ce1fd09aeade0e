//! Registry entry types.
//!
//! A registry entry is the locally mirrored metadata of one package, written by
//! the registry feed whenever a new version is published. The tracker only reads it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::document::{DistTags, Document};

/// Mirrored registry metadata for a single package.
///
/// The package name is the document id, so it is not part of the stored body.
///
/// # Fields
///
/// - `package`: Package name, possibly scoped (`@scope/name`)
/// - `dist_tags`: Distribution tags, `latest` being the published version
/// - `updated_at`: When the mirror last changed this entry, if recorded
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RegistryEntry {
    #[serde(skip)]
    pub package: String,
    #[serde(default)]
    pub dist_tags: DistTags,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl RegistryEntry {
    /// Create an entry reporting `version` as the latest release.
    pub fn new(package: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            dist_tags: DistTags::latest(version),
            updated_at: Some(Utc::now()),
        }
    }

    /// The latest published version, if the mirror has one.
    pub fn latest_version(&self) -> Option<&str> {
        self.dist_tags.latest.as_deref()
    }

    /// Decode an entry from a store document, taking the package name from its id.
    pub fn from_document(document: &Document) -> Result<Self, serde_json::Error> {
        let mut entry: RegistryEntry = document.decode()?;
        entry.package = document.id.clone();
        Ok(entry)
    }

    /// Encode the entry as a store document keyed by package name.
    pub fn to_document(&self) -> Result<Document, serde_json::Error> {
        Document::from_typed(self.package.clone(), self)
    }
}
