//! Generic document types for the document store.
//!
//! Every record the tracker reads or writes is a `Document`: a string id plus a
//! JSON body. Typed views (`RegistryEntry`, `PendingMarker`) are decoded from it.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// A single record held by the document store.
///
/// # Fields
///
/// - `id`: Unique document key (a package name, or `monorepo:<group>` for markers)
/// - `body`: The JSON payload stored under that key
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    pub id: String,
    pub body: serde_json::Value,
}

impl Document {
    /// Create a document from an id and a raw JSON body.
    pub fn new(id: impl Into<String>, body: serde_json::Value) -> Self {
        Self {
            id: id.into(),
            body,
        }
    }

    /// Create a document by serializing a typed value as its body.
    ///
    /// # Arguments
    ///
    /// * `id` - The document key
    /// * `value` - Any serializable value, stored as the body
    ///
    /// # Returns
    ///
    /// * `Ok(Document)` - The encoded document
    /// * `Err(serde_json::Error)` - If the value cannot be represented as JSON
    pub fn from_typed<T: Serialize>(
        id: impl Into<String>,
        value: &T,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self {
            id: id.into(),
            body: serde_json::to_value(value)?,
        })
    }

    /// Decode the body into a typed value.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        T::deserialize(&self.body)
    }
}

/// Distribution tags of a package as mirrored from the registry.
///
/// Only `latest` is read by the tracker. Other tags present in the stored body
/// are ignored on decode.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DistTags {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest: Option<String>,
}

impl DistTags {
    /// Tags with only `latest` set.
    pub fn latest(version: impl Into<String>) -> Self {
        Self {
            latest: Some(version.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_document_new() {
        let doc = Document::new("pouchdb-md5", json!({"distTags": {"latest": "7.0.0"}}));

        assert_eq!(doc.id, "pouchdb-md5");
        assert_eq!(doc.body["distTags"]["latest"], "7.0.0");
    }

    #[test]
    fn test_dist_tags_ignore_unknown_tags() {
        let tags: DistTags =
            serde_json::from_value(json!({"latest": "2.0.0", "next": "3.0.0-beta.1"})).unwrap();

        assert_eq!(tags, DistTags::latest("2.0.0"));
    }

    #[test]
    fn test_dist_tags_without_latest() {
        let tags: DistTags = serde_json::from_value(json!({"next": "3.0.0-beta.1"})).unwrap();

        assert!(tags.latest.is_none());
        assert_eq!(serde_json::to_value(&tags).unwrap(), json!({}));
    }

    #[test]
    fn test_decode_wrong_shape_is_an_error() {
        let doc = Document::new("koeln", json!(["not", "an", "object"]));

        assert!(doc.decode::<DistTags>().is_err());
    }
}
