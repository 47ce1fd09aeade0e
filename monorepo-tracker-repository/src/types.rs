//! Result types for document store operations.

use monorepo_tracker_shared::Document;

/// Outcome of a bulk read for a single key.
///
/// A bulk read never fails because of one key. Keys that do not exist or whose
/// stored body cannot be served are reported here instead.
#[derive(Debug, Clone, PartialEq)]
pub enum BulkGetRow {
    /// The document exists.
    Found(Document),
    /// No document has this key.
    Missing { key: String },
    /// The document exists but could not be read.
    Error { key: String, reason: String },
}

impl BulkGetRow {
    /// Build the row for a stored body.
    ///
    /// Document bodies are JSON objects; anything else is reported as an
    /// `Error` row so that callers treat the key as unreadable.
    pub fn from_body(key: impl Into<String>, body: serde_json::Value) -> Self {
        let key = key.into();
        if body.is_object() {
            Self::Found(Document::new(key, body))
        } else {
            Self::Error {
                key,
                reason: "document body is not a JSON object".to_string(),
            }
        }
    }

    /// The key this row answers for.
    pub fn key(&self) -> &str {
        match self {
            Self::Found(document) => &document.id,
            Self::Missing { key } | Self::Error { key, .. } => key,
        }
    }

    /// The document, if the row was found.
    pub fn document(&self) -> Option<&Document> {
        match self {
            Self::Found(document) => Some(document),
            _ => None,
        }
    }

    /// Consume the row, keeping the document if it was found.
    pub fn into_document(self) -> Option<Document> {
        match self {
            Self::Found(document) => Some(document),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_key_for_each_variant() {
        let found = BulkGetRow::Found(Document::new("koeln", json!({})));
        let missing = BulkGetRow::Missing {
            key: "berlin".to_string(),
        };
        let error = BulkGetRow::Error {
            key: "hamburg".to_string(),
            reason: "deleted".to_string(),
        };

        assert_eq!(found.key(), "koeln");
        assert_eq!(missing.key(), "berlin");
        assert_eq!(error.key(), "hamburg");
    }

    #[test]
    fn test_from_body_rejects_non_object_bodies() {
        let row = BulkGetRow::from_body("koeln", json!("2.0.0"));

        assert!(matches!(row, BulkGetRow::Error { ref key, .. } if key == "koeln"));
        assert!(matches!(
            BulkGetRow::from_body("koeln", json!({})),
            BulkGetRow::Found(_)
        ));
    }

    #[test]
    fn test_into_document_only_for_found() {
        let missing = BulkGetRow::Missing {
            key: "berlin".to_string(),
        };
        assert!(missing.document().is_none());
        assert!(missing.into_document().is_none());

        let found = BulkGetRow::Found(Document::new("koeln", json!({"a": 1})));
        assert_eq!(found.into_document().unwrap().id, "koeln");
    }
}
