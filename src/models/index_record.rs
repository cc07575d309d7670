use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A metadata value accepted by the vector index (spec §3): scalar or
/// list-of-strings only. Dictionaries as values are disallowed — the
/// index has no nested-structure support, so any source pattern that would
/// naturally produce a mapping (e.g. "count per term") must be flattened to
/// a list with repetition instead (spec §9).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    String(String),
    Number(f64),
    Bool(bool),
    StringList(Vec<String>),
}

impl MetadataValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            MetadataValue::String(s) => Some(s),
            _ => None,
        }
    }
}

/// `{chunk_id, embedding, metadata}` as written to and read from the
/// external vector index (spec §3). Metadata is a flat map — `legal_terms`
/// lives here as a `MetadataValue::StringList`, one entry per occurrence,
/// never as a mapping from term to count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexRecord {
    pub chunk_id: String,
    pub embedding: Vec<f32>,
    pub metadata: BTreeMap<String, MetadataValue>,
}

impl IndexRecord {
    /// Invariant check (spec §8): no metadata value is a mapping. Since
    /// `MetadataValue` has no mapping variant, this is a structural
    /// guarantee rather than a runtime check — callers who build metadata
    /// from untyped JSON should route it through `validate_metadata_json`
    /// below instead of constructing `MetadataValue` directly.
    pub fn legal_terms(&self) -> &[String] {
        match self.metadata.get("legal_terms") {
            Some(MetadataValue::StringList(terms)) => terms,
            _ => &[],
        }
    }
}

/// Reject a caller-supplied metadata value that is a JSON object — the
/// one shape `MetadataValue` structurally cannot represent, so it must be
/// caught before the caller's `serde_json::Value` is converted.
pub fn validate_metadata_json(
    key: &str,
    value: &serde_json::Value,
) -> Result<(), ValidationError> {
    if value.is_object() {
        return Err(ValidationError::NestedMetadata { key: key.into() });
    }
    if let serde_json::Value::Array(items) = value {
        if items.iter().any(|item| item.is_object() || item.is_array()) {
            return Err(ValidationError::NestedMetadata { key: key.into() });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legal_terms_flattens_to_string_list_not_map() {
        let mut metadata = BTreeMap::new();
        metadata.insert(
            "legal_terms".to_string(),
            MetadataValue::StringList(vec!["exclusion".into(), "exclusion".into(), "claim".into()]),
        );
        let record = IndexRecord {
            chunk_id: "D:0".into(),
            embedding: vec![0.1, 0.2],
            metadata,
        };
        assert_eq!(record.legal_terms(), &["exclusion", "exclusion", "claim"]);
    }

    #[test]
    fn validate_metadata_json_rejects_objects() {
        let value = serde_json::json!({"a": 1});
        assert!(validate_metadata_json("k", &value).is_err());
    }

    #[test]
    fn validate_metadata_json_rejects_list_of_objects() {
        let value = serde_json::json!([{"a": 1}]);
        assert!(validate_metadata_json("k", &value).is_err());
    }

    #[test]
    fn validate_metadata_json_accepts_scalars_and_string_lists() {
        assert!(validate_metadata_json("k", &serde_json::json!("hello")).is_ok());
        assert!(validate_metadata_json("k", &serde_json::json!(42)).is_ok());
        assert!(validate_metadata_json("k", &serde_json::json!(true)).is_ok());
        assert!(validate_metadata_json("k", &serde_json::json!(["a", "b"])).is_ok());
    }
}
