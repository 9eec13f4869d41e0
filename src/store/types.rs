//! Core record type definitions.
//!
//! Defines [`Record`] (one stored embedding's metadata side), [`Connection`]
//! (a weighted edge in the semantic-connection graph), and [`MetadataValue`]
//! (the schema-less value bag callers attach to records).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// User-supplied metadata: string keys to typed values.
pub type Metadata = BTreeMap<String, MetadataValue>;

/// A single metadata value.
///
/// Serialized untagged, so a metadata map reads and writes as plain JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    List(Vec<MetadataValue>),
    Map(BTreeMap<String, MetadataValue>),
}

impl MetadataValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl From<&str> for MetadataValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<f64> for MetadataValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i64> for MetadataValue {
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

impl From<bool> for MetadataValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<Vec<MetadataValue>> for MetadataValue {
    fn from(value: Vec<MetadataValue>) -> Self {
        Self::List(value)
    }
}

impl From<Metadata> for MetadataValue {
    fn from(value: Metadata) -> Self {
        Self::Map(value)
    }
}

/// Merge `update` into `base`: new keys are added, existing keys overwritten,
/// keys absent from `update` are left alone.
pub fn merge_metadata(base: &mut Metadata, update: Metadata) {
    for (key, value) in update {
        base.insert(key, value);
    }
}

/// One edge of the connection graph: a neighbor and its cosine similarity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    /// ID of the neighboring record.
    pub id: String,
    /// Cosine similarity between the two records' embeddings.
    pub score: f32,
}

/// A stored record, matching one row of the embedding matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// UUID v7 identifier, assigned at insertion and never reused.
    pub id: String,
    /// The text the embedding was derived from. Opaque to the store.
    pub chunk_text: String,
    /// Arbitrary user metadata.
    #[serde(default)]
    pub metadata: Metadata,
    /// Up to `k` nearest neighbors, sorted by descending score.
    /// Empty when connection maintenance is disabled.
    #[serde(default)]
    pub connections: Vec<Connection>,
}

impl Record {
    pub fn new(chunk_text: impl Into<String>, metadata: Metadata) -> Self {
        Self {
            id: uuid::Uuid::now_v7().to_string(),
            chunk_text: chunk_text.into(),
            metadata,
            connections: Vec::new(),
        }
    }
}

/// Input for a batched insert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRecord {
    pub text: String,
    pub embedding: Vec<f32>,
    #[serde(default)]
    pub metadata: Metadata,
}

impl NewRecord {
    pub fn new(text: impl Into<String>, embedding: Vec<f32>) -> Self {
        Self {
            text: text.into(),
            embedding,
            metadata: Metadata::new(),
        }
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Result returned from an add operation.
#[derive(Debug, Clone, Serialize)]
pub struct AddResult {
    /// ID of the new record.
    pub id: String,
    /// `true` if normalization was requested but the embedding had zero norm
    /// and was stored unchanged.
    pub zero_vector: bool,
}

/// Result returned from an update operation.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateResult {
    pub id: String,
    /// `true` if the embedding row was replaced.
    pub embedding_changed: bool,
    /// Same meaning as [`AddResult::zero_vector`].
    pub zero_vector: bool,
}

/// A single similarity search hit.
#[derive(Debug, Clone, Serialize)]
pub struct SimilarityResult {
    pub record: Record,
    pub similarity: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metadata_serializes_as_plain_json() {
        let mut meta = Metadata::new();
        meta.insert("source".into(), "notes.md".into());
        meta.insert("page".into(), 3i64.into());
        meta.insert("draft".into(), false.into());
        meta.insert(
            "tags".into(),
            vec![MetadataValue::from("a"), MetadataValue::from("b")].into(),
        );

        let json = serde_json::to_value(&meta).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "source": "notes.md",
                "page": 3.0,
                "draft": false,
                "tags": ["a", "b"],
            })
        );
    }

    #[test]
    fn metadata_parses_nested_json() {
        let meta: Metadata = serde_json::from_str(
            r#"{"author": {"name": "ana", "age": 40}, "missing": null, "ok": true}"#,
        )
        .unwrap();

        let author = match &meta["author"] {
            MetadataValue::Map(m) => m,
            other => panic!("expected map, got {other:?}"),
        };
        assert_eq!(author["name"].as_str(), Some("ana"));
        assert_eq!(author["age"].as_f64(), Some(40.0));
        assert_eq!(meta["missing"], MetadataValue::Null);
        assert_eq!(meta["ok"].as_bool(), Some(true));
    }

    #[test]
    fn merge_overwrites_and_keeps_untouched_keys() {
        let mut base = Metadata::new();
        base.insert("a".into(), 1i64.into());
        base.insert("b".into(), "old".into());

        let mut update = Metadata::new();
        update.insert("b".into(), "new".into());
        update.insert("c".into(), true.into());

        merge_metadata(&mut base, update);

        assert_eq!(base["a"].as_f64(), Some(1.0));
        assert_eq!(base["b"].as_str(), Some("new"));
        assert_eq!(base["c"].as_bool(), Some(true));
    }

    #[test]
    fn new_records_get_distinct_ids() {
        let a = Record::new("a", Metadata::new());
        let b = Record::new("b", Metadata::new());
        assert_ne!(a.id, b.id);
        assert!(a.connections.is_empty());
    }
}
