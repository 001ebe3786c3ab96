//! Metadata document model
//!
//! A metadata document is a JSON object of scalars, nested objects (singular
//! sub-entities) and arrays of objects (one-to-many sub-entities).

use crate::content_type::ContentTypes;
use crate::error::{FolioError, Result};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Semi-structured metadata document
pub type Document = serde_json::Map<String, Value>;

/// Tag name -> tag id mapping stored on a content record
pub type TagMap = BTreeMap<String, i64>;

/// Parse a JSON object into a document
pub fn parse_document(json: &str) -> Result<Document> {
    match serde_json::from_str::<Value>(json)? {
        Value::Object(doc) => Ok(doc),
        other => Err(FolioError::InvalidInput(format!(
            "Metadata must be a JSON object, got {}",
            type_name(&other)
        ))),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Read an integer-ish flag column (0/1 or boolean)
fn as_flag(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_i64().is_some_and(|n| n != 0),
        _ => false,
    }
}

/// A content record loaded from the archive, with any attached sub-entities
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ContentRecord {
    doc: Document,
}

impl ContentRecord {
    /// Wrap a document; it must carry a string `path`
    pub fn from_document(doc: Document) -> Result<Self> {
        match doc.get("path") {
            Some(Value::String(_)) => Ok(Self { doc }),
            _ => Err(FolioError::InvalidInput(
                "Content record has no path".to_string(),
            )),
        }
    }

    pub fn path(&self) -> &str {
        self.doc.get("path").and_then(Value::as_str).unwrap_or_default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.doc.get(key)
    }

    /// String field, if present
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.doc.get(key).and_then(Value::as_str)
    }

    pub fn title(&self) -> Option<&str> {
        self.get_str("title")
    }

    pub fn content_type(&self) -> ContentTypes {
        let bits = self
            .doc
            .get("content_type")
            .and_then(Value::as_u64)
            .unwrap_or(0);
        ContentTypes::from_bits(bits as u32)
    }

    pub fn views(&self) -> i64 {
        self.doc.get("views").and_then(Value::as_i64).unwrap_or(0)
    }

    pub fn is_disabled(&self) -> bool {
        as_flag(self.doc.get("disabled"))
    }

    pub fn keep_formatting(&self) -> bool {
        as_flag(self.doc.get("keep_formatting"))
    }

    /// Attached sub-entity (object for singular, array for many relations)
    pub fn child(&self, table: &str) -> Option<&Value> {
        self.doc.get(table).filter(|v| v.is_object() || v.is_array())
    }

    /// Decode the serialized tag mapping. Missing or malformed -> empty.
    pub fn tags(&self) -> TagMap {
        match self.doc.get("tags") {
            Some(Value::String(json)) => serde_json::from_str(json).unwrap_or_else(|e| {
                tracing::warn!("Malformed tag mapping on '{}': {}", self.path(), e);
                TagMap::new()
            }),
            Some(Value::Object(map)) => map
                .iter()
                .filter_map(|(name, id)| id.as_i64().map(|id| (name.clone(), id)))
                .collect(),
            _ => TagMap::new(),
        }
    }

    pub(crate) fn set_tags(&mut self, tags: &TagMap) -> Result<()> {
        let json = serde_json::to_string(tags)?;
        self.doc.insert("tags".to_string(), Value::String(json));
        Ok(())
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn into_document(self) -> Document {
        self.doc
    }
}
