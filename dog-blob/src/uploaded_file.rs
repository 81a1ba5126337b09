use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::BlobResult;

/// Descriptor of a file that was uploaded to one of the registered stores.
///
/// Serialized in the same shape uploaders persist it in:
///
/// ```json
/// {"id": "9f3c...", "storage": "store", "metadata": {"size": 7, "mime_type": "text/plain", "filename": "content.txt"}}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadedFile {
    id: String,
    #[serde(rename = "storage")]
    storage_key: String,
    #[serde(default)]
    metadata: Map<String, Value>,
}

impl UploadedFile {
    pub fn new<I: Into<String>, S: Into<String>>(id: I, storage_key: S) -> Self {
        Self {
            id: id.into(),
            storage_key: storage_key.into(),
            metadata: Map::new(),
        }
    }

    /// Parse the persisted JSON form
    pub fn from_json(data: &str) -> BlobResult<Self> {
        Ok(serde_json::from_str(data)?)
    }

    pub fn to_json(&self) -> BlobResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn with_metadata<K: Into<String>, V: Into<Value>>(mut self, key: K, value: V) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    pub fn metadata(&self) -> &Map<String, Value> {
        &self.metadata
    }

    /// `metadata.size`, accepting either a number or a numeric string
    pub fn size(&self) -> Option<u64> {
        match self.metadata.get("size")? {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    pub fn mime_type(&self) -> Option<&str> {
        self.metadata.get("mime_type").and_then(Value::as_str)
    }

    pub fn original_filename(&self) -> Option<&str> {
        self.metadata.get("filename").and_then(Value::as_str)
    }
}
