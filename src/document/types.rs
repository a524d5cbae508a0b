//! Document types
//!
//! Defines the parsed response tree and the construct-from-document
//! convention used by page and model types.

use super::keys::camelize_keys;
use crate::error::Result;
use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;

/// A parsed response body
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document(Value);

impl Document {
    /// Parse a document from raw bytes. Malformed input is an error.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        Ok(Self(serde_json::from_slice(bytes)?))
    }

    /// Wrap an already-parsed value
    pub fn from_value(value: Value) -> Self {
        Self(value)
    }

    /// The empty (`null`) document
    pub fn null() -> Self {
        Self(Value::Null)
    }

    /// Whether this document is `null`
    pub fn is_null(&self) -> bool {
        self.0.is_null()
    }

    /// Borrow the underlying tree
    pub fn value(&self) -> &Value {
        &self.0
    }

    /// Take the underlying tree
    pub fn into_value(self) -> Value {
        self.0
    }

    /// Look up a node by dotted path.
    ///
    /// Supports `$.` prefixes and array indexing (`items[0]`, `items[-1]`).
    pub fn get(&self, path: &str) -> Option<&Value> {
        let path = path.strip_prefix("$.").unwrap_or(path);
        if path.is_empty() || path == "$" {
            return Some(&self.0);
        }

        let mut current = &self.0;
        for part in path.split('.') {
            if let Some(bracket_pos) = part.find('[') {
                let name = &part[..bracket_pos];
                let index_str = part[bracket_pos + 1..].strip_suffix(']')?;

                if !name.is_empty() {
                    current = current.get(name)?;
                }

                let index = index_str.parse::<i64>().ok()?;
                let Value::Array(arr) = current else {
                    return None;
                };
                #[allow(clippy::cast_possible_wrap)]
                let idx = if index < 0 {
                    usize::try_from(arr.len() as i64 + index).ok()?
                } else {
                    usize::try_from(index).ok()?
                };
                current = arr.get(idx)?;
            } else {
                current = current.get(part)?;
            }
        }
        Some(current)
    }

    /// Look up a sub-document by path
    pub fn lookup(&self, path: &str) -> Option<Document> {
        self.get(path).cloned().map(Self)
    }

    /// Look up a leaf rendered as a string.
    ///
    /// Numbers and booleans are rendered; `null`, arrays and objects yield `None`.
    pub fn string(&self, path: &str) -> Option<String> {
        match self.get(path)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// Look up an integer leaf
    pub fn int(&self, path: &str) -> Option<i64> {
        match self.get(path)? {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    /// Look up a boolean leaf
    pub fn bool(&self, path: &str) -> Option<bool> {
        self.get(path)?.as_bool()
    }

    /// Look up an array and wrap each element as a document
    pub fn array(&self, path: &str) -> Option<Vec<Document>> {
        self.get(path)?
            .as_array()
            .map(|items| items.iter().cloned().map(Self).collect())
    }

    /// Re-serialize to bytes
    pub fn to_bytes(&self) -> Result<Bytes> {
        Ok(Bytes::from(serde_json::to_vec(&self.0)?))
    }

    /// Pretty-printed rendering used in diagnostics
    pub fn pretty(&self) -> String {
        serde_json::to_string_pretty(&self.0).unwrap_or_else(|_| self.0.to_string())
    }

    /// Decode a model from this document.
    ///
    /// The document is re-serialized and parsed again with `snake_case`
    /// keys rewritten to `camelCase`, so models should declare
    /// `#[serde(rename_all = "camelCase")]`.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        let bytes = self.to_bytes()?;
        let value: Value = serde_json::from_slice(&bytes)?;
        Ok(serde_json::from_value(camelize_keys(value))?)
    }
}

impl From<Value> for Document {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pretty())
    }
}

/// Types built directly from a parsed document
pub trait FromDocument: Sized {
    /// Build `Self`, or `None` if the document does not describe one
    fn from_document(document: Document) -> Option<Self>;
}

impl FromDocument for Document {
    fn from_document(document: Document) -> Option<Self> {
        Some(document)
    }
}
