use serde_json::{Map, Value};
use tracing::debug;


/// Interprets a command-line attribute value.
///
/// Input that looks like a serialized structure (an object or an array) is
/// parsed as JSON; everything else, including structures that fail to
/// parse, is kept as a literal string.
pub fn parse_attribute_value(input: &str) -> Value {
    let trimmed = input.trim();
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        match serde_json::from_str::<Value>(trimmed) {
            Ok(value) => return value,
            Err(e) => debug!(error = %e, "Attribute value is not valid JSON, keeping it as a string"),
        }
    }
    Value::String(input.to_string())
}

/// A single named attribute to set on a vector store file.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeUpdate {
    pub key: String,
    pub value: Value,
}

impl AttributeUpdate {
    pub fn new(key: impl Into<String>, value: Value) -> Self {
        Self { key: key.into(), value }
    }

    /// Builds the update from raw command-line input.
    pub fn parse(key: impl Into<String>, raw_value: &str) -> Self {
        Self::new(key, parse_attribute_value(raw_value))
    }

    pub fn into_attributes(self) -> Map<String, Value> {
        self.merge_into(Map::new())
    }

    /// Sets this attribute on top of a file's current attributes. The
    /// service replaces the whole map on update, so the others must be resent.
    pub fn merge_into(self, mut attributes: Map<String, Value>) -> Map<String, Value> {
        attributes.insert(self.key, self.value);
        attributes
    }
}
