//! Log entries: one JSON object per logical log record

use serde::Serialize;
use serde_json::{Map, Value};

/// A parsed log record.
///
/// The classifier only reads a handful of configured fields; everything else
/// is carried opaquely and written back out as-is, in its original key order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct LogEntry {
    fields: Map<String, Value>,
}

impl LogEntry {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Wrap a JSON value, which must be an object.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(fields) => Some(Self { fields }),
            _ => None,
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Read a field as a label (log type, identity).
    ///
    /// Strings are used verbatim, numbers and booleans as their JSON text.
    /// Empty strings, `null`, objects and arrays yield `None`.
    pub fn label(&self, name: &str) -> Option<String> {
        match self.fields.get(name)? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.fields)
    }

    /// Compact single-line JSON rendering used in uploaded blobs.
    pub fn to_json_line(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.fields)
    }
}

impl From<Map<String, Value>> for LogEntry {
    fn from(fields: Map<String, Value>) -> Self {
        Self::new(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_value_requires_object() {
        assert!(LogEntry::from_value(json!({"a": 1})).is_some());
        assert!(LogEntry::from_value(json!([1, 2])).is_none());
        assert!(LogEntry::from_value(json!("text")).is_none());
    }

    #[test]
    fn test_label() {
        let entry = LogEntry::from_value(json!({
            "s": "app",
            "n": 42,
            "b": true,
            "empty": "",
            "null": null,
            "obj": {"x": 1}
        }))
        .unwrap();

        assert_eq!(entry.label("s").as_deref(), Some("app"));
        assert_eq!(entry.label("n").as_deref(), Some("42"));
        assert_eq!(entry.label("b").as_deref(), Some("true"));
        assert_eq!(entry.label("empty"), None);
        assert_eq!(entry.label("null"), None);
        assert_eq!(entry.label("obj"), None);
        assert_eq!(entry.label("missing"), None);
        assert!(entry.contains("null"));
    }

    #[test]
    fn test_json_line_keeps_key_order() {
        let entry: LogEntry =
            LogEntry::from_value(serde_json::from_str(r#"{"z":1,"a":"x","m":[1,2]}"#).unwrap())
                .unwrap();
        assert_eq!(entry.to_json_line().unwrap(), r#"{"z":1,"a":"x","m":[1,2]}"#);
    }
}
