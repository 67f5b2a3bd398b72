//! Submitted Filter Values
//!
//! Raw values arrive as JSON, usually straight from a request. Nothing here
//! rejects input: odd shapes are coerced or ignored.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Submitted values keyed by filter name, in submission order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterValues {
    values: Map<String, Value>,
}

impl FilterValues {
    /// Create an empty value set
    pub fn new() -> Self {
        Self { values: Map::new() }
    }

    /// Build from a JSON value; anything but an object yields an empty set
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(values) => Self { values },
            Value::Null => Self::new(),
            other => {
                tracing::warn!(
                    kind = json_kind(&other),
                    "Ignoring filter values that are not a JSON object"
                );
                Self::new()
            }
        }
    }

    /// Add a value (builder pattern)
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Set the value for a filter name
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.values.insert(name.into(), value.into());
        self
    }

    /// The raw value, if any was submitted
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// The value to apply for a filter, skipping `null` and `""`
    pub fn submitted(&self, name: &str) -> Option<&Value> {
        self.get(name).filter(|value| !is_blank(value))
    }

    /// Number of submitted entries, blank ones included
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate entries in submission order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.values.iter()
    }

    /// Borrow the underlying JSON object
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.values
    }
}

impl From<Map<String, Value>> for FilterValues {
    fn from(values: Map<String, Value>) -> Self {
        Self { values }
    }
}

impl From<Value> for FilterValues {
    fn from(value: Value) -> Self {
        Self::from_value(value)
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for FilterValues {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// Only `null` and the empty string count as "nothing submitted".
/// `false`, `0`, and empty arrays are real values.
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

/// Permissive boolean coercion.
///
/// True for `true`, numbers equal to 1, and the strings "1", "true", "on",
/// "yes" (trimmed, any case). Everything else is false.
pub fn coerce_bool(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64() == Some(1.0),
        Value::String(s) => matches!(
            s.trim().to_lowercase().as_str(),
            "1" | "true" | "on" | "yes"
        ),
        Value::Null | Value::Array(_) | Value::Object(_) => false,
    }
}

/// Render a value as text for pattern building
pub fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(true) => "1".to_string(),
        Value::Bool(false) | Value::Null => String::new(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_is_blank() {
        assert!(is_blank(&Value::Null));
        assert!(is_blank(&json!("")));
        assert!(!is_blank(&json!(false)));
        assert!(!is_blank(&json!(0)));
        assert!(!is_blank(&json!([])));
        assert!(!is_blank(&json!(" ")));
    }

    #[test]
    fn test_coerce_bool_truthy() {
        for value in [json!(true), json!("true"), json!("TRUE"), json!(1), json!("1"), json!("on"), json!("yes"), json!(1.0)] {
            assert!(coerce_bool(&value), "{} should be true", value);
        }
    }

    #[test]
    fn test_coerce_bool_falsy() {
        for value in [json!(false), json!("false"), json!(0), json!("0"), json!("off"), json!("no"), json!(""), json!(2), json!([1]), Value::Null] {
            assert!(!coerce_bool(&value), "{} should be false", value);
        }
    }

    #[test]
    fn test_value_to_text() {
        assert_eq!(value_to_text(&json!("iPhone")), "iPhone");
        assert_eq!(value_to_text(&json!(42)), "42");
        assert_eq!(value_to_text(&json!(true)), "1");
        assert_eq!(value_to_text(&json!(false)), "");
        assert_eq!(value_to_text(&json!(["a"])), "[\"a\"]");
    }

    #[test]
    fn test_submitted_skips_blank() {
        let values = FilterValues::new()
            .with("status", Value::Null)
            .with("title", "")
            .with("is_featured", false)
            .with("tags", json!([]));

        assert_eq!(values.len(), 4);
        assert!(values.submitted("status").is_none());
        assert!(values.submitted("title").is_none());
        assert_eq!(values.submitted("is_featured"), Some(&json!(false)));
        assert_eq!(values.submitted("tags"), Some(&json!([])));
        assert!(values.submitted("missing").is_none());
    }

    #[test]
    fn test_from_value() {
        let values = FilterValues::from_value(json!({"b": 1, "a": 2}));
        let keys: Vec<&String> = values.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["b", "a"]);

        assert!(FilterValues::from_value(json!([1, 2])).is_empty());
        assert!(FilterValues::from_value(Value::Null).is_empty());
    }

    #[test]
    fn test_serializes_as_object() {
        let values = FilterValues::new().with("status", "published");
        assert_eq!(
            serde_json::to_value(&values).unwrap(),
            json!({"status": "published"})
        );
    }
}
