//! Structured key-value fields attached to log entries
//!
//! `LogContext` keeps fields in insertion order so encoded records list them
//! the way they were attached: logger-scoped values first, then per-call
//! values.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Value type for structured logging fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::String(s) => write!(f, "{}", s),
            FieldValue::Int(i) => write!(f, "{}", i),
            FieldValue::Float(fl) => write!(f, "{}", fl),
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::Null => write!(f, "null"),
        }
    }
}

impl FieldValue {
    /// Convert to serde_json::Value for JSON serialization
    #[must_use]
    pub fn to_json_value(&self) -> serde_json::Value {
        match self {
            FieldValue::String(s) => serde_json::Value::String(s.clone()),
            FieldValue::Int(i) => serde_json::Value::Number((*i).into()),
            FieldValue::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            FieldValue::Bool(b) => serde_json::Value::Bool(*b),
            FieldValue::Null => serde_json::Value::Null,
        }
    }

    /// Convert back from a decoded JSON value.
    ///
    /// Arrays and objects have no field representation and are kept as their
    /// JSON text.
    pub fn from_json_value(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::String(s) => FieldValue::String(s.clone()),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => FieldValue::Int(i),
                None => FieldValue::Float(n.as_f64().unwrap_or_default()),
            },
            serde_json::Value::Bool(b) => FieldValue::Bool(*b),
            serde_json::Value::Null => FieldValue::Null,
            other => FieldValue::String(other.to_string()),
        }
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::String(s)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::String(s.to_string())
    }
}

impl From<i64> for FieldValue {
    fn from(i: i64) -> Self {
        FieldValue::Int(i)
    }
}

impl From<i32> for FieldValue {
    fn from(i: i32) -> Self {
        FieldValue::Int(i as i64)
    }
}

impl From<u32> for FieldValue {
    fn from(i: u32) -> Self {
        FieldValue::Int(i as i64)
    }
}

impl From<usize> for FieldValue {
    fn from(i: usize) -> Self {
        i64::try_from(i)
            .map(FieldValue::Int)
            .unwrap_or(FieldValue::Float(i as f64))
    }
}

impl From<f64> for FieldValue {
    fn from(f: f64) -> Self {
        FieldValue::Float(f)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(FieldValue::Null)
    }
}

/// Ordered key-value fields for one log entry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LogContext {
    fields: Vec<(String, FieldValue)>,
}

impl LogContext {
    /// Create a new empty log context
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Add a field to the context
    pub fn with_field<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<FieldValue>,
    {
        self.fields.push((key.into(), value.into()));
        self
    }

    /// Add a field to the context (mutable version)
    pub fn add_field<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<FieldValue>,
    {
        self.fields.push((key.into(), value.into()));
    }

    /// Append every field of `other` after the existing ones
    pub fn extend(&mut self, other: &LogContext) {
        self.fields.extend(other.fields.iter().cloned());
    }

    /// Get all fields in insertion order
    pub fn fields(&self) -> &[(String, FieldValue)] {
        &self.fields
    }

    /// Last value recorded for `key`
    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Check if context has any fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Format fields as key=value pairs
    pub fn format_fields(&self) -> String {
        self.fields
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Fields as a JSON object; the last value wins for repeated keys
    pub fn to_json_object(&self) -> serde_json::Map<String, serde_json::Value> {
        let mut map = serde_json::Map::new();
        for (key, value) in &self.fields {
            map.insert(key.clone(), value.to_json_value());
        }
        map
    }
}

impl fmt::Display for LogContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_fields())
    }
}

impl<K: Into<String>, V: Into<FieldValue>> FromIterator<(K, V)> for LogContext {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_context_creation() {
        let ctx = LogContext::new();
        assert!(ctx.is_empty());
    }

    #[test]
    fn test_log_context_keeps_insertion_order() {
        let ctx = LogContext::new()
            .with_field("controller", "deployment")
            .with_field("attempt", 3)
            .with_field("ready", true);

        let keys: Vec<&str> = ctx.fields().iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["controller", "attempt", "ready"]);
    }

    #[test]
    fn test_log_context_format() {
        let ctx = LogContext::new()
            .with_field("key1", "value1")
            .with_field("key2", 42);

        assert_eq!(ctx.format_fields(), "key1=value1 key2=42");
    }

    #[test]
    fn test_get_returns_last_value() {
        let ctx = LogContext::new()
            .with_field("key", "first")
            .with_field("key", "second");

        assert_eq!(ctx.get("key"), Some(&FieldValue::from("second")));
        assert_eq!(ctx.to_json_object()["key"], "second");
    }

    #[test]
    fn test_extend_appends() {
        let mut base = LogContext::new().with_field("a", 1);
        base.extend(&LogContext::new().with_field("b", 2));
        assert_eq!(base.len(), 2);
        assert_eq!(base.fields()[1].0, "b");
    }

    #[test]
    fn test_json_value_conversion() {
        let value = serde_json::json!(1.5);
        assert_eq!(FieldValue::from_json_value(&value), FieldValue::Float(1.5));
        let value = serde_json::json!(-7);
        assert_eq!(FieldValue::from_json_value(&value), FieldValue::Int(-7));
        assert_eq!(FieldValue::from(None::<i32>), FieldValue::Null);
    }

    #[test]
    fn test_from_iterator() {
        let ctx: LogContext = vec![("a", 1), ("b", 2)].into_iter().collect();
        assert_eq!(ctx.len(), 2);
    }
}
