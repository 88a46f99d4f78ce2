//! Value representation for migrated fields

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// A field value, used for hook inputs and outputs and passed to setters
///
/// Raw record cells always enter the pipeline as `Value::String`; hooks may
/// convert them into any other variant before the setter sees them.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// Null/empty value
    Null,
    /// Boolean
    Bool(bool),
    /// Whole number
    Int(i64),
    /// Floating point
    Float(f64),
    /// Date and time
    DateTime(DateTime<Utc>),
    /// Unique identifier
    Guid(Uuid),
    /// String value
    String(String),
}

impl Value {
    /// Null or an empty string
    pub fn is_blank(&self) -> bool {
        match self {
            Value::Null => true,
            Value::String(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Convert to JSON value for storage
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Int(i) => serde_json::json!(*i),
            Value::Float(f) => serde_json::json!(*f),
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::DateTime(dt) => serde_json::Value::String(dt.to_rfc3339()),
            Value::Guid(g) => serde_json::Value::String(g.to_string()),
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, "(null)"),
            Value::String(s) => write!(f, "{}", s),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(fl) => write!(f, "{}", fl),
            Value::Bool(b) => write!(f, "{}", b),
            Value::DateTime(dt) => write!(f, "{}", dt.to_rfc3339()),
            Value::Guid(g) => write!(f, "{}", g),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_values() {
        assert!(Value::Null.is_blank());
        assert!(Value::from("").is_blank());
        assert!(!Value::from(" ").is_blank());
        assert!(!Value::Int(0).is_blank());
    }

    #[test]
    fn test_serializes_as_plain_scalar() {
        let json = serde_json::to_value(Value::from("Doe")).unwrap();
        assert_eq!(json, serde_json::json!("Doe"));

        let json = serde_json::to_value(Value::Int(7)).unwrap();
        assert_eq!(json, serde_json::json!(7));

        let json = serde_json::to_value(Value::Null).unwrap();
        assert_eq!(json, serde_json::Value::Null);
    }

    #[test]
    fn test_to_json_datetime_is_rfc3339() {
        let dt = DateTime::parse_from_rfc3339("2024-03-01T10:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(
            Value::DateTime(dt).to_json(),
            serde_json::json!("2024-03-01T10:00:00+00:00")
        );
    }
}
