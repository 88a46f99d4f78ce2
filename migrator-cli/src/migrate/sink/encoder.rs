//! Fixture document encoders

use serde::{Deserialize, Serialize};

use crate::migrate::error::{MigrateError, Result};

use super::FixtureDocument;

/// Turns a fixture document into text
pub trait FixtureEncoder: Send + Sync {
    /// File extension without the dot
    fn extension(&self) -> &'static str;

    fn encode(&self, document: &FixtureDocument) -> Result<String>;
}

/// Block-style YAML; every level is expanded, so nested field values survive
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlEncoder;

impl FixtureEncoder for YamlEncoder {
    fn extension(&self) -> &'static str {
        "yml"
    }

    fn encode(&self, document: &FixtureDocument) -> Result<String> {
        serde_yaml::to_string(document).map_err(|e| MigrateError::Encode(e.to_string()))
    }
}

/// Pretty-printed JSON
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonEncoder;

impl FixtureEncoder for JsonEncoder {
    fn extension(&self) -> &'static str {
        "json"
    }

    fn encode(&self, document: &FixtureDocument) -> Result<String> {
        let mut out =
            serde_json::to_string_pretty(document).map_err(|e| MigrateError::Encode(e.to_string()))?;
        out.push('\n');
        Ok(out)
    }
}

/// Fixture format selectable from configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FixtureFormat {
    #[default]
    Yaml,
    Json,
}

impl FixtureFormat {
    pub fn encoder(&self) -> Box<dyn FixtureEncoder> {
        match self {
            FixtureFormat::Yaml => Box::new(YamlEncoder),
            FixtureFormat::Json => Box::new(JsonEncoder),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FixtureFormat::Yaml => "yaml",
            FixtureFormat::Json => "json",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migrate::{FieldMap, Value};

    fn document() -> FixtureDocument {
        let mut fields = FieldMap::new();
        fields.set("first_name", Value::from("Jane"));
        fields.set("age", Value::Int(41));
        FixtureDocument::new("Person", vec![fields])
    }

    #[test]
    fn test_yaml_layout() {
        let yaml = YamlEncoder.encode(&document()).unwrap();
        assert_eq!(yaml, "Person:\n  Person_1:\n    first_name: Jane\n    age: 41\n");
    }

    #[test]
    fn test_json_layout() {
        let json = JsonEncoder.encode(&document()).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(
            parsed,
            serde_json::json!({"Person": {"Person_1": {"first_name": "Jane", "age": 41}}})
        );
        assert!(json.ends_with('\n'));
    }

    #[test]
    fn test_format_extensions() {
        assert_eq!(FixtureFormat::Yaml.encoder().extension(), "yml");
        assert_eq!(FixtureFormat::Json.encoder().extension(), "json");
        assert_eq!(FixtureFormat::default(), FixtureFormat::Yaml);
    }
}
