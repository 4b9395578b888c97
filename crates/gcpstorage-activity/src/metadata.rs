//! Activity descriptor (`activity.json`).
//!
//! The descriptor declares the named inputs and outputs the host binds
//! before and after each invocation. It is loaded once, at activity
//! construction, and used to validate every invocation's raw inputs.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::TRACING_TARGET;
use crate::error::{Error, Result};
use crate::input::names;

/// Descriptor embedded in the crate.
const EMBEDDED_METADATA: &str = include_str!("../activity.json");

/// Value type of a declared input or output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// A JSON string.
    String,
    /// A JSON boolean.
    Boolean,
    /// A JSON integer.
    Integer,
    /// Any JSON number.
    Number,
    /// A JSON object.
    Object,
    /// A JSON array.
    Array,
    /// A flat string-to-string mapping.
    Params,
    /// Any JSON value.
    Any,
}

impl FieldType {
    /// Whether `value` conforms to this type.
    pub fn accepts(self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Boolean => value.is_boolean(),
            Self::Integer => value.is_i64() || value.is_u64(),
            Self::Number => value.is_number(),
            Self::Object => value.is_object(),
            Self::Array => value.is_array(),
            Self::Params => value
                .as_object()
                .is_some_and(|map| map.values().all(Value::is_string)),
            Self::Any => true,
        }
    }
}

/// A declared input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputSpec {
    /// Input name as bound by the host.
    pub name: String,
    /// Declared value type.
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Whether the host must supply a non-null value.
    #[serde(default)]
    pub required: bool,
    /// Permitted string values, compared case-insensitively. Empty means any.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed: Vec<String>,
}

/// A declared output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputSpec {
    /// Output name as read by the host.
    pub name: String,
    /// Declared value type.
    #[serde(rename = "type")]
    pub field_type: FieldType,
}

/// Parsed activity descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityMetadata {
    /// Activity name.
    pub name: String,
    /// Descriptor version.
    #[serde(default)]
    pub version: Option<String>,
    /// Human-readable title.
    #[serde(default)]
    pub title: Option<String>,
    /// Human-readable description.
    #[serde(default)]
    pub description: Option<String>,
    /// Declared inputs.
    #[serde(default)]
    pub inputs: Vec<InputSpec>,
    /// Declared outputs.
    #[serde(default)]
    pub outputs: Vec<OutputSpec>,
}

impl ActivityMetadata {
    /// The descriptor shipped with this crate.
    pub fn embedded() -> Result<Self> {
        Self::from_json(EMBEDDED_METADATA)
    }

    /// Parses a descriptor from JSON.
    ///
    /// The descriptor must declare every input the activity cannot run
    /// without, and the `output` output.
    pub fn from_json(json: &str) -> Result<Self> {
        let metadata: Self = serde_json::from_str(json)
            .map_err(|e| Error::configuration(format!("malformed descriptor: {e}")))?;
        metadata.check()?;
        Ok(metadata)
    }

    /// Reads and parses a descriptor file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| Error::configuration(format!("cannot read {}: {e}", path.display())))?;

        tracing::debug!(
            target: TRACING_TARGET,
            path = %path.display(),
            "loading activity metadata"
        );

        Self::from_json(&json)
    }

    /// Looks up a declared input by name.
    pub fn input(&self, name: &str) -> Option<&InputSpec> {
        self.inputs.iter().find(|input| input.name == name)
    }

    /// Looks up a declared output by name.
    pub fn output(&self, name: &str) -> Option<&OutputSpec> {
        self.outputs.iter().find(|output| output.name == name)
    }

    fn check(&self) -> Result<()> {
        for name in names::REQUIRED {
            match self.input(name) {
                Some(spec) if spec.required => {}
                Some(_) => {
                    return Err(Error::configuration(format!(
                        "input '{name}' must be declared as required"
                    )));
                }
                None => {
                    return Err(Error::configuration(format!(
                        "input '{name}' is not declared"
                    )));
                }
            }
        }

        if self.output(names::OUTPUT).is_none() {
            return Err(Error::configuration(format!(
                "output '{}' is not declared",
                names::OUTPUT
            )));
        }

        Ok(())
    }

    /// Validates raw host inputs against the declared inputs.
    ///
    /// Null values count as absent. Undeclared inputs are ignored.
    pub fn validate(&self, values: &Map<String, Value>) -> Result<()> {
        for spec in &self.inputs {
            let value = values.get(&spec.name).filter(|v| !v.is_null());

            let Some(value) = value else {
                if spec.required {
                    return Err(Error::validation(format!(
                        "missing required input '{}'",
                        spec.name
                    )));
                }
                continue;
            };

            if !spec.field_type.accepts(value) {
                return Err(Error::validation(format!(
                    "input '{}' must be of type {:?}",
                    spec.name, spec.field_type
                )));
            }

            if let Some(text) = value.as_str() {
                if spec.required && text.trim().is_empty() {
                    return Err(Error::validation(format!(
                        "input '{}' must not be empty",
                        spec.name
                    )));
                }

                if !spec.allowed.is_empty()
                    && !spec
                        .allowed
                        .iter()
                        .any(|allowed| allowed.eq_ignore_ascii_case(text.trim()))
                {
                    return Err(Error::validation(format!(
                        "input '{}' must be one of {:?}, got '{text}'",
                        spec.name, spec.allowed
                    )));
                }
            }
        }

        for name in values.keys() {
            if self.input(name).is_none() {
                tracing::warn!(
                    target: TRACING_TARGET,
                    input = %name,
                    "ignoring undeclared input"
                );
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn values(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    fn base() -> Value {
        json!({
            "jsonCredentials": "{}",
            "bucketName": "bucket",
            "operation": "READ",
            "objectName": "a.txt",
        })
    }

    #[test]
    fn embedded_descriptor_parses() {
        let metadata = ActivityMetadata::embedded().unwrap();
        assert_eq!(metadata.name, "gcpstorage");
        assert!(metadata.input(names::ACL).is_some());
        assert_eq!(
            metadata.output(names::OUTPUT).unwrap().field_type,
            FieldType::String
        );
    }

    #[test]
    fn descriptor_must_declare_required_inputs() {
        let err = ActivityMetadata::from_json(
            r#"{"name": "x", "inputs": [], "outputs": [{"name": "output", "type": "string"}]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn malformed_descriptor_is_configuration_error() {
        let err = ActivityMetadata::from_json("{").unwrap_err();
        assert_eq!(err.kind_str(), "configuration");
    }

    #[test]
    fn accepts_complete_inputs() {
        let metadata = ActivityMetadata::embedded().unwrap();
        metadata.validate(&values(base())).unwrap();
    }

    #[test]
    fn rejects_missing_required_input() {
        let metadata = ActivityMetadata::embedded().unwrap();
        let mut inputs = values(base());
        inputs.remove("bucketName");

        let err = metadata.validate(&inputs).unwrap_err();
        assert!(err.to_string().contains("bucketName"));
    }

    #[test]
    fn null_counts_as_missing() {
        let metadata = ActivityMetadata::embedded().unwrap();
        let mut inputs = values(base());
        inputs.insert("objectName".into(), Value::Null);

        assert!(metadata.validate(&inputs).is_err());
    }

    #[test]
    fn rejects_blank_required_string() {
        let metadata = ActivityMetadata::embedded().unwrap();
        let mut inputs = values(base());
        inputs.insert("objectName".into(), json!("  "));

        let err = metadata.validate(&inputs).unwrap_err();
        assert!(err.to_string().contains("must not be empty"));
    }

    #[test]
    fn rejects_mistyped_input() {
        let metadata = ActivityMetadata::embedded().unwrap();
        let mut inputs = values(base());
        inputs.insert("overwrite".into(), json!("yes"));

        let err = metadata.validate(&inputs).unwrap_err();
        assert_eq!(err.kind_str(), "validation");
    }

    #[test]
    fn allowed_values_are_case_insensitive() {
        let metadata = ActivityMetadata::embedded().unwrap();
        let mut inputs = values(base());
        inputs.insert("writeOption".into(), json!("append"));
        metadata.validate(&inputs).unwrap();

        inputs.insert("writeOption".into(), json!("REPLACE"));
        assert!(metadata.validate(&inputs).is_err());
    }

    #[test]
    fn field_types() {
        assert!(FieldType::Integer.accepts(&json!(12)));
        assert!(!FieldType::Integer.accepts(&json!(1.5)));
        assert!(FieldType::Params.accepts(&json!({"user1": "a@b.c"})));
        assert!(!FieldType::Params.accepts(&json!({"user1": 1})));
        assert!(FieldType::Any.accepts(&json!([1, 2])));
    }
}
