use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Name, description and parameter schema of a callable function.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct FunctionSpec {
    pub name: String,
    pub description: String,
    pub parameters: ParameterSchema,
}

impl FunctionSpec {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: ParameterSchema,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
        }
    }
}

/// JSON-schema-like description of function parameters.
///
/// Only ever shown to the model. Arguments are checked against it solely when
/// the dispatcher is configured to forward model-supplied arguments.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ParameterSchema {
    Object {
        #[serde(default)]
        properties: BTreeMap<String, ParameterSchema>,
        #[serde(default)]
        required: Vec<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
    String {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
        #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
        allowed: Option<Vec<String>>,
    },
    Integer {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
    Number {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
    Boolean {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
    Array {
        items: Box<ParameterSchema>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
}

impl ParameterSchema {
    pub fn object() -> Self {
        ParameterSchema::Object {
            properties: BTreeMap::new(),
            required: Vec::new(),
            description: None,
        }
    }

    pub fn string(description: impl Into<String>) -> Self {
        ParameterSchema::String {
            description: Some(description.into()),
            allowed: None,
        }
    }

    pub fn string_enum(description: impl Into<String>, values: &[&str]) -> Self {
        ParameterSchema::String {
            description: Some(description.into()),
            allowed: Some(values.iter().map(|v| v.to_string()).collect()),
        }
    }

    /// Add a property to an object schema. Non-object schemas are returned unchanged.
    pub fn property(mut self, name: &str, schema: ParameterSchema, required: bool) -> Self {
        if let ParameterSchema::Object {
            properties,
            required: required_names,
            ..
        } = &mut self
        {
            properties.insert(name.to_string(), schema);
            if required && !required_names.iter().any(|r| r == name) {
                required_names.push(name.to_string());
            }
        }
        self
    }

    pub fn to_json(&self) -> serde_json::Value {
        // Every variant serializes to a plain JSON object
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}
