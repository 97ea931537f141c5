//! Function tool definitions and parameter schemas.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::response::FunctionToolCall;

/// Describes a single property in a function parameter schema.
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct Property {
    /// The JSON type (e.g., "string", "number", "object").
    #[serde(rename = "type")]
    pub prop_type: String,
    /// Human-readable description of this property.
    pub description: String,
    /// Allowed enum values for this property.
    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,
    /// Schema for array items.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Self>>,
    /// Nested object properties.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<HashMap<String, Self>>,
    /// Required fields for nested objects.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,
}

impl Property {
    fn typed(prop_type: &str, description: impl Into<String>) -> Self {
        Self {
            prop_type: prop_type.to_string(),
            description: description.into(),
            enum_values: None,
            items: None,
            properties: None,
            required: None,
        }
    }

    /// Creates a string property.
    #[must_use]
    pub fn string(description: impl Into<String>) -> Self {
        Self::typed("string", description)
    }

    /// Creates a number property.
    #[must_use]
    pub fn number(description: impl Into<String>) -> Self {
        Self::typed("number", description)
    }

    /// Creates an integer property.
    #[must_use]
    pub fn integer(description: impl Into<String>) -> Self {
        Self::typed("integer", description)
    }

    /// Creates a boolean property.
    #[must_use]
    pub fn boolean(description: impl Into<String>) -> Self {
        Self::typed("boolean", description)
    }

    /// Creates a string property restricted to `values`.
    #[must_use]
    pub fn string_enum(description: impl Into<String>, values: &[&str]) -> Self {
        Self {
            enum_values: Some(values.iter().map(ToString::to_string).collect()),
            ..Self::typed("string", description)
        }
    }

    /// Creates an array property whose elements match `items`.
    #[must_use]
    pub fn array(description: impl Into<String>, items: Self) -> Self {
        Self {
            items: Some(Box::new(items)),
            ..Self::typed("array", description)
        }
    }

    /// Creates an object property with nested properties.
    #[must_use]
    pub fn object(
        description: impl Into<String>,
        properties: HashMap<String, Self>,
        required: Vec<String>,
    ) -> Self {
        Self {
            properties: Some(properties),
            required: Some(required),
            ..Self::typed("object", description)
        }
    }
}

/// The top-level parameter schema of a function, always a JSON object.
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct Parameters {
    /// The JSON type, always "object".
    #[serde(rename = "type")]
    pub param_type: String,
    /// Map of parameter names to their property definitions.
    pub properties: HashMap<String, Property>,
    /// List of required parameter names.
    pub required: Vec<String>,
    /// Whether properties beyond `properties` are accepted.
    #[serde(rename = "additionalProperties")]
    pub additional_properties: bool,
}

impl Parameters {
    /// Creates an object schema with the given properties.
    #[must_use]
    pub fn new(properties: HashMap<String, Property>, required: Vec<String>) -> Self {
        Self {
            param_type: "object".to_string(),
            properties,
            required,
            additional_properties: false,
        }
    }

    /// An object schema with no parameters.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(HashMap::new(), Vec::new())
    }

    /// Converts the schema to a JSON value.
    ///
    /// # Errors
    ///
    /// Returns a `serde_json::Error` if serialization fails.
    pub fn to_value(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

/// Describes a function the model may call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FunctionDefinition {
    /// The name of the function.
    pub name: String,
    /// Human-readable description of what the function does.
    #[serde(default)]
    pub description: String,
    /// JSON Schema of the function's parameters.
    pub parameters: serde_json::Value,
    /// Whether the model must follow the schema exactly.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strict: Option<bool>,
}

impl FunctionDefinition {
    /// Creates a definition from a parameter schema.
    ///
    /// # Errors
    ///
    /// Returns a `serde_json::Error` if the schema cannot be serialized.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: &Parameters,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self {
            name: name.into(),
            description: description.into(),
            parameters: parameters.to_value()?,
            strict: None,
        })
    }
}

/// A pending invocation of a local function, taken from a `function_call` item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Correlates the call with its output item.
    pub call_id: String,
    /// The name of the function being called.
    pub name: String,
    /// The arguments as a single JSON string.
    pub arguments: String,
}

impl ToolCall {
    /// Returns the arguments as a JSON string slice.
    ///
    /// Returns `"{}"` if the arguments string is empty.
    #[must_use]
    pub fn arguments_json(&self) -> &str {
        if self.arguments.trim().is_empty() {
            "{}"
        } else {
            &self.arguments
        }
    }
}

impl From<&FunctionToolCall> for ToolCall {
    fn from(call: &FunctionToolCall) -> Self {
        Self {
            call_id: call.call_id.clone(),
            name: call.name.clone(),
            arguments: call.arguments.clone(),
        }
    }
}
