use serde::Serialize;
use serde_json::Value as JsonValue;

/// A named input or output slot on a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PortSpec {
    pub name: String,
    pub datatype: String,
}

impl PortSpec {
    pub fn new(name: &str, datatype: &str) -> Self {
        Self {
            name: name.to_string(),
            datatype: datatype.to_string(),
        }
    }
}

/// The widget and constraints of a parameter.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ParameterKind {
    Slider { min: f64, max: f64, step: f64 },
    Select { options: Vec<String> },
}

/// Describes one configurable parameter of a node type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterSpec {
    pub name: String,
    #[serde(flatten)]
    pub kind: ParameterKind,
    pub default: JsonValue,
}

impl ParameterSpec {
    pub fn slider(name: &str, default: impl Into<JsonValue>, min: f64, max: f64, step: f64) -> Self {
        Self {
            name: name.to_string(),
            kind: ParameterKind::Slider { min, max, step },
            default: default.into(),
        }
    }

    pub fn select<I, S>(name: &str, default: &str, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.to_string(),
            kind: ParameterKind::Select {
                options: options.into_iter().map(Into::into).collect(),
            },
            default: JsonValue::String(default.to_string()),
        }
    }
}

/// Static, type-level description of a node, exposed for editors and documentation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeMetadata {
    pub node_type: String,
    pub display_name: String,
    pub category: String,
    pub input_ports: Vec<PortSpec>,
    pub output_ports: Vec<PortSpec>,
    pub parameter_schema: Vec<ParameterSpec>,
}
