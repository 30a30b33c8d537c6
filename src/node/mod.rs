//! The contract every pluggable computation implements.

use crate::data::PortData;
use crate::error::NodeError;
use ahash::AHashMap;
use serde_json::Value as JsonValue;

mod metadata;
mod params;

pub use metadata::*;
pub use params::Params;

/// Input values keyed by input-port name. A port with no upstream binding is
/// absent from the map.
pub type PortMap = AHashMap<String, PortData>;

/// Everything a node produced in one run: values on its output ports, plus the
/// optional `metrics` and `preview` summaries surfaced to the caller.
#[derive(Debug, Clone, Default)]
pub struct OutputBag {
    ports: PortMap,
    metrics: Option<JsonValue>,
    preview: Option<JsonValue>,
}

impl OutputBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_output(mut self, port: &str, data: impl Into<PortData>) -> Self {
        self.ports.insert(port.to_string(), data.into());
        self
    }

    pub fn with_metrics(mut self, metrics: JsonValue) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn with_preview(mut self, preview: JsonValue) -> Self {
        self.preview = Some(preview);
        self
    }

    /// The value on an output port, if the node produced one.
    pub fn get(&self, port: &str) -> Option<&PortData> {
        self.ports.get(port)
    }

    pub fn ports(&self) -> &PortMap {
        &self.ports
    }

    pub fn metrics(&self) -> Option<&JsonValue> {
        self.metrics.as_ref()
    }

    pub fn preview(&self) -> Option<&JsonValue> {
        self.preview.as_ref()
    }
}

/// A computational step that can be placed in a pipeline.
///
/// Implementations are built fresh for every node of every run through the
/// factory stored in the [`NodeRegistry`](crate::registry::NodeRegistry), so
/// they should be cheap to construct. Port and parameter declarations are
/// descriptive only; the executor does not check runtime keys against them.
pub trait Node: Send + Sync {
    /// Unique identifier of this node type, used as the registry key.
    fn node_type(&self) -> &str;
    fn display_name(&self) -> &str;
    /// Grouping for editors, e.g. `data`, `preprocess` or `model`.
    fn category(&self) -> &str;

    fn input_ports(&self) -> Vec<PortSpec> {
        Vec::new()
    }

    fn output_ports(&self) -> Vec<PortSpec> {
        Vec::new()
    }

    fn parameter_schema(&self) -> Vec<ParameterSpec> {
        Vec::new()
    }

    /// Runs the node against the values bound to its input ports.
    fn execute(&self, inputs: &PortMap, params: &Params<'_>) -> Result<OutputBag, NodeError>;

    /// Snapshot of the node's static description.
    fn metadata(&self) -> NodeMetadata {
        NodeMetadata {
            node_type: self.node_type().to_string(),
            display_name: self.display_name().to_string(),
            category: self.category().to_string(),
            input_ports: self.input_ports(),
            output_ports: self.output_ports(),
            parameter_schema: self.parameter_schema(),
        }
    }
}

/// Looks up a required input port, failing with `NodeError::MissingInput` when
/// nothing upstream is bound to it.
pub fn require_input<'a>(inputs: &'a PortMap, port: &str) -> Result<&'a PortData, NodeError> {
    inputs
        .get(port)
        .ok_or_else(|| NodeError::MissingInput(port.to_string()))
}
