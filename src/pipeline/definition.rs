use serde::{Deserialize, Serialize};

/// Port name used when an edge does not name its source handle.
pub const DEFAULT_SOURCE_HANDLE: &str = "output";
/// Port name used when an edge does not name its target handle.
pub const DEFAULT_TARGET_HANDLE: &str = "input";

fn default_source_handle() -> String {
    DEFAULT_SOURCE_HANDLE.to_string()
}

fn default_target_handle() -> String {
    DEFAULT_TARGET_HANDLE.to_string()
}

/// The complete definition of a pipeline run: an ordered node list and an
/// ordered edge list. This is the request body accepted by the executor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineDefinition {
    pub nodes: Vec<NodeDefinition>,
    #[serde(default)]
    pub edges: Vec<EdgeDefinition>,
}

/// A single node instance in the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDefinition {
    pub id: String,
    /// Registry key of the node implementation.
    #[serde(rename = "type", alias = "node_type")]
    pub node_type: String,
    #[serde(default)]
    pub params: serde_json::Map<String, serde_json::Value>,
}

/// A directed binding from one node's output port to another node's input port.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeDefinition {
    pub source: String,
    #[serde(
        rename = "sourceHandle",
        alias = "source_handle",
        default = "default_source_handle"
    )]
    pub source_handle: String,
    pub target: String,
    #[serde(
        rename = "targetHandle",
        alias = "target_handle",
        default = "default_target_handle"
    )]
    pub target_handle: String,
}

impl NodeDefinition {
    pub fn new(id: impl Into<String>, node_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            node_type: node_type.into(),
            params: serde_json::Map::new(),
        }
    }

    /// Sets a parameter, consuming and returning the definition.
    pub fn with_param(mut self, name: &str, value: impl Into<serde_json::Value>) -> Self {
        self.params.insert(name.to_string(), value.into());
        self
    }
}

impl EdgeDefinition {
    /// An edge between the default `output` and `input` ports.
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            source_handle: default_source_handle(),
            target: target.into(),
            target_handle: default_target_handle(),
        }
    }

    pub fn with_handles(
        source: impl Into<String>,
        source_handle: impl Into<String>,
        target: impl Into<String>,
        target_handle: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            source_handle: source_handle.into(),
            target: target.into(),
            target_handle: target_handle.into(),
        }
    }
}

impl PipelineDefinition {
    pub fn new(nodes: Vec<NodeDefinition>, edges: Vec<EdgeDefinition>) -> Self {
        Self { nodes, edges }
    }

    /// Parses a run request from its JSON form.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Edges whose target is `node_id`, in edge-list order.
    pub fn incoming_edges<'a>(&'a self, node_id: &'a str) -> impl Iterator<Item = &'a EdgeDefinition> {
        self.edges.iter().filter(move |e| e.target == node_id)
    }
}
