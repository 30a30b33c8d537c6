use serde::Deserialize;

/// Node payload stored by the graph editor.
#[derive(Debug, Deserialize, Clone)]
pub struct CanvasNodeData {
    pub label: Option<String>,
    #[serde(alias = "nodeType")]
    pub node_type: String,
    #[serde(default)]
    pub params: serde_json::Map<String, serde_json::Value>,
}

/// Canvas position, ignored by the executor
#[derive(Debug, Deserialize, Clone, Copy, Default)]
pub struct CanvasPosition {
    pub x: f64,
    pub y: f64,
}

/// A node as saved by the editor: its id, the widget kind and the data payload.
#[derive(Debug, Deserialize, Clone)]
pub struct CanvasNode {
    pub id: String,
    #[serde(rename = "type", default)]
    pub widget: Option<String>,
    #[serde(default)]
    pub position: CanvasPosition,
    pub data: CanvasNodeData,
}

/// Editor edge. Handles are nullable when the user connected default ports.
#[derive(Debug, Deserialize, Clone)]
pub struct CanvasEdge {
    #[serde(default)]
    pub id: Option<String>,
    pub source: String,
    #[serde(default, alias = "sourceHandle")]
    pub source_handle: Option<String>,
    pub target: String,
    #[serde(default, alias = "targetHandle")]
    pub target_handle: Option<String>,
}

/// Complete editor document
#[derive(Debug, Deserialize, Clone)]
pub struct CanvasDocument {
    pub nodes: Vec<CanvasNode>,
    #[serde(default)]
    pub edges: Vec<CanvasEdge>,
}
