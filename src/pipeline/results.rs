use serde::Serialize;
use std::collections::BTreeMap;

/// The caller-visible summary of one node: its type plus whatever metrics and
/// preview it reported.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeResult {
    pub node_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview: Option<serde_json::Value>,
}

/// Results of a run keyed by node id. Only nodes that reported metrics or a
/// preview have an entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ResultsMap {
    entries: BTreeMap<String, NodeResult>,
}

impl ResultsMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds the reserved entries of a finished node into the map.
    pub(crate) fn record(
        &mut self,
        node_id: &str,
        node_type: &str,
        metrics: Option<serde_json::Value>,
        preview: Option<serde_json::Value>,
    ) {
        if metrics.is_none() && preview.is_none() {
            return;
        }
        self.entries.insert(
            node_id.to_string(),
            NodeResult {
                node_type: node_type.to_string(),
                metrics,
                preview,
            },
        );
    }

    pub fn get(&self, node_id: &str) -> Option<&NodeResult> {
        self.entries.get(node_id)
    }

    pub fn contains(&self, node_id: &str) -> bool {
        self.entries.contains_key(node_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &NodeResult)> {
        self.entries.iter()
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}
