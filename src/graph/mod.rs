//! Structural checks and ordering for pipeline graphs.

use crate::error::GraphError;
use crate::pipeline::PipelineDefinition;
use ahash::AHashSet;

mod sort;

pub use sort::topological_sort;

/// Rejects pipelines whose node ids are not unique.
///
/// Dangling edge endpoints are not an error here; they simply never carry data.
pub fn validate(pipeline: &PipelineDefinition) -> Result<(), GraphError> {
    let mut seen = AHashSet::with_capacity(pipeline.nodes.len());
    for node in &pipeline.nodes {
        if !seen.insert(node.id.as_str()) {
            return Err(GraphError::DuplicateNodeId(node.id.clone()));
        }
    }
    Ok(())
}

/// Validates the pipeline and returns its execution order.
pub fn execution_order(pipeline: &PipelineDefinition) -> Result<Vec<String>, GraphError> {
    validate(pipeline)?;
    topological_sort(&pipeline.nodes, &pipeline.edges)
}
