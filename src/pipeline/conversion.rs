use super::canvas::CanvasDocument;
use super::definition::{
    DEFAULT_SOURCE_HANDLE, DEFAULT_TARGET_HANDLE, EdgeDefinition, NodeDefinition,
    PipelineDefinition,
};
use crate::error::PipelineConversionError;

/// A trait for custom document formats that can be converted into a `PipelineDefinition`.
///
/// The executor only understands `PipelineDefinition`. Implement this trait on
/// your own editor or storage structs to translate them into a run request.
///
/// # Example
///
/// ```rust,no_run
/// use nodeflow::prelude::*;
/// use nodeflow::error::PipelineConversionError;
///
/// struct Step { name: String, kind: String }
/// struct Script { steps: Vec<Step> }
///
/// impl IntoPipeline for Script {
///     fn into_pipeline(self) -> Result<PipelineDefinition, PipelineConversionError> {
///         let nodes: Vec<NodeDefinition> = self
///             .steps
///             .iter()
///             .map(|s| NodeDefinition::new(s.name.clone(), s.kind.clone()))
///             .collect();
///         // Chain every step to the next one through the default ports.
///         let edges = nodes
///             .windows(2)
///             .map(|w| EdgeDefinition::new(w[0].id.clone(), w[1].id.clone()))
///             .collect();
///         Ok(PipelineDefinition::new(nodes, edges))
///     }
/// }
/// ```
pub trait IntoPipeline {
    /// Consumes the object and converts it into a pipeline run request.
    fn into_pipeline(self) -> Result<PipelineDefinition, PipelineConversionError>;
}

impl IntoPipeline for PipelineDefinition {
    fn into_pipeline(self) -> Result<PipelineDefinition, PipelineConversionError> {
        Ok(self)
    }
}

impl IntoPipeline for CanvasDocument {
    fn into_pipeline(self) -> Result<PipelineDefinition, PipelineConversionError> {
        let nodes = self
            .nodes
            .into_iter()
            .map(|node| {
                if node.data.node_type.is_empty() {
                    return Err(PipelineConversionError::ValidationError(format!(
                        "node '{}' has an empty node type",
                        node.id
                    )));
                }
                Ok(NodeDefinition {
                    id: node.id,
                    node_type: node.data.node_type,
                    params: node.data.params,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let edges = self
            .edges
            .into_iter()
            .map(|edge| EdgeDefinition {
                source: edge.source,
                source_handle: edge
                    .source_handle
                    .unwrap_or_else(|| DEFAULT_SOURCE_HANDLE.to_string()),
                target: edge.target,
                target_handle: edge
                    .target_handle
                    .unwrap_or_else(|| DEFAULT_TARGET_HANDLE.to_string()),
            })
            .collect();

        Ok(PipelineDefinition { nodes, edges })
    }
}
