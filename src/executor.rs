use crate::error::PipelineError;
use crate::graph;
use crate::node::{OutputBag, Params, PortMap};
use crate::pipeline::{NodeDefinition, PipelineDefinition, ResultsMap};
use crate::registry::NodeRegistry;
use ahash::AHashMap;
use std::time::Instant;
use tracing::{debug, info, info_span, warn};

/// Everything one run produced.
#[derive(Debug)]
pub struct PipelineRun {
    /// Node ids in the order they executed.
    pub order: Vec<String>,
    /// Output bag of every executed node, keyed by node id.
    pub outputs: AHashMap<String, OutputBag>,
    /// The caller-facing metrics and previews.
    pub results: ResultsMap,
}

/// Runs pipeline definitions against a node registry.
///
/// Runs are synchronous: nodes execute one at a time in topological order and
/// the first failure aborts the run. Each run owns its outputs, so one
/// executor can be reused, and one registry can back many executors.
#[derive(Debug, Clone, Copy)]
pub struct Executor<'r> {
    registry: &'r NodeRegistry,
}

impl<'r> Executor<'r> {
    pub fn new(registry: &'r NodeRegistry) -> Self {
        Self { registry }
    }

    /// Runs the pipeline and returns the results map.
    ///
    /// # Errors
    ///
    /// * `PipelineError::Graph`: duplicate ids or a cycle, raised before any node runs.
    /// * `PipelineError::UnknownNodeType`: a node's type is not registered. Nodes
    ///   ordered before it have already run; nothing after it runs.
    /// * `PipelineError::NodeFailed`: a node's `execute` returned an error.
    pub fn run(&self, pipeline: &PipelineDefinition) -> Result<ResultsMap, PipelineError> {
        self.execute(pipeline).map(|run| run.results)
    }

    /// Runs the pipeline and returns the execution order and every output bag
    /// alongside the results map.
    pub fn execute(&self, pipeline: &PipelineDefinition) -> Result<PipelineRun, PipelineError> {
        let order = graph::execution_order(pipeline)?;
        let definitions: AHashMap<&str, &NodeDefinition> = pipeline
            .nodes
            .iter()
            .map(|n| (n.id.as_str(), n))
            .collect();

        info!(
            nodes = pipeline.nodes.len(),
            edges = pipeline.edges.len(),
            "starting pipeline run"
        );
        let run_start = Instant::now();

        let mut outputs: AHashMap<String, OutputBag> = AHashMap::with_capacity(order.len());
        let mut results = ResultsMap::new();

        for node_id in &order {
            let definition = definitions[node_id.as_str()];
            let span = info_span!("node", id = %node_id, node_type = %definition.node_type);
            let _enter = span.enter();

            let node = self
                .registry
                .create(&definition.node_type)
                .map_err(|_| PipelineError::UnknownNodeType {
                    node_id: node_id.clone(),
                    node_type: definition.node_type.clone(),
                })?;

            let inputs = resolve_inputs(pipeline, node_id, &outputs);
            let params = Params::new(&definition.params);

            let node_start = Instant::now();
            let bag = node
                .execute(&inputs, &params)
                .map_err(|source| PipelineError::NodeFailed {
                    node_id: node_id.clone(),
                    node_type: definition.node_type.clone(),
                    source,
                })?;
            debug!(
                elapsed = ?node_start.elapsed(),
                ports = bag.ports().len(),
                "node finished"
            );

            results.record(
                node_id,
                &definition.node_type,
                bag.metrics().cloned(),
                bag.preview().cloned(),
            );
            outputs.insert(node_id.clone(), bag);
        }

        info!(
            elapsed = ?run_start.elapsed(),
            reported = results.len(),
            "pipeline run finished"
        );
        Ok(PipelineRun {
            order,
            outputs,
            results,
        })
    }
}

/// Binds upstream outputs to the input ports of `node_id`.
///
/// Edges are scanned in list order; when two edges feed the same input port
/// the later one wins. Edges whose source has not produced the named port
/// contribute nothing, so the port stays absent.
fn resolve_inputs(
    pipeline: &PipelineDefinition,
    node_id: &str,
    outputs: &AHashMap<String, OutputBag>,
) -> PortMap {
    let mut inputs = PortMap::new();
    for edge in pipeline.incoming_edges(node_id) {
        let Some(data) = outputs
            .get(&edge.source)
            .and_then(|bag| bag.get(&edge.source_handle))
        else {
            debug!(
                source = %edge.source,
                source_handle = %edge.source_handle,
                "no upstream value for edge"
            );
            continue;
        };
        if inputs
            .insert(edge.target_handle.clone(), data.clone())
            .is_some()
        {
            warn!(
                target_handle = %edge.target_handle,
                source = %edge.source,
                "input port bound by more than one edge; keeping the later edge"
            );
        }
    }
    inputs
}
