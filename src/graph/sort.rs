use crate::error::GraphError;
use crate::pipeline::{EdgeDefinition, NodeDefinition};
use ahash::{AHashMap, AHashSet};
use itertools::Itertools;
use std::collections::VecDeque;
use tracing::{debug, trace};

/// Orders node ids so that every edge's source precedes its target (Kahn's algorithm).
///
/// Nodes with no incoming edges are seeded in node-list order; nodes that become
/// ready while draining the queue are appended in the order they were discovered.
///
/// Edges that reference undeclared ids are tolerated. An undeclared target is
/// counted but never emitted, and an undeclared source never holds its target
/// back, since nothing will ever run to release it.
///
/// # Errors
///
/// Returns `GraphError::Cycle` with the ids that never became ready when the
/// declared nodes do not form a DAG. No partial order is returned.
pub fn topological_sort(
    nodes: &[NodeDefinition],
    edges: &[EdgeDefinition],
) -> Result<Vec<String>, GraphError> {
    let declared: AHashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
    let mut adjacency: AHashMap<&str, Vec<&str>> = AHashMap::new();
    let mut in_degree: AHashMap<&str, usize> =
        nodes.iter().map(|n| (n.id.as_str(), 0)).collect();

    for edge in edges {
        if !declared.contains(edge.source.as_str()) {
            debug!(
                source = %edge.source,
                target = %edge.target,
                "ignoring edge from undeclared node"
            );
            continue;
        }
        if !declared.contains(edge.target.as_str()) {
            debug!(
                source = %edge.source,
                target = %edge.target,
                "edge targets undeclared node"
            );
        }
        adjacency
            .entry(edge.source.as_str())
            .or_default()
            .push(edge.target.as_str());
        *in_degree.entry(edge.target.as_str()).or_insert(0) += 1;
    }

    // Seed from the node list rather than the map so ties keep declaration order.
    let mut queue: VecDeque<&str> = nodes
        .iter()
        .map(|n| n.id.as_str())
        .filter(|id| in_degree.get(id) == Some(&0))
        .collect();

    let mut order = Vec::with_capacity(nodes.len());
    while let Some(id) = queue.pop_front() {
        order.push(id.to_string());
        let Some(targets) = adjacency.get(id) else {
            continue;
        };
        for &target in targets {
            if let Some(degree) = in_degree.get_mut(target) {
                *degree -= 1;
                if *degree == 0 && declared.contains(target) {
                    queue.push_back(target);
                }
            }
        }
    }

    if order.len() != nodes.len() {
        let emitted: AHashSet<&str> = order.iter().map(String::as_str).collect();
        let remaining = nodes
            .iter()
            .filter(|n| !emitted.contains(n.id.as_str()))
            .map(|n| n.id.clone())
            .collect_vec();
        return Err(GraphError::Cycle { remaining });
    }

    trace!(order = ?order, "computed execution order");
    Ok(order)
}
