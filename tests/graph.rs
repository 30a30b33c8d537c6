//! Tests for graph validation and topological ordering.
mod common;
use common::*;
use nodeflow::graph::{execution_order, topological_sort};
use nodeflow::prelude::*;
use proptest::prelude::*;

fn ids(order: &[String]) -> Vec<&str> {
    order.iter().map(String::as_str).collect()
}

#[test]
fn test_linear_chain_order() {
    let nodes = vec![node("c", "x"), node("a", "x"), node("b", "x")];
    let edges = vec![edge("a", "b"), edge("b", "c")];
    let order = topological_sort(&nodes, &edges).unwrap();
    assert_eq!(ids(&order), ["a", "b", "c"]);
}

#[test]
fn test_disconnected_nodes_keep_declaration_order() {
    let nodes = vec![node("second", "x"), node("first", "x")];
    let order = topological_sort(&nodes, &[]).unwrap();
    assert_eq!(ids(&order), ["second", "first"]);
}

#[test]
fn test_diamond_order() {
    let nodes = vec![node("a", "x"), node("b", "x"), node("c", "x"), node("d", "x")];
    let edges = vec![edge("a", "b"), edge("a", "c"), edge("b", "d"), edge("c", "d")];
    let order = topological_sort(&nodes, &edges).unwrap();
    assert_eq!(ids(&order), ["a", "b", "c", "d"]);
}

#[test]
fn test_empty_pipeline_has_empty_order() {
    assert!(topological_sort(&[], &[]).unwrap().is_empty());
}

#[test]
fn test_two_node_cycle_is_reported() {
    let nodes = vec![node("a", "x"), node("b", "x")];
    let edges = vec![edge("a", "b"), edge("b", "a")];
    let err = topological_sort(&nodes, &edges).unwrap_err();
    assert_eq!(
        err,
        GraphError::Cycle {
            remaining: vec!["a".to_string(), "b".to_string()]
        }
    );
    assert!(err.to_string().contains("cycle"));
}

#[test]
fn test_self_loop_is_a_cycle() {
    let nodes = vec![node("root", "x"), node("loop", "x")];
    let edges = vec![edge("root", "loop"), edge("loop", "loop")];
    match topological_sort(&nodes, &edges) {
        Err(GraphError::Cycle { remaining }) => assert_eq!(remaining, vec!["loop".to_string()]),
        other => panic!("expected a cycle, got {:?}", other),
    }
}

#[test]
fn test_dangling_edges_are_tolerated() {
    let nodes = vec![node("a", "x"), node("b", "x")];
    let edges = vec![edge("ghost", "b"), edge("a", "nowhere"), edge("a", "b")];
    let order = topological_sort(&nodes, &edges).unwrap();
    assert_eq!(ids(&order), ["a", "b"]);
}

#[test]
fn test_duplicate_node_ids_are_rejected() {
    let pipeline = PipelineDefinition::new(vec![node("a", "x"), node("a", "y")], vec![]);
    assert_eq!(
        execution_order(&pipeline),
        Err(GraphError::DuplicateNodeId("a".to_string()))
    );
}

/// Random DAGs: edges only run from a lower to a higher index, and nodes are
/// declared in reverse so the order cannot simply follow the node list.
fn dag_strategy() -> impl Strategy<Value = (usize, Vec<(usize, usize)>)> {
    (1usize..12).prop_flat_map(|n| {
        let edges = prop::collection::vec((0..n, 0..n), 0..30)
            .prop_map(|pairs| pairs.into_iter().filter(|(a, b)| a < b).collect::<Vec<_>>());
        (Just(n), edges)
    })
}

fn build(n: usize, pairs: &[(usize, usize)]) -> (Vec<NodeDefinition>, Vec<EdgeDefinition>) {
    let nodes = (0..n).rev().map(|i| node(&format!("n{}", i), "x")).collect();
    let edges = pairs
        .iter()
        .map(|(a, b)| edge(&format!("n{}", a), &format!("n{}", b)))
        .collect();
    (nodes, edges)
}

proptest! {
    #[test]
    fn prop_order_respects_every_edge((n, pairs) in dag_strategy()) {
        let (nodes, edges) = build(n, &pairs);
        let order = topological_sort(&nodes, &edges).unwrap();

        prop_assert_eq!(order.len(), n);
        let position = |id: &str| order.iter().position(|o| o == id).unwrap();
        for e in &edges {
            prop_assert!(position(e.source.as_str()) < position(e.target.as_str()));
        }
    }

    #[test]
    fn prop_order_is_deterministic((n, pairs) in dag_strategy()) {
        let (nodes, edges) = build(n, &pairs);
        let first = topological_sort(&nodes, &edges).unwrap();
        let second = topological_sort(&nodes, &edges).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_closing_a_chain_is_a_cycle(n in 2usize..10) {
        let mut pairs: Vec<(usize, usize)> = (0..n - 1).map(|i| (i, i + 1)).collect();
        pairs.push((n - 1, 0));
        let (nodes, edges) = build(n, &pairs);
        match topological_sort(&nodes, &edges) {
            Err(GraphError::Cycle { remaining }) => prop_assert_eq!(remaining.len(), n),
            other => prop_assert!(false, "expected a cycle, got {:?}", other),
        }
    }
}
