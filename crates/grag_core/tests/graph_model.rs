use std::collections::BTreeSet;

use grag_core::error::codes;
use grag_core::graph::{GraphNode, KnowledgeGraph};
use pretty_assertions::assert_eq;

fn concepts(labels: &[&str]) -> BTreeSet<String> {
    labels.iter().map(|s| s.to_string()).collect()
}

fn three_node_graph() -> KnowledgeGraph {
    let nodes = vec![
        GraphNode {
            index: 0,
            content: "chunk zero".to_string(),
            concepts: concepts(&["A", "B"]),
        },
        GraphNode {
            index: 1,
            content: "chunk one".to_string(),
            concepts: concepts(&["A", "C"]),
        },
        GraphNode {
            index: 2,
            content: "chunk two".to_string(),
            concepts: concepts(&["B"]),
        },
    ];
    KnowledgeGraph::new(nodes, 0.8)
}

#[test]
fn add_edge_normalizes_endpoint_order() {
    let mut graph = three_node_graph();
    graph
        .add_edge(1, 0, 0.1, 0.9, concepts(&["A"]))
        .expect("edge");

    let edge = graph.edge_between(0, 1).expect("edge exists");
    assert_eq!((edge.a, edge.b), (0, 1));
    assert!(graph.edge_between(1, 0).is_some());
    assert_eq!(graph.edge_count(), 1);
}

#[test]
fn add_edge_rejects_self_loops() {
    let mut graph = three_node_graph();
    let err = graph.add_edge(1, 1, 0.1, 1.0, BTreeSet::new()).unwrap_err();
    assert_eq!(err.code, codes::GRAPH_INVARIANT_VIOLATION);
}

#[test]
fn add_edge_rejects_missing_nodes() {
    let mut graph = three_node_graph();
    let err = graph.add_edge(0, 9, 0.1, 0.9, BTreeSet::new()).unwrap_err();
    assert_eq!(err.code, codes::GRAPH_INVARIANT_VIOLATION);
}

#[test]
fn add_edge_rejects_duplicate_pairs() {
    let mut graph = three_node_graph();
    graph
        .add_edge(0, 1, 0.1, 0.9, concepts(&["A"]))
        .expect("first edge");
    let err = graph.add_edge(1, 0, 0.2, 0.9, BTreeSet::new()).unwrap_err();
    assert_eq!(err.code, codes::GRAPH_INVARIANT_VIOLATION);
}

#[test]
fn add_edge_rejects_shared_concepts_outside_intersection() {
    let mut graph = three_node_graph();
    // "B" is not a concept of node 1.
    let err = graph.add_edge(0, 1, 0.1, 0.9, concepts(&["B"])).unwrap_err();
    assert_eq!(err.code, codes::GRAPH_INVARIANT_VIOLATION);

    // The legitimate intersection is accepted.
    graph
        .add_edge(0, 1, 0.1, 0.9, concepts(&["A"]))
        .expect("intersection edge");
}

#[test]
fn neighbors_sorted_by_weight_then_index() {
    let mut graph = three_node_graph();
    graph
        .add_edge(0, 1, 0.05, 0.85, concepts(&["A"]))
        .expect("edge 0-1");
    graph
        .add_edge(0, 2, 0.20, 0.95, concepts(&["B"]))
        .expect("edge 0-2");

    let neighbors = graph.neighbors(0);
    assert_eq!(
        neighbors.iter().map(|(n, _)| *n).collect::<Vec<_>>(),
        vec![2, 1]
    );
    assert!(graph.neighbors(1).len() == 1);
    assert!(graph.neighbors(9).is_empty());
}

#[test]
fn graph_serializes_to_json() {
    let mut graph = three_node_graph();
    graph
        .add_edge(0, 1, 0.09975, 0.95, concepts(&["A"]))
        .expect("edge");

    let json = serde_json::to_value(&graph).expect("serialize");
    // f32 values widen to f64 in JSON; compare with a tolerance.
    let threshold = json["edges_threshold"].as_f64().expect("threshold");
    assert!((threshold - 0.8).abs() < 1e-6);
    assert_eq!(json["nodes"].as_array().map(|n| n.len()), Some(3));
    assert_eq!(json["edges"][0]["shared_concepts"][0], "A");
}
