use std::collections::HashSet;

use pathquery::{LabeledGraph, Symbol, ms_bfs_rpq, tensor_rpq};
use petgraph::graph::NodeIndex;

fn graph_from_edges(nodes: usize, edges: &[(usize, &str, usize)]) -> LabeledGraph {
    let mut graph = LabeledGraph::new();
    let indices: Vec<NodeIndex> = (0..nodes).map(|_| graph.add_node(())).collect();
    for &(from, label, to) in edges {
        graph.add_edge(indices[from], indices[to], Symbol::new(label));
    }
    graph
}

fn nodes(ids: &[usize]) -> HashSet<NodeIndex> {
    ids.iter().map(|&i| NodeIndex::new(i)).collect()
}

fn pairs(list: &[(usize, usize)]) -> HashSet<(NodeIndex, NodeIndex)> {
    list.iter()
        .map(|&(u, v)| (NodeIndex::new(u), NodeIndex::new(v)))
        .collect()
}

fn cycle_of_a(n: usize) -> LabeledGraph {
    let edges: Vec<(usize, &str, usize)> = (0..n).map(|i| (i, "a", (i + 1) % n)).collect();
    graph_from_edges(n, &edges)
}

#[test]
fn test_cycle_reaches_every_node_from_source() {
    let graph = cycle_of_a(5);
    let starts = nodes(&[0]);
    let finals = nodes(&[0, 1, 2, 3, 4]);
    let expected = pairs(&[(0, 0), (0, 1), (0, 2), (0, 3), (0, 4)]);

    let tensor = tensor_rpq("a.(a|b)*", &graph, Some(&starts), Some(&finals)).unwrap();
    let bfs = ms_bfs_rpq("a.(a|b)*", &graph, Some(&starts), Some(&finals)).unwrap();
    assert_eq!(tensor, expected);
    assert_eq!(bfs, expected);
}

#[test]
fn test_empty_pattern_matches_nothing() {
    let graph = cycle_of_a(4);
    assert!(tensor_rpq("", &graph, None, None).unwrap().is_empty());
    assert!(ms_bfs_rpq("", &graph, None, None).unwrap().is_empty());
}

#[test]
fn test_star_on_isolated_node_yields_identity() {
    let graph = graph_from_edges(1, &[]);
    let only = nodes(&[0]);
    let expected = pairs(&[(0, 0)]);

    assert_eq!(
        tensor_rpq("a*", &graph, Some(&only), Some(&only)).unwrap(),
        expected,
    );
    assert_eq!(
        ms_bfs_rpq("a*", &graph, Some(&only), Some(&only)).unwrap(),
        expected,
    );
}

#[test]
fn test_empty_word_pairs_on_start_final_overlap() {
    let graph = cycle_of_a(3);
    let starts = nodes(&[0, 1]);
    let finals = nodes(&[1, 2]);

    let result = tensor_rpq("a*", &graph, Some(&starts), Some(&finals)).unwrap();
    // (1, 1) comes from the empty word; the rest from spinning the cycle.
    assert_eq!(result, pairs(&[(0, 1), (0, 2), (1, 1), (1, 2)]));
    assert_eq!(
        ms_bfs_rpq("a*", &graph, Some(&starts), Some(&finals)).unwrap(),
        result,
    );
}

#[test]
fn test_concatenation_walks_the_path() {
    let graph = graph_from_edges(4, &[(0, "a", 1), (1, "b", 2), (2, "b", 3)]);
    let result = tensor_rpq("a.b", &graph, None, None).unwrap();
    assert_eq!(result, pairs(&[(0, 2)]));
    assert_eq!(ms_bfs_rpq("a.b", &graph, None, None).unwrap(), result);
}

#[test]
fn test_multi_character_labels_are_single_symbols() {
    let graph = graph_from_edges(
        3,
        &[(0, "knows", 1), (1, "knows", 2), (1, "likes", 2)],
    );
    let result = tensor_rpq("knows.likes", &graph, None, None).unwrap();
    assert_eq!(result, pairs(&[(0, 2)]));
    assert_eq!(
        ms_bfs_rpq("knows.likes", &graph, None, None).unwrap(),
        result,
    );
}

#[test]
fn test_alternation_over_parallel_edges() {
    let graph = graph_from_edges(2, &[(0, "a", 1), (0, "b", 1), (1, "a", 0)]);
    let result = tensor_rpq("a|b", &graph, None, None).unwrap();
    assert_eq!(result, pairs(&[(0, 1), (1, 0)]));
    assert_eq!(ms_bfs_rpq("a|b", &graph, None, None).unwrap(), result);
}

#[test]
fn test_unknown_start_nodes_are_ignored() {
    let graph = graph_from_edges(2, &[(0, "a", 1)]);
    let starts = nodes(&[0, 17]);
    let result = tensor_rpq("a", &graph, Some(&starts), None).unwrap();
    assert_eq!(result, pairs(&[(0, 1)]));
    assert_eq!(
        ms_bfs_rpq("a", &graph, Some(&starts), None).unwrap(),
        result,
    );
}

#[test]
fn test_repeated_invocation_is_stable() {
    let graph = cycle_of_a(4);
    let first = tensor_rpq("a.a*", &graph, None, None).unwrap();
    let second = tensor_rpq("a.a*", &graph, None, None).unwrap();
    assert_eq!(first, second);

    let bfs_first = ms_bfs_rpq("a.a*", &graph, None, None).unwrap();
    let bfs_second = ms_bfs_rpq("a.a*", &graph, None, None).unwrap();
    assert_eq!(bfs_first, bfs_second);
    assert_eq!(first, bfs_first);
}

#[test]
fn test_malformed_pattern_surfaces_error() {
    let graph = cycle_of_a(2);
    assert!(tensor_rpq("a|", &graph, None, None).is_err());
    assert!(ms_bfs_rpq("(a", &graph, None, None).is_err());
}
