use std::collections::HashSet;

use pathquery::{Cfg, LabeledGraph, Rsm, Symbol, gll_cfpq, hellings_cfpq, matrix_cfpq};
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

/// Runs all three engines and checks they agree before returning the set.
fn all_engines(
    cfg: &Cfg,
    graph: &LabeledGraph,
    starts: Option<&HashSet<NodeIndex>>,
    finals: Option<&HashSet<NodeIndex>>,
) -> HashSet<(NodeIndex, NodeIndex)> {
    let hellings = hellings_cfpq(cfg, graph, starts, finals);
    let matrix = matrix_cfpq(cfg, graph, starts, finals);
    let gll = gll_cfpq(&Rsm::from_cfg(cfg), graph, starts, finals);
    assert_eq!(hellings, matrix, "hellings vs matrix");
    assert_eq!(hellings, gll, "hellings vs gll");
    hellings
}

#[test]
fn test_balanced_brackets_on_a_path() {
    let cfg = Cfg::from_text("S -> a S b | a b").unwrap();
    let graph = graph_from_edges(
        5,
        &[(0, "a", 1), (1, "a", 2), (2, "b", 3), (3, "b", 4)],
    );

    // ab connects 1 to 3; aabb connects 0 to 4.
    assert_eq!(all_engines(&cfg, &graph, None, None), pairs(&[(1, 3), (0, 4)]));

    let starts = nodes(&[0]);
    let finals = nodes(&[1, 3, 4]);
    assert_eq!(
        all_engines(&cfg, &graph, Some(&starts), Some(&finals)),
        pairs(&[(0, 4)]),
    );
}

#[test]
fn test_ambiguous_concatenation_covers_all_spans() {
    let cfg = Cfg::from_text("S -> S S | a").unwrap();
    let graph = graph_from_edges(
        5,
        &[(0, "a", 1), (1, "a", 2), (2, "a", 3), (3, "a", 4)],
    );

    let mut expected = Vec::new();
    for from in 0..5 {
        for to in (from + 1)..5 {
            expected.push((from, to));
        }
    }
    assert_eq!(all_engines(&cfg, &graph, None, None), pairs(&expected));
}

#[test]
fn test_left_recursion_terminates_on_a_cycle() {
    let cfg = Cfg::from_text("S -> S a | a").unwrap();
    let graph = graph_from_edges(3, &[(0, "a", 1), (1, "a", 2), (2, "a", 0)]);

    // a⁺ over a full cycle connects every ordered pair.
    let mut expected = Vec::new();
    for from in 0..3 {
        for to in 0..3 {
            expected.push((from, to));
        }
    }
    assert_eq!(all_engines(&cfg, &graph, None, None), pairs(&expected));
}

#[test]
fn test_nullable_start_contributes_diagonals() {
    let cfg = Cfg::from_text("S -> a S b | $").unwrap();
    let graph = graph_from_edges(3, &[(0, "a", 1), (1, "b", 2)]);

    assert_eq!(
        all_engines(&cfg, &graph, None, None),
        pairs(&[(0, 0), (1, 1), (2, 2), (0, 2)]),
    );

    let both = nodes(&[1]);
    assert_eq!(
        all_engines(&cfg, &graph, Some(&both), Some(&both)),
        pairs(&[(1, 1)]),
    );
}

#[test]
fn test_multi_variable_grammar() {
    let cfg = Cfg::from_text("S -> A B\nA -> a | $\nB -> b").unwrap();
    let graph = graph_from_edges(3, &[(0, "a", 1), (1, "b", 2)]);

    // ab spans 0→2; the nullable A also admits the bare b at 1→2.
    assert_eq!(
        all_engines(&cfg, &graph, None, None),
        pairs(&[(0, 2), (1, 2)]),
    );
}

#[test]
fn test_terminal_absent_from_graph_gives_nothing() {
    let cfg = Cfg::from_text("S -> c").unwrap();
    let graph = graph_from_edges(2, &[(0, "a", 1)]);
    assert!(all_engines(&cfg, &graph, None, None).is_empty());
}

#[test]
fn test_empty_filter_sets_mean_no_filter() {
    let cfg = Cfg::from_text("S -> a").unwrap();
    let graph = graph_from_edges(3, &[(0, "a", 1), (1, "a", 2)]);
    let no_filter = all_engines(&cfg, &graph, None, None);
    let empty = HashSet::new();
    assert_eq!(
        all_engines(&cfg, &graph, Some(&empty), Some(&empty)),
        no_filter,
    );
    assert_eq!(no_filter, pairs(&[(0, 1), (1, 2)]));
}

#[test]
fn test_filtering_commutes_with_full_query() {
    let cfg = Cfg::from_text("S -> S S | a").unwrap();
    let graph = graph_from_edges(4, &[(0, "a", 1), (1, "a", 2), (2, "a", 3)]);
    let starts = nodes(&[0, 1]);
    let finals = nodes(&[2, 3]);

    let full = all_engines(&cfg, &graph, None, None);
    let filtered = all_engines(&cfg, &graph, Some(&starts), Some(&finals));
    let intersected: HashSet<_> = full
        .into_iter()
        .filter(|(u, v)| starts.contains(u) && finals.contains(v))
        .collect();
    assert_eq!(filtered, intersected);
}

#[test]
fn test_repeated_invocation_is_stable() {
    let cfg = Cfg::from_text("S -> a S b | a b").unwrap();
    let graph = graph_from_edges(
        5,
        &[(0, "a", 1), (1, "a", 2), (2, "b", 3), (3, "b", 4)],
    );
    let first = all_engines(&cfg, &graph, None, None);
    let second = all_engines(&cfg, &graph, None, None);
    assert_eq!(first, second);
}

#[test]
fn test_adding_an_edge_only_grows_the_result() {
    let cfg = Cfg::from_text("S -> a S b | a b").unwrap();
    let sparse = graph_from_edges(4, &[(0, "a", 1), (1, "b", 2)]);
    let denser = graph_from_edges(4, &[(0, "a", 1), (1, "b", 2), (1, "a", 1)]);

    let before = all_engines(&cfg, &sparse, None, None);
    let after = all_engines(&cfg, &denser, None, None);
    assert!(before.is_subset(&after));
    assert!(after.contains(&(NodeIndex::new(0), NodeIndex::new(2))));
}
