use std::collections::HashSet;

use petgraph::graph::{DiGraph, NodeIndex};

use crate::automaton::Symbol;

/// Directed multigraph whose edges each carry a single [`Symbol`] label.
///
/// Node identifiers are the contiguous [`NodeIndex`] values `0..n`. Parallel
/// edges with distinct labels are allowed. Engines treat the graph as
/// immutable for the duration of a query.
pub type LabeledGraph = DiGraph<(), Symbol>;

/// Resolves a caller-provided node set against the graph.
///
/// `None` and the empty set both mean "every node". Indices outside the
/// graph are dropped silently. The result is sorted and deduplicated.
pub(crate) fn node_selection(
    graph: &LabeledGraph,
    nodes: Option<&HashSet<NodeIndex>>,
) -> Vec<usize> {
    let n = graph.node_count();
    match nodes {
        Some(set) if !set.is_empty() => {
            let mut picked: Vec<usize> = set
                .iter()
                .map(|ix| ix.index())
                .filter(|&ix| ix < n)
                .collect();
            picked.sort_unstable();
            picked.dedup();
            picked
        }
        _ => (0..n).collect(),
    }
}

/// Returns true when `node` passes the filter (`None`/empty ⇒ no filter).
pub(crate) fn passes(filter: Option<&HashSet<NodeIndex>>, node: NodeIndex) -> bool {
    match filter {
        Some(set) if !set.is_empty() => set.contains(&node),
        _ => true,
    }
}
