use std::collections::HashSet;

use indexmap::IndexMap;
use petgraph::graph::NodeIndex;
use petgraph::visit::EdgeRef;
use tracing::debug;

use crate::automaton::Symbol;
use crate::grammar::normal::WeakNormalForm;
use crate::grammar::Cfg;
use crate::graph::{self, LabeledGraph};
use crate::matrix::BitMatrix;

/// Evaluates a context-free path query with Boolean matrix products.
///
/// Same fixed point as [`hellings_cfpq`](crate::cfpq::hellings_cfpq), with
/// the relation stored as one node×node matrix per variable: each round
/// computes `M_B · M_C` for every binary rule and ORs it into `M_A`,
/// stopping once no matrix gains a bit.
#[must_use]
pub fn matrix_cfpq(
    cfg: &Cfg,
    graph: &LabeledGraph,
    start_nodes: Option<&HashSet<NodeIndex>>,
    final_nodes: Option<&HashSet<NodeIndex>>,
) -> HashSet<(NodeIndex, NodeIndex)> {
    let wnf = WeakNormalForm::of(cfg);
    let n = graph.node_count();

    let mut matrices: IndexMap<Symbol, BitMatrix> = IndexMap::new();
    for edge in graph.edge_references() {
        for (head, terminal) in &wnf.terminal_rules {
            if terminal == edge.weight() {
                matrices
                    .entry(head.clone())
                    .or_insert_with(|| BitMatrix::new(n, n))
                    .set(edge.source().index(), edge.target().index());
            }
        }
    }
    for variable in &wnf.nullable {
        let matrix = matrices
            .entry(variable.clone())
            .or_insert_with(|| BitMatrix::new(n, n));
        for node in 0..n {
            matrix.set(node, node);
        }
    }

    let mut rounds = 0usize;
    loop {
        let mut changed = false;
        for (head, left, right) in &wnf.binary_rules {
            let product = match (matrices.get(left), matrices.get(right)) {
                (Some(left_m), Some(right_m)) => left_m.mul(right_m),
                _ => continue,
            };
            if product.is_zero() {
                continue;
            }
            changed |= matrices
                .entry(head.clone())
                .or_insert_with(|| BitMatrix::new(n, n))
                .union_with(&product);
        }
        rounds += 1;
        if !changed {
            break;
        }
    }
    debug!(rounds, variables = matrices.len(), "matrix fixed point reached");

    let Some(start_matrix) = matrices.get(&wnf.start) else {
        return HashSet::new();
    };
    start_matrix
        .ones()
        .map(|(from, to)| (NodeIndex::new(from), NodeIndex::new(to)))
        .filter(|&(from, to)| {
            graph::passes(start_nodes, from) && graph::passes(final_nodes, to)
        })
        .collect()
}
