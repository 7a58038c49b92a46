use std::collections::{HashSet, VecDeque};

use petgraph::graph::NodeIndex;
use petgraph::visit::EdgeRef;
use tracing::debug;

use crate::automaton::Symbol;
use crate::grammar::normal::WeakNormalForm;
use crate::grammar::Cfg;
use crate::graph::{self, LabeledGraph};

/// A derivation fact: the path from the first node to the second is labeled
/// by a word the variable generates.
type Triple = (usize, Symbol, usize);

/// Evaluates a context-free path query with Hellings' algorithm.
///
/// The grammar is brought into weak normal form; the relation of triples
/// `(u, A, v)` is seeded from single edges and nullable diagonals, then
/// closed under the binary rules with a worklist until stable.
#[must_use]
pub fn hellings_cfpq(
    cfg: &Cfg,
    graph: &LabeledGraph,
    start_nodes: Option<&HashSet<NodeIndex>>,
    final_nodes: Option<&HashSet<NodeIndex>>,
) -> HashSet<(NodeIndex, NodeIndex)> {
    let wnf = WeakNormalForm::of(cfg);

    let mut relation: HashSet<Triple> = HashSet::new();
    let mut pending: VecDeque<Triple> = VecDeque::new();
    let discover = |triple: Triple,
                        relation: &mut HashSet<Triple>,
                        pending: &mut VecDeque<Triple>| {
        if relation.insert(triple.clone()) {
            pending.push_back(triple);
        }
    };

    for edge in graph.edge_references() {
        for (head, terminal) in &wnf.terminal_rules {
            if terminal == edge.weight() {
                let triple = (
                    edge.source().index(),
                    head.clone(),
                    edge.target().index(),
                );
                discover(triple, &mut relation, &mut pending);
            }
        }
    }
    for node in 0..graph.node_count() {
        for variable in &wnf.nullable {
            discover((node, variable.clone(), node), &mut relation, &mut pending);
        }
    }

    while let Some((mid_from, fresh_var, mid_to)) = pending.pop_front() {
        let mut discovered: Vec<Triple> = Vec::new();
        for (from, var, to) in &relation {
            // Existing triple on the left: (from, var, mid_from)·(mid_from, fresh_var, mid_to).
            if *to == mid_from {
                for (head, left, right) in &wnf.binary_rules {
                    if left == var && *right == fresh_var {
                        discovered.push((*from, head.clone(), mid_to));
                    }
                }
            }
            // Existing triple on the right: (mid_from, fresh_var, mid_to)·(mid_to, var, to).
            if *from == mid_to {
                for (head, left, right) in &wnf.binary_rules {
                    if *left == fresh_var && right == var {
                        discovered.push((mid_from, head.clone(), *to));
                    }
                }
            }
        }
        for triple in discovered {
            discover(triple, &mut relation, &mut pending);
        }
    }
    debug!(triples = relation.len(), "derivation relation closed");

    relation
        .into_iter()
        .filter(|(_, variable, _)| *variable == wnf.start)
        .map(|(from, _, to)| (NodeIndex::new(from), NodeIndex::new(to)))
        .filter(|&(from, to)| {
            graph::passes(start_nodes, from) && graph::passes(final_nodes, to)
        })
        .collect()
}
