use std::collections::HashSet;

use itertools::iproduct;
use petgraph::graph::NodeIndex;
use tracing::debug;

use crate::errors::BuildError;
use crate::fa::MatrixFa;
use crate::graph::LabeledGraph;
use crate::regex;

/// Evaluates a regular path query by Kronecker-product intersection.
///
/// The regex DFA and the graph NFA are intersected; a path in the product
/// exists iff its label word is accepted by the regex, so the node pairs
/// fall out of the transitive closure at (start, final) index pairs. When
/// the product accepts the empty word, every node that is both a start and
/// a final contributes its identity pair.
///
/// # Errors
///
/// Returns a [`BuildError`] when the pattern fails to lex or parse.
pub fn tensor_rpq(
    pattern: &str,
    graph: &LabeledGraph,
    start_nodes: Option<&HashSet<NodeIndex>>,
    final_nodes: Option<&HashSet<NodeIndex>>,
) -> Result<HashSet<(NodeIndex, NodeIndex)>, BuildError> {
    let regex_fa = MatrixFa::from_dfa(&regex::to_dfa(pattern)?);
    let graph_fa = MatrixFa::from_graph(graph, start_nodes, final_nodes);
    let product = MatrixFa::intersect(&graph_fa, &regex_fa);
    debug!(
        product_states = product.state_count(),
        shared_symbols = product.transitions().len(),
        "built query product"
    );

    let closure = product.transitive_closure();
    let d = regex_fa.state_count();

    let mut result = HashSet::new();
    for (&u, &v) in iproduct!(graph_fa.start_states(), graph_fa.final_states()) {
        let connected = iproduct!(regex_fa.start_states(), regex_fa.final_states())
            .any(|(&p, &q)| closure.get(u * d + p, v * d + q));
        if connected {
            result.insert((NodeIndex::new(u), NodeIndex::new(v)));
        }
    }

    if product.accepts(&[]) {
        for &u in graph_fa.start_states() {
            if graph_fa.final_states().contains(&u) {
                result.insert((NodeIndex::new(u), NodeIndex::new(u)));
            }
        }
    }

    Ok(result)
}
