use std::collections::HashSet;

use indexmap::IndexMap;
use itertools::iproduct;
use petgraph::graph::NodeIndex;
use petgraph::visit::EdgeRef;

use crate::automaton::Symbol;
use crate::graph::{self, LabeledGraph};
use crate::matrix::BitMatrix;
use crate::regex::dfa::Dfa;

/// A finite automaton represented as one Boolean adjacency matrix per
/// symbol.
///
/// This is the uniform shape shared by the regular-path-query engines: the
/// regex DFA, the graph NFA and their Kronecker product are all instances.
/// A symbol absent from `transitions` stands for the all-false matrix.
#[derive(Debug, Clone)]
pub struct MatrixFa {
    state_count: usize,
    start_states: Vec<usize>,
    final_states: Vec<usize>,
    transitions: IndexMap<Symbol, BitMatrix>,
}

impl MatrixFa {
    /// Builds the matrix form of a regex DFA.
    #[must_use]
    pub fn from_dfa(dfa: &Dfa) -> Self {
        let n = dfa.state_count();
        let mut transitions: IndexMap<Symbol, BitMatrix> = IndexMap::new();
        for (state, row) in dfa.trans.iter().enumerate() {
            for (symbol_idx, dest) in row.iter().enumerate() {
                if let Some(dest) = dest {
                    transitions
                        .entry(dfa.alphabet[symbol_idx].clone())
                        .or_insert_with(|| BitMatrix::new(n, n))
                        .set(state, *dest as usize);
                }
            }
        }
        let mut final_states: Vec<usize> = dfa.accepts.iter().map(|s| *s as usize).collect();
        final_states.sort_unstable();
        Self {
            state_count: n,
            start_states: vec![dfa.start as usize],
            final_states,
            transitions,
        }
    }

    /// Builds the matrix form of the NFA induced by a labeled graph.
    ///
    /// Every node becomes a state with the same index. `None` or empty
    /// start/final sets mark every state as start respectively final.
    #[must_use]
    pub fn from_graph(
        graph: &LabeledGraph,
        start_nodes: Option<&HashSet<NodeIndex>>,
        final_nodes: Option<&HashSet<NodeIndex>>,
    ) -> Self {
        let n = graph.node_count();
        let mut transitions: IndexMap<Symbol, BitMatrix> = IndexMap::new();
        for edge in graph.edge_references() {
            transitions
                .entry(edge.weight().clone())
                .or_insert_with(|| BitMatrix::new(n, n))
                .set(edge.source().index(), edge.target().index());
        }
        Self {
            state_count: n,
            start_states: graph::node_selection(graph, start_nodes),
            final_states: graph::node_selection(graph, final_nodes),
            transitions,
        }
    }

    /// Number of states.
    #[must_use]
    pub fn state_count(&self) -> usize {
        self.state_count
    }

    /// Start state indices, sorted.
    #[must_use]
    pub fn start_states(&self) -> &[usize] {
        &self.start_states
    }

    /// Final state indices, sorted.
    #[must_use]
    pub fn final_states(&self) -> &[usize] {
        &self.final_states
    }

    /// The per-symbol transition matrices.
    #[must_use]
    pub fn transitions(&self) -> &IndexMap<Symbol, BitMatrix> {
        &self.transitions
    }

    /// Whether the automaton accepts the given word.
    ///
    /// Runs a depth-first search over configurations of remaining word and
    /// current state. A symbol with no matrix is a dead end on that branch.
    #[must_use]
    pub fn accepts(&self, word: &[Symbol]) -> bool {
        let mut stack: Vec<(usize, usize)> = self
            .start_states
            .iter()
            .map(|&state| (0, state))
            .collect();

        while let Some((consumed, state)) = stack.pop() {
            if consumed == word.len() {
                if self.final_states.contains(&state) {
                    return true;
                }
                continue;
            }
            let Some(matrix) = self.transitions.get(&word[consumed]) else {
                continue;
            };
            for next in matrix.row(state).ones() {
                stack.push((consumed + 1, next));
            }
        }
        false
    }

    /// Whether the accepted language is empty.
    ///
    /// An automaton without any transition matrix is treated as empty;
    /// otherwise the reflexive-transitive closure is probed at every
    /// (start, final) index pair.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        if self.transitions.is_empty() {
            return true;
        }
        let closure = self.transitive_closure();
        !iproduct!(&self.start_states, &self.final_states)
            .any(|(&start, &fin)| closure.get(start, fin))
    }

    /// Reflexive-transitive closure of the union of all symbol matrices.
    #[must_use]
    pub fn transitive_closure(&self) -> BitMatrix {
        let mut sum = BitMatrix::new(self.state_count, self.state_count);
        for matrix in self.transitions.values() {
            sum.union_with(matrix);
        }
        sum.transitive_closure()
    }

    /// Kronecker-product intersection of two automata.
    ///
    /// The pair `(s₁, s₂)` maps to index `s₁ · N₂ + s₂`. Only symbols
    /// present in both alphabets carry transitions; start and final states
    /// are the pairwise products.
    #[must_use]
    pub fn intersect(a: &MatrixFa, b: &MatrixFa) -> MatrixFa {
        let mut transitions = IndexMap::new();
        for (symbol, ma) in &a.transitions {
            if let Some(mb) = b.transitions.get(symbol) {
                transitions.insert(symbol.clone(), ma.kronecker(mb));
            }
        }

        let pair_index = |s1: usize, s2: usize| s1 * b.state_count + s2;
        let start_states = iproduct!(&a.start_states, &b.start_states)
            .map(|(&s1, &s2)| pair_index(s1, s2))
            .collect();
        let final_states = iproduct!(&a.final_states, &b.final_states)
            .map(|(&s1, &s2)| pair_index(s1, s2))
            .collect();

        MatrixFa {
            state_count: a.state_count * b.state_count,
            start_states,
            final_states,
            transitions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regex;

    fn symbols(parts: &[&str]) -> Vec<Symbol> {
        parts.iter().map(|p| Symbol::new(*p)).collect()
    }

    fn fa_of(pattern: &str) -> MatrixFa {
        MatrixFa::from_dfa(&regex::to_dfa(pattern).unwrap())
    }

    #[test]
    fn test_accepts_follows_the_pattern() {
        let fa = fa_of("a.(a|b)*");
        assert!(fa.accepts(&symbols(&["a"])));
        assert!(fa.accepts(&symbols(&["a", "b", "a"])));
        assert!(!fa.accepts(&symbols(&["b"])));
        assert!(!fa.accepts(&symbols(&[])));
    }

    #[test]
    fn test_accepts_unknown_symbol_is_dead_end() {
        let fa = fa_of("a*");
        assert!(!fa.accepts(&symbols(&["c"])));
        assert!(fa.accepts(&symbols(&[])));
    }

    #[test]
    fn test_is_empty_with_no_matrices() {
        let fa = fa_of("$");
        assert!(fa.is_empty());
        assert!(fa.accepts(&[]));
    }

    #[test]
    fn test_is_empty_detects_reachable_final() {
        assert!(!fa_of("a.b").is_empty());
        assert!(fa_of("").is_empty());
    }

    #[test]
    fn test_intersect_disjoint_alphabets_has_no_transitions() {
        let product = MatrixFa::intersect(&fa_of("a"), &fa_of("b"));
        assert!(product.transitions().is_empty());
        assert!(product.is_empty());
    }

    #[test]
    fn test_intersect_shares_words() {
        let product = MatrixFa::intersect(&fa_of("a|b"), &fa_of("a|c"));
        assert!(product.accepts(&symbols(&["a"])));
        assert!(!product.accepts(&symbols(&["b"])));
        assert!(!product.accepts(&symbols(&["c"])));
    }

    #[test]
    fn test_from_graph_defaults_all_states() {
        let mut g = LabeledGraph::new();
        let a = g.add_node(());
        let b = g.add_node(());
        g.add_edge(a, b, Symbol::new("x"));
        let fa = MatrixFa::from_graph(&g, None, None);
        assert_eq!(fa.start_states(), &[0, 1]);
        assert_eq!(fa.final_states(), &[0, 1]);
        assert!(fa.accepts(&symbols(&["x"])));
    }
}
