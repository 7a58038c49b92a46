use std::collections::HashSet;

use fixedbitset::FixedBitSet;
use petgraph::graph::NodeIndex;
use tracing::debug;

use crate::errors::BuildError;
use crate::fa::MatrixFa;
use crate::graph::LabeledGraph;
use crate::matrix::BitMatrix;
use crate::regex;

/// Evaluates a regular path query by multi-source BFS.
///
/// Instead of closing the full product automaton, one reachability front
/// per source node is pushed through block-diagonal symbol matrices until
/// no new cell appears. Only rows belonging to the query sources are ever
/// materialized.
///
/// # Errors
///
/// Returns a [`BuildError`] when the pattern fails to lex or parse.
pub fn ms_bfs_rpq(
    pattern: &str,
    graph: &LabeledGraph,
    start_nodes: Option<&HashSet<NodeIndex>>,
    final_nodes: Option<&HashSet<NodeIndex>>,
) -> Result<HashSet<(NodeIndex, NodeIndex)>, BuildError> {
    let dfa_fa = MatrixFa::from_dfa(&regex::to_dfa(pattern)?);
    let graph_fa = MatrixFa::from_graph(graph, start_nodes, final_nodes);

    let reachable = MsBfs::new(&dfa_fa, &graph_fa).run();

    let finals: HashSet<usize> = graph_fa.final_states().iter().copied().collect();
    let mut result = HashSet::new();
    for (source_idx, &source) in graph_fa.start_states().iter().enumerate() {
        for target in reachable[source_idx].ones() {
            if finals.contains(&target) {
                result.insert((NodeIndex::new(source), NodeIndex::new(target)));
            }
        }
    }
    Ok(result)
}

/// Multi-source BFS over the implicit product of a regex DFA (`D` states)
/// and a graph NFA (`G` states).
///
/// The front for `K` sources is a `(K·D) × (D+G)` matrix: row block `k`
/// describes a virtual automaton whose left `D` columns carry the current
/// DFA state and whose right `G` columns carry the graph states reached
/// from source `k`. The left part is a fixed stack of identities that
/// re-asserts DFA-state alignment after every multiplication.
struct MsBfs<'a> {
    dfa: &'a MatrixFa,
    nfa: &'a MatrixFa,
    /// DFA state count; the width of one row block and of the left part.
    shift: usize,
    /// Block-diagonal `diag(M_a^dfa, M_a^nfa)` for each shared symbol.
    united: Vec<BitMatrix>,
    /// `K` stacked `D × D` identities.
    front_left: BitMatrix,
}

impl<'a> MsBfs<'a> {
    fn new(dfa: &'a MatrixFa, nfa: &'a MatrixFa) -> Self {
        let shift = dfa.state_count();
        let source_count = nfa.start_states().len();

        let united = dfa
            .transitions()
            .iter()
            .filter_map(|(symbol, dfa_matrix)| {
                let nfa_matrix = nfa.transitions().get(symbol)?;
                Some(BitMatrix::block_diag(dfa_matrix, nfa_matrix))
            })
            .collect();

        let mut front_left = BitMatrix::new(source_count * shift, shift);
        for block in 0..source_count {
            for i in 0..shift {
                front_left.set(block * shift + i, i);
            }
        }

        Self {
            dfa,
            nfa,
            shift,
            united,
            front_left,
        }
    }

    /// Seeds the right part: for each source `k` and DFA start state `p`,
    /// cell `(k·D + p, source_k)` is set.
    fn initial_front(&self) -> BitMatrix {
        let mut front = BitMatrix::new(
            self.nfa.start_states().len() * self.shift,
            self.nfa.state_count(),
        );
        for (source_idx, &source) in self.nfa.start_states().iter().enumerate() {
            for &p in self.dfa.start_states() {
                front.set(source_idx * self.shift + p, source);
            }
        }
        front
    }

    /// One propagation step: multiply the combined front by every united
    /// symbol matrix, realign rows by their new DFA state, and OR the
    /// contributions together.
    fn step(&self, front_right: &BitMatrix) -> BitMatrix {
        let front = BitMatrix::hstack(&self.front_left, front_right);
        let mut updated = BitMatrix::new(front_right.row_count(), front_right.col_count());

        for matrix in &self.united {
            let product = front.mul(matrix);
            for i in 0..product.row_count() {
                let row = product.row(i);
                let block = i / self.shift * self.shift;
                // A set bit (i, j) in the left part reports that this row's
                // DFA state is now j; its right part belongs in row block+j.
                let targets: Vec<usize> = row
                    .ones()
                    .take_while(|&j| j < self.shift)
                    .map(|j| block + j)
                    .collect();
                if targets.is_empty() {
                    continue;
                }
                for column in row.ones().skip_while(|&j| j < self.shift) {
                    for &target in &targets {
                        updated.set(target, column - self.shift);
                    }
                }
            }
        }
        updated
    }

    /// Propagates fronts to a fixed point, then collapses the visited rows
    /// of each source over the DFA final states.
    fn run(&self) -> Vec<FixedBitSet> {
        let mut front_right = self.initial_front();
        let mut visited = front_right.clone();
        let mut rounds = 0usize;

        while !front_right.is_zero() {
            let mut next = self.step(&front_right);
            next.difference_with(&visited);
            visited.union_with(&next);
            front_right = next;
            rounds += 1;
        }
        debug!(rounds, visited = visited.count_ones(), "front propagation done");

        (0..self.nfa.start_states().len())
            .map(|source_idx| {
                let mut reached = FixedBitSet::with_capacity(self.nfa.state_count());
                for &f in self.dfa.final_states() {
                    reached.union_with(visited.row(source_idx * self.shift + f));
                }
                reached
            })
            .collect()
    }
}
