use std::collections::{HashMap, HashSet};

use petgraph::graph::NodeIndex;
use petgraph::visit::EdgeRef;
use tracing::debug;

use crate::automaton::{StateId, Symbol};
use crate::grammar::rsm::{BoxId, Rsm, RsmState};
use crate::graph::{self, LabeledGraph};
use crate::regex::dfa::Dfa;

/// Pseudo-state keying the return edge of the outermost call.
const ACCEPT_STATE: RsmState = RsmState {
    box_id: BoxId::MAX,
    state: StateId::MAX,
};

/// Index into the GSS arena.
type GssId = usize;

/// A parse descriptor driving the worklist: resume the machine in `state`
/// at graph node `node`, returning through `gss`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct Descriptor {
    gss: GssId,
    state: RsmState,
    node: usize,
}

/// One node of the graph-structured stack.
///
/// Return edges are keyed by the machine state the caller resumes in; the
/// pop set records the graph nodes at which this call has already returned,
/// so a later caller replays those returns.
struct GssNode {
    /// Graph node the call was entered at.
    node: usize,
    edges: HashMap<RsmState, HashSet<GssId>>,
    pop_set: HashSet<usize>,
}

/// Graph-structured stack: an arena of nodes deduplicated by
/// (machine state, graph node). Slot 0 is the accept sentinel.
struct Gss {
    nodes: Vec<GssNode>,
    index: HashMap<(RsmState, usize), GssId>,
}

impl Gss {
    const ACCEPT_ID: GssId = 0;

    fn new() -> Self {
        Self {
            nodes: vec![GssNode {
                node: usize::MAX,
                edges: HashMap::new(),
                pop_set: HashSet::new(),
            }],
            index: HashMap::new(),
        }
    }

    /// At most one node exists per (state, node) pair.
    fn get_node(&mut self, state: RsmState, node: usize) -> GssId {
        match self.index.get(&(state, node)) {
            Some(&id) => id,
            None => {
                let id = self.nodes.len();
                self.nodes.push(GssNode {
                    node,
                    edges: HashMap::new(),
                    pop_set: HashSet::new(),
                });
                self.index.insert((state, node), id);
                id
            }
        }
    }

    /// Adds a return edge; a new edge replays every past pop of `target`
    /// toward the fresh caller.
    fn add_edge(&mut self, target: GssId, ret: RsmState, caller: GssId) -> Vec<Descriptor> {
        let data = &mut self.nodes[target];
        if data.edges.entry(ret).or_default().insert(caller) {
            data.pop_set
                .iter()
                .map(|&popped| Descriptor {
                    gss: caller,
                    state: ret,
                    node: popped,
                })
                .collect()
        } else {
            Vec::new()
        }
    }

    /// Returns from `target` at `node`: fires once per (target, node) and
    /// resumes every recorded caller.
    fn pop(&mut self, target: GssId, node: usize) -> Vec<Descriptor> {
        let data = &mut self.nodes[target];
        if !data.pop_set.insert(node) {
            return Vec::new();
        }
        data.edges
            .iter()
            .flat_map(|(&ret, callers)| {
                callers.iter().map(move |&caller| Descriptor {
                    gss: caller,
                    state: ret,
                    node,
                })
            })
            .collect()
    }
}

/// Tabulated view of one machine state.
#[derive(Debug, Clone, Default)]
struct RsmStateData {
    /// Terminal edges: consume a matching graph edge, stay in the box.
    term_edges: Vec<(Symbol, RsmState)>,
    /// Variable edges: (entry state of the callee box, return state here).
    var_edges: Vec<(RsmState, RsmState)>,
    /// Whether the box may return from this state.
    is_final: bool,
}

/// Evaluates a context-free path query with a generalized LL parser over a
/// recursive state machine.
///
/// No normal form is required; left-recursive and ambiguous grammars
/// terminate because the GSS deduplicates call contexts, pops are memoized
/// per graph node, and descriptors are processed at most once.
#[must_use]
pub fn gll_cfpq(
    rsm: &Rsm,
    graph: &LabeledGraph,
    start_nodes: Option<&HashSet<NodeIndex>>,
    final_nodes: Option<&HashSet<NodeIndex>>,
) -> HashSet<(NodeIndex, NodeIndex)> {
    let sources = graph::node_selection(graph, start_nodes);
    let mut solver = GllSolver::new(rsm, graph);
    solver.run(&sources);
    debug!(
        descriptors = solver.added.len(),
        gss_nodes = solver.gss.nodes.len(),
        pairs = solver.reachable.len(),
        "descriptor worklist drained"
    );

    solver
        .reachable
        .into_iter()
        .map(|(from, to)| (NodeIndex::new(from), NodeIndex::new(to)))
        .filter(|&(_, to)| graph::passes(final_nodes, to))
        .collect()
}

struct GllSolver {
    /// Per-node, per-symbol successors of the graph.
    graph_edges: Vec<HashMap<Symbol, Vec<usize>>>,
    /// Tabulated machine states, indexed by box then state.
    data: Vec<Vec<RsmStateData>>,
    start_state: RsmState,
    gss: Gss,
    added: HashSet<Descriptor>,
    unprocessed: Vec<Descriptor>,
    reachable: HashSet<(usize, usize)>,
}

impl GllSolver {
    fn new(rsm: &Rsm, graph: &LabeledGraph) -> Self {
        let mut graph_edges: Vec<HashMap<Symbol, Vec<usize>>> =
            vec![HashMap::new(); graph.node_count()];
        for edge in graph.edge_references() {
            graph_edges[edge.source().index()]
                .entry(edge.weight().clone())
                .or_default()
                .push(edge.target().index());
        }

        let data = rsm
            .boxes
            .values()
            .enumerate()
            .map(|(box_id, rsm_box)| tabulate_box(rsm, box_id as BoxId, &rsm_box.dfa))
            .collect();

        Self {
            graph_edges,
            data,
            start_state: rsm.start_state(),
            gss: Gss::new(),
            added: HashSet::new(),
            unprocessed: Vec::new(),
            reachable: HashSet::new(),
        }
    }

    fn run(&mut self, sources: &[usize]) {
        for &source in sources {
            let gss = self.gss.get_node(self.start_state, source);
            let replays = self.gss.add_edge(gss, ACCEPT_STATE, Gss::ACCEPT_ID);
            for descriptor in replays {
                self.enqueue(descriptor, source);
            }
            self.enqueue(
                Descriptor {
                    gss,
                    state: self.start_state,
                    node: source,
                },
                source,
            );
        }

        while let Some(descriptor) = self.unprocessed.pop() {
            self.step(descriptor);
        }
    }

    /// Records a reachable pair when the descriptor would return through
    /// the accept sentinel, enqueues it (once) otherwise.
    fn enqueue(&mut self, descriptor: Descriptor, origin: usize) {
        if descriptor.gss == Gss::ACCEPT_ID {
            self.reachable.insert((origin, descriptor.node));
            return;
        }
        if self.added.insert(descriptor) {
            self.unprocessed.push(descriptor);
        }
    }

    fn step(&mut self, descriptor: Descriptor) {
        let state_data =
            self.data[descriptor.state.box_id as usize][descriptor.state.state as usize].clone();
        let origin = self.gss.nodes[descriptor.gss].node;

        for (symbol, next_state) in &state_data.term_edges {
            let Some(successors) = self.graph_edges[descriptor.node].get(symbol).cloned() else {
                continue;
            };
            for next_node in successors {
                self.enqueue(
                    Descriptor {
                        gss: descriptor.gss,
                        state: *next_state,
                        node: next_node,
                    },
                    origin,
                );
            }
        }

        for &(entry, ret) in &state_data.var_edges {
            let callee = self.gss.get_node(entry, descriptor.node);
            let replays = self.gss.add_edge(callee, ret, descriptor.gss);
            for replay in replays {
                self.enqueue(replay, origin);
            }
            self.enqueue(
                Descriptor {
                    gss: callee,
                    state: entry,
                    node: descriptor.node,
                },
                origin,
            );
        }

        if state_data.is_final {
            let returns = self.gss.pop(descriptor.gss, descriptor.node);
            for returned in returns {
                self.enqueue(returned, origin);
            }
        }
    }
}

/// Splits a box DFA's outgoing edges into terminal and variable edges.
fn tabulate_box(rsm: &Rsm, box_id: BoxId, dfa: &Dfa) -> Vec<RsmStateData> {
    (0..dfa.state_count())
        .map(|state| {
            let mut state_data = RsmStateData {
                is_final: dfa.accepts.contains(&(state as StateId)),
                ..RsmStateData::default()
            };
            for (symbol_idx, dest) in dfa.trans[state].iter().enumerate() {
                let Some(dest) = dest else { continue };
                let symbol = &dfa.alphabet[symbol_idx];
                let next = RsmState {
                    box_id,
                    state: *dest,
                };
                match rsm.box_of(symbol) {
                    Some((callee_id, callee_box)) => {
                        let entry = RsmState {
                            box_id: callee_id,
                            state: callee_box.dfa.start,
                        };
                        state_data.var_edges.push((entry, next));
                    }
                    None => state_data.term_edges.push((symbol.clone(), next)),
                }
            }
            state_data
        })
        .collect()
}
