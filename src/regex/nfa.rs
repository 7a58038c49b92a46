use std::collections::HashSet;

use crate::automaton::{EdgeLabel, StateId, Symbol, Transition};
use crate::regex::ast::Ast;

/// A Thompson-constructed nondeterministic finite automaton over symbols.
#[derive(Debug, Clone)]
pub struct Nfa {
    /// Start state.
    pub start: StateId,
    /// Accepting states, unique and sorted.
    pub accepts: Vec<StateId>,
    /// Adjacency lists indexed by state.
    pub adjacency: Vec<Vec<Transition>>,
}

impl Nfa {
    /// Builds an [`Nfa`] from an AST using Thompson's construction.
    #[must_use]
    pub fn build(ast: &Ast) -> Nfa {
        let mut builder = Builder::default();
        let fragment = builder.build(ast.clone());
        builder.finalize(fragment.start, fragment.accepts)
    }

    /// Number of states.
    #[must_use]
    pub fn state_count(&self) -> usize {
        self.adjacency.len()
    }

    /// The outgoing transitions from the specified state.
    #[must_use]
    pub fn transitions(&self, state: StateId) -> &[Transition] {
        &self.adjacency[state as usize]
    }

    /// Computes the alphabet used in this NFA, sorted by symbol.
    #[must_use]
    pub fn alphabet(&self) -> Vec<Symbol> {
        let mut symbols: HashSet<Symbol> = HashSet::new();
        for row in &self.adjacency {
            for tr in row {
                if let EdgeLabel::Sym(s) = &tr.label {
                    symbols.insert(s.clone());
                }
            }
        }
        let mut symbols: Vec<Symbol> = symbols.into_iter().collect();
        symbols.sort_unstable();
        symbols
    }
}

/// The internal builder struct for converting an AST to an NFA.
#[derive(Default)]
struct Builder {
    /// A list of adjacency lists for each state, each holding outgoing
    /// transitions.
    adjacency: Vec<Vec<Transition>>,
}

/// A fragment of an NFA with a start state and accepting states, created
/// while assembling NFA pieces from AST nodes.
#[derive(Debug, Clone)]
struct Fragment {
    start: StateId,
    accepts: Vec<StateId>,
}

impl Builder {
    /// Adds a new, empty state with no outgoing or incoming transitions.
    fn new_state(&mut self) -> StateId {
        let id = self.adjacency.len() as StateId;
        self.adjacency.push(Vec::new());
        id
    }

    /// Adds an edge from `from` to `to` with the given label.
    fn add_edge(&mut self, from: StateId, to: StateId, label: EdgeLabel) {
        self.adjacency[from as usize].push(Transition { to, label });
    }

    fn build(&mut self, ast: Ast) -> Fragment {
        match ast {
            Ast::Empty => self.build_empty(),
            Ast::Epsilon => self.build_edge(EdgeLabel::Eps),
            Ast::Atom(symbol) => self.build_edge(EdgeLabel::Sym(symbol)),
            Ast::Concat(lhs, rhs) => self.build_concat(*lhs, *rhs),
            Ast::Alt(lhs, rhs) => self.build_alternation(*lhs, *rhs),
            Ast::Star(inner) => self.build_star(*inner),
        }
    }

    /// A fragment with no accepting state, denoting the empty language.
    fn build_empty(&mut self) -> Fragment {
        let start = self.new_state();
        Fragment {
            start,
            accepts: Vec::new(),
        }
    }

    /// A start and an accept state joined by a single labeled edge.
    fn build_edge(&mut self, label: EdgeLabel) -> Fragment {
        let start = self.new_state();
        let accept = self.new_state();
        self.add_edge(start, accept, label);
        Fragment {
            start,
            accepts: vec![accept],
        }
    }

    /// Builds both sides, wiring the accepts of the left into the start of
    /// the right.
    fn build_concat(&mut self, lhs: Ast, rhs: Ast) -> Fragment {
        let left = self.build(lhs);
        let right = self.build(rhs);

        for accept in &left.accepts {
            self.add_edge(*accept, right.start, EdgeLabel::Eps);
        }

        Fragment {
            start: left.start,
            accepts: right.accepts,
        }
    }

    fn build_alternation(&mut self, lhs: Ast, rhs: Ast) -> Fragment {
        let left = self.build(lhs);
        let right = self.build(rhs);

        let start = self.new_state();
        let accept = self.new_state();

        self.add_edge(start, left.start, EdgeLabel::Eps);
        self.add_edge(start, right.start, EdgeLabel::Eps);

        for state in left.accepts.iter().chain(right.accepts.iter()) {
            self.add_edge(*state, accept, EdgeLabel::Eps);
        }

        Fragment {
            start,
            accepts: vec![accept],
        }
    }

    fn build_star(&mut self, inner: Ast) -> Fragment {
        let frag = self.build(inner);

        let start = self.new_state();
        let accept = self.new_state();

        self.add_edge(start, frag.start, EdgeLabel::Eps);
        self.add_edge(start, accept, EdgeLabel::Eps);

        for state in frag.accepts {
            self.add_edge(state, frag.start, EdgeLabel::Eps);
            self.add_edge(state, accept, EdgeLabel::Eps);
        }

        Fragment {
            start,
            accepts: vec![accept],
        }
    }

    fn finalize(self, start: StateId, accepts: Vec<StateId>) -> Nfa {
        Nfa {
            start,
            accepts: unique_sorted(accepts),
            adjacency: self.adjacency,
        }
    }
}

fn unique_sorted(mut ids: Vec<StateId>) -> Vec<StateId> {
    ids.sort_unstable();
    ids.dedup();
    ids
}
