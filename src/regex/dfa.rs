use std::collections::{HashSet, VecDeque};

use indexmap::IndexMap;

use crate::automaton::{EdgeLabel, StateId, Symbol};
use crate::regex::nfa::Nfa;

/// Deterministic finite automaton produced by subset construction.
///
/// The transition table is partial: [`None`] marks a transition into the
/// implicit dead state.
#[derive(Debug, Clone)]
pub struct Dfa {
    /// Alphabet indexing the columns of the transition table.
    pub alphabet: Vec<Symbol>,
    /// Start state identifier.
    pub start: StateId,
    /// Accepting state identifiers.
    pub accepts: Vec<StateId>,
    /// Transition table indexed by state then alphabet position.
    pub trans: Vec<Vec<Option<StateId>>>,
}

impl Dfa {
    /// Number of states.
    #[must_use]
    pub fn state_count(&self) -> usize {
        self.trans.len()
    }
}

/// Determinizes an NFA into a DFA using subset construction.
#[must_use]
pub fn determinize(nfa: &Nfa) -> Dfa {
    Determinizer::new(nfa).run()
}

/// The set of states reachable from `seed` over epsilon transitions alone.
fn epsilon_closure(seed: &HashSet<StateId>, nfa: &Nfa) -> HashSet<StateId> {
    let mut closure = seed.clone();
    let mut stack: Vec<StateId> = seed.iter().copied().collect();
    while let Some(state) = stack.pop() {
        for tr in nfa.transitions(state) {
            if tr.label == EdgeLabel::Eps && closure.insert(tr.to) {
                stack.push(tr.to);
            }
        }
    }
    closure
}

/// The set of states reached from `states` by consuming `symbol` once.
fn move_on(states: &HashSet<StateId>, symbol: &Symbol, nfa: &Nfa) -> HashSet<StateId> {
    let mut frontier = HashSet::new();
    for state in states {
        for tr in nfa.transitions(*state) {
            if matches!(&tr.label, EdgeLabel::Sym(s) if s == symbol) {
                frontier.insert(tr.to);
            }
        }
    }
    frontier
}

/// Converts a set of state IDs into a sorted vector key.
fn set_to_key(set: HashSet<StateId>) -> Vec<StateId> {
    let mut vec: Vec<StateId> = set.into_iter().collect();
    vec.sort_unstable();
    vec
}

/// Subset-construction worker transforming an NFA into an equivalent DFA.
struct Determinizer<'a> {
    /// The underlying NFA being determinized.
    nfa: &'a Nfa,
    /// The alphabet of symbols used in the NFA.
    alphabet: Vec<Symbol>,
    /// Mapping from NFA state subsets to DFA state IDs.
    map: IndexMap<Vec<StateId>, StateId>,
    /// Queue of NFA state subsets to process.
    queue: VecDeque<Vec<StateId>>,
    /// Array of DFA transitions being built.
    transitions: Vec<Vec<Option<StateId>>>,
}

impl<'a> Determinizer<'a> {
    fn new(nfa: &'a Nfa) -> Self {
        let alphabet = nfa.alphabet();
        let mut map = IndexMap::new();
        let mut queue = VecDeque::new();

        let mut seed = HashSet::new();
        seed.insert(nfa.start);
        let closure = epsilon_closure(&seed, nfa);
        let start_key = set_to_key(closure);

        let start_id: StateId = 0;
        map.insert(start_key.clone(), start_id);
        queue.push_back(start_key);

        Self {
            nfa,
            alphabet,
            map,
            queue,
            transitions: Vec::new(),
        }
    }

    fn run(mut self) -> Dfa {
        while let Some(key) = self.queue.pop_front() {
            let state_id = self.map[&key];
            self.ensure_capacity(state_id as usize + 1);
            let subset: HashSet<StateId> = key.iter().copied().collect();

            for symbol_idx in 0..self.alphabet.len() {
                let symbol = self.alphabet[symbol_idx].clone();
                let next = self.advance_subset(&subset, &symbol);
                self.transitions[state_id as usize][symbol_idx] = next;
            }
        }

        let accepts = self.collect_accepting();
        Dfa {
            alphabet: self.alphabet,
            start: 0,
            accepts,
            trans: self.transitions,
        }
    }

    /// Ensures the transitions vector has at least `len` rows.
    fn ensure_capacity(&mut self, len: usize) {
        while self.transitions.len() < len {
            self.transitions.push(vec![None; self.alphabet.len()]);
        }
    }

    /// The next DFA state for a given NFA state subset and input symbol.
    fn advance_subset(&mut self, subset: &HashSet<StateId>, symbol: &Symbol) -> Option<StateId> {
        let moved = move_on(subset, symbol, self.nfa);
        if moved.is_empty() {
            return None;
        }

        let closure = epsilon_closure(&moved, self.nfa);
        Some(self.lookup_or_insert(closure))
    }

    /// Looks up or inserts a subset into the underlying map and queue.
    fn lookup_or_insert(&mut self, subset: HashSet<StateId>) -> StateId {
        let key = set_to_key(subset);
        if let Some(id) = self.map.get(&key) {
            *id
        } else {
            let new_id = self.map.len() as StateId;
            self.map.insert(key.clone(), new_id);
            self.queue.push_back(key);
            new_id
        }
    }

    /// Collects the DFA states whose subsets contain an accepting NFA state.
    fn collect_accepting(&self) -> Vec<StateId> {
        self.map
            .iter()
            .filter_map(|(subset, id)| {
                let accepting = subset.iter().any(|state| self.nfa.accepts.contains(state));
                accepting.then_some(*id)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regex::ast::Ast;

    fn build(pattern: &str) -> Dfa {
        determinize(&Nfa::build(&Ast::build(pattern).unwrap()))
    }

    #[test]
    fn test_determinize_epsilon() {
        let dfa = build("$");
        assert!(dfa.alphabet.is_empty());
        assert_eq!(dfa.start, 0);
        assert_eq!(dfa.accepts, vec![0]);
        assert_eq!(dfa.state_count(), 1);
    }

    #[test]
    fn test_determinize_empty_language() {
        let dfa = build("");
        assert_eq!(dfa.state_count(), 1);
        assert!(dfa.accepts.is_empty());
    }

    #[test]
    fn test_determinize_single_symbol() {
        let dfa = build("go");
        assert_eq!(dfa.alphabet, vec![Symbol::new("go")]);
        assert_eq!(dfa.start, 0);
        assert_eq!(dfa.accepts, vec![1]);
        assert_eq!(dfa.trans, vec![vec![Some(1)], vec![None]]);
    }

    #[test]
    fn test_determinize_concat() {
        let dfa = build("a.b");
        assert_eq!(dfa.alphabet, vec![Symbol::new("a"), Symbol::new("b")]);
        assert_eq!(
            dfa.trans,
            vec![
                vec![Some(1), None],
                vec![None, Some(2)],
                vec![None, None],
            ],
        );
        assert_eq!(dfa.accepts, vec![2]);
    }

    #[test]
    fn test_determinize_star_loops() {
        let dfa = build("a*");
        assert_eq!(dfa.accepts, vec![0, 1]);
        assert_eq!(dfa.trans, vec![vec![Some(1)], vec![Some(1)]]);
    }
}
