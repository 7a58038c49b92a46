use std::collections::HashSet;

use crate::automaton::StateId;
use crate::regex::dfa::Dfa;

/// Minimizes a DFA by partition refinement.
///
/// The transition table is partial, so "no transition" is treated as an
/// observable of its own: a block is split whenever some of its members
/// reach a given block on a symbol and others do not.
#[must_use]
pub fn minimize(dfa: &Dfa) -> Dfa {
    if dfa.trans.len() <= 1 {
        return dfa.clone();
    }

    PartitionRefinement::new(dfa).run()
}

struct PartitionRefinement<'a> {
    /// The DFA being minimized.
    dfa: &'a Dfa,
    /// Current partitions of states.
    partitions: Vec<Vec<usize>>,
    /// Mapping from state to its partition class (index in `partitions`).
    state_class: Vec<usize>,
    /// Set of accepting states for quick lookup.
    accepting: HashSet<StateId>,
}

impl<'a> PartitionRefinement<'a> {
    fn new(dfa: &'a Dfa) -> Self {
        let accepting: HashSet<StateId> = dfa.accepts.iter().copied().collect();
        let mut partitions = Vec::new();
        let mut accepting_block = Vec::new();
        let mut rejecting_block = Vec::new();
        for state in 0..dfa.trans.len() {
            if accepting.contains(&(state as StateId)) {
                accepting_block.push(state);
            } else {
                rejecting_block.push(state);
            }
        }
        if !accepting_block.is_empty() {
            partitions.push(accepting_block);
        }
        if !rejecting_block.is_empty() {
            partitions.push(rejecting_block);
        }

        let mut state_class = vec![0; dfa.trans.len()];
        for (class, block) in partitions.iter().enumerate() {
            for &state in block {
                state_class[state] = class;
            }
        }

        Self {
            dfa,
            partitions,
            state_class,
            accepting,
        }
    }

    /// Refines until a full sweep over every (block, symbol) splitter makes
    /// no split. Splits appended mid-sweep are picked up by the next sweep.
    fn run(mut self) -> Dfa {
        loop {
            let mut split_any = false;
            let class_count = self.partitions.len();
            for class_idx in 0..class_count {
                for symbol_idx in 0..self.dfa.alphabet.len() {
                    let involved = self.collect_involved(class_idx, symbol_idx);
                    if involved.is_empty() {
                        continue;
                    }
                    split_any |= self.split_partitions(&involved);
                }
            }
            if !split_any {
                break;
            }
        }
        self.build_minimized()
    }

    /// States that reach a member of `class_idx` on `symbol_idx`.
    fn collect_involved(&self, class_idx: usize, symbol_idx: usize) -> HashSet<usize> {
        let mut involved = HashSet::new();
        for state in 0..self.dfa.trans.len() {
            if let Some(dst) = self.dfa.trans[state][symbol_idx] {
                if self.state_class[dst as usize] == class_idx {
                    involved.insert(state);
                }
            }
        }
        involved
    }

    fn split_partitions(&mut self, involved: &HashSet<usize>) -> bool {
        let mut split_any = false;
        let mut idx = 0;
        while idx < self.partitions.len() {
            let block = self.partitions[idx].as_slice();
            let (in_part, out_part) = partition_block(block, involved);
            if in_part.is_empty() || out_part.is_empty() {
                idx += 1;
                continue;
            }

            self.partitions[idx] = in_part;
            let new_idx = self.partitions.len();
            self.partitions.push(out_part);
            self.relabel_block(idx);
            self.relabel_block(new_idx);
            split_any = true;
            idx += 1;
        }
        split_any
    }

    fn relabel_block(&mut self, block_idx: usize) {
        for &state in &self.partitions[block_idx] {
            self.state_class[state] = block_idx;
        }
    }

    fn build_minimized(self) -> Dfa {
        let mut new_trans_table = Vec::new();
        for block in &self.partitions {
            let repr = block[0];
            let new_trans_row = self.dfa.trans[repr]
                .iter()
                .map(|dest| dest.map(|dst| self.state_class[dst as usize] as StateId))
                .collect();
            new_trans_table.push(new_trans_row);
        }

        let mut new_accepts = Vec::new();
        for (idx, block) in self.partitions.iter().enumerate() {
            if block
                .iter()
                .any(|state| self.accepting.contains(&(*state as StateId)))
            {
                new_accepts.push(idx as StateId);
            }
        }

        let start = self.state_class[self.dfa.start as usize] as StateId;

        Dfa {
            alphabet: self.dfa.alphabet.clone(),
            start,
            accepts: new_accepts,
            trans: new_trans_table,
        }
    }
}

/// Splits `block` into the members inside `involved` and the rest.
fn partition_block(block: &[usize], involved: &HashSet<usize>) -> (Vec<usize>, Vec<usize>) {
    let mut in_part = Vec::new();
    let mut out_part = Vec::new();
    for &state in block {
        if involved.contains(&state) {
            in_part.push(state);
        } else {
            out_part.push(state);
        }
    }
    (in_part, out_part)
}
