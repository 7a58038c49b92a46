use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::automaton::Symbol;
use crate::grammar::Cfg;

/// A grammar reduced to weak Chomsky normal form.
///
/// Every production is `A → a` (terminal), `A → B C` (two variables), or
/// `A → ε` for the variables of `nullable`. The nullable set is computed on
/// the *original* grammar, so ε-derivations survive the rewriting. Useless
/// symbols are removed; the start variable is preserved.
#[derive(Debug, Clone)]
pub struct WeakNormalForm {
    /// Start variable.
    pub start: Symbol,
    /// `A → a` productions as (head, terminal) pairs.
    pub terminal_rules: Vec<(Symbol, Symbol)>,
    /// `A → B C` productions as (head, left, right) triples.
    pub binary_rules: Vec<(Symbol, Symbol, Symbol)>,
    /// Variables carrying an `A → ε` production.
    pub nullable: HashSet<Symbol>,
}

impl WeakNormalForm {
    /// Transforms a grammar into weak normal form.
    #[must_use]
    pub fn of(cfg: &Cfg) -> Self {
        Normalizer::new(cfg).run()
    }
}

/// Computes the variables deriving the empty word, by fixed point over the
/// original productions.
#[must_use]
pub fn nullable_symbols(cfg: &Cfg) -> HashSet<Symbol> {
    let mut nullable: HashSet<Symbol> = HashSet::new();
    loop {
        let mut changed = false;
        for production in &cfg.productions {
            if nullable.contains(&production.head) {
                continue;
            }
            if production.body.iter().all(|s| nullable.contains(s)) {
                nullable.insert(production.head.clone());
                changed = true;
            }
        }
        if !changed {
            return nullable;
        }
    }
}

struct Normalizer<'a> {
    cfg: &'a Cfg,
    variables: HashSet<Symbol>,
    nullable: HashSet<Symbol>,
    /// Every symbol name in use, probed when inventing fresh variables.
    used_names: HashSet<String>,
}

impl<'a> Normalizer<'a> {
    fn new(cfg: &'a Cfg) -> Self {
        let mut used_names = HashSet::new();
        for production in &cfg.productions {
            used_names.insert(production.head.as_str().to_owned());
            for symbol in &production.body {
                used_names.insert(symbol.as_str().to_owned());
            }
        }
        used_names.insert(cfg.start.as_str().to_owned());

        Self {
            cfg,
            variables: cfg.variables(),
            nullable: nullable_symbols(cfg),
            used_names,
        }
    }

    fn run(mut self) -> WeakNormalForm {
        let rules = self.eliminate_units(self.eliminate_epsilons());

        let mut terminal_rules: HashSet<(Symbol, Symbol)> = HashSet::new();
        let mut binary_rules: HashSet<(Symbol, Symbol, Symbol)> = HashSet::new();
        let mut wrappers: HashMap<Symbol, Symbol> = HashMap::new();

        for (head, body) in rules {
            if body.len() == 1 {
                // Unit rules are gone, so a singleton body is a terminal.
                terminal_rules.insert((head, body[0].clone()));
                continue;
            }

            let vars: Vec<Symbol> = body
                .iter()
                .map(|symbol| {
                    if self.variables.contains(symbol) {
                        symbol.clone()
                    } else {
                        wrap_terminal(symbol, &mut wrappers, &mut self.used_names, &mut terminal_rules)
                    }
                })
                .collect();

            let mut current = head;
            for var in &vars[..vars.len() - 2] {
                let mid = fresh(current.as_str(), &mut self.used_names);
                binary_rules.insert((current, var.clone(), mid.clone()));
                current = mid;
            }
            binary_rules.insert((
                current,
                vars[vars.len() - 2].clone(),
                vars[vars.len() - 1].clone(),
            ));
        }

        let (terminal_rules, binary_rules, nullable) =
            self.remove_useless(terminal_rules, binary_rules);

        debug!(
            terminals = terminal_rules.len(),
            binaries = binary_rules.len(),
            nullable = nullable.len(),
            "normalized grammar"
        );

        WeakNormalForm {
            start: self.cfg.start.clone(),
            terminal_rules,
            binary_rules,
            nullable,
        }
    }

    /// Expands every production over the optional presence of its nullable
    /// occurrences and drops the resulting ε-bodies.
    fn eliminate_epsilons(&self) -> HashSet<(Symbol, Vec<Symbol>)> {
        let mut rules = HashSet::new();
        for production in &self.cfg.productions {
            let mut variants: Vec<Vec<Symbol>> = vec![Vec::new()];
            for symbol in &production.body {
                if self.nullable.contains(symbol) {
                    let mut doubled = Vec::with_capacity(variants.len() * 2);
                    for variant in variants {
                        let mut kept = variant.clone();
                        kept.push(symbol.clone());
                        doubled.push(kept);
                        doubled.push(variant);
                    }
                    variants = doubled;
                } else {
                    for variant in &mut variants {
                        variant.push(symbol.clone());
                    }
                }
            }
            for variant in variants {
                if !variant.is_empty() {
                    rules.insert((production.head.clone(), variant));
                }
            }
        }
        rules
    }

    /// Replaces every unit rule `A → B` by the non-unit bodies of every
    /// variable in the unit closure of `A`.
    fn eliminate_units(
        &self,
        rules: HashSet<(Symbol, Vec<Symbol>)>,
    ) -> HashSet<(Symbol, Vec<Symbol>)> {
        let mut by_head: HashMap<&Symbol, Vec<&Vec<Symbol>>> = HashMap::new();
        for (head, body) in &rules {
            by_head.entry(head).or_default().push(body);
        }

        let is_unit =
            |body: &Vec<Symbol>| body.len() == 1 && self.variables.contains(&body[0]);

        let mut result = HashSet::new();
        for variable in &self.variables {
            let mut closure: HashSet<&Symbol> = HashSet::new();
            let mut stack = vec![variable];
            while let Some(current) = stack.pop() {
                if !closure.insert(current) {
                    continue;
                }
                for &body in by_head.get(current).into_iter().flatten() {
                    if is_unit(body) {
                        stack.push(&body[0]);
                    }
                }
            }
            for member in closure {
                for &body in by_head.get(member).into_iter().flatten() {
                    if !is_unit(body) {
                        result.insert((variable.clone(), body.clone()));
                    }
                }
            }
        }
        result
    }

    /// Drops unproductive and unreachable symbols, keeping the rule shapes
    /// sorted for deterministic iteration downstream.
    fn remove_useless(
        &self,
        terminal_rules: HashSet<(Symbol, Symbol)>,
        binary_rules: HashSet<(Symbol, Symbol, Symbol)>,
    ) -> (
        Vec<(Symbol, Symbol)>,
        Vec<(Symbol, Symbol, Symbol)>,
        HashSet<Symbol>,
    ) {
        let mut productive: HashSet<Symbol> = self.nullable.clone();
        for (head, _) in &terminal_rules {
            productive.insert(head.clone());
        }
        loop {
            let mut changed = false;
            for (head, left, right) in &binary_rules {
                if !productive.contains(head)
                    && productive.contains(left)
                    && productive.contains(right)
                {
                    productive.insert(head.clone());
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }

        let mut reachable: HashSet<Symbol> = HashSet::new();
        let mut stack = vec![self.cfg.start.clone()];
        while let Some(current) = stack.pop() {
            if !reachable.insert(current.clone()) {
                continue;
            }
            for (head, left, right) in &binary_rules {
                if *head == current && productive.contains(left) && productive.contains(right) {
                    stack.push(left.clone());
                    stack.push(right.clone());
                }
            }
        }

        let mut terminals: Vec<(Symbol, Symbol)> = terminal_rules
            .into_iter()
            .filter(|(head, _)| reachable.contains(head))
            .collect();
        terminals.sort_unstable();

        let mut binaries: Vec<(Symbol, Symbol, Symbol)> = binary_rules
            .into_iter()
            .filter(|(head, left, right)| {
                reachable.contains(head)
                    && productive.contains(left)
                    && productive.contains(right)
            })
            .collect();
        binaries.sort_unstable();

        let nullable = self
            .nullable
            .iter()
            .filter(|var| reachable.contains(*var))
            .cloned()
            .collect();

        (terminals, binaries, nullable)
    }
}

/// Returns (inventing if needed) the wrapper variable deriving `terminal`.
fn wrap_terminal(
    terminal: &Symbol,
    wrappers: &mut HashMap<Symbol, Symbol>,
    used_names: &mut HashSet<String>,
    terminal_rules: &mut HashSet<(Symbol, Symbol)>,
) -> Symbol {
    if let Some(var) = wrappers.get(terminal) {
        return var.clone();
    }
    let var = fresh(terminal.as_str(), used_names);
    wrappers.insert(terminal.clone(), var.clone());
    terminal_rules.insert((var.clone(), terminal.clone()));
    var
}

/// Invents a symbol name `stem#n` not yet used anywhere in the grammar.
fn fresh(stem: &str, used_names: &mut HashSet<String>) -> Symbol {
    let mut n = 0usize;
    loop {
        let candidate = format!("{stem}#{n}");
        if used_names.insert(candidate.clone()) {
            return Symbol::new(candidate);
        }
        n += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nullable_propagates_through_bodies() {
        let cfg = Cfg::from_text("S -> A B\nA -> $\nB -> b | $").unwrap();
        let nullable = nullable_symbols(&cfg);
        assert!(nullable.contains(&Symbol::new("S")));
        assert!(nullable.contains(&Symbol::new("A")));
        assert!(nullable.contains(&Symbol::new("B")));
    }

    #[test]
    fn test_terminals_are_never_nullable() {
        let cfg = Cfg::from_text("S -> a").unwrap();
        assert!(nullable_symbols(&cfg).is_empty());
    }

    #[test]
    fn test_wnf_shapes_for_matched_brackets() {
        let wnf = WeakNormalForm::of(&Cfg::from_text("S -> a S b | a b").unwrap());
        assert!(wnf.nullable.is_empty());
        // Terminal wrappers for a and b plus the split chains.
        assert_eq!(wnf.terminal_rules.len(), 2);
        assert_eq!(wnf.binary_rules.len(), 3);
        for (_, left, right) in &wnf.binary_rules {
            assert_ne!(left.as_str(), "a");
            assert_ne!(right.as_str(), "b");
        }
    }

    #[test]
    fn test_wnf_keeps_original_nullability() {
        let wnf = WeakNormalForm::of(&Cfg::from_text("S -> a S | $").unwrap());
        assert!(wnf.nullable.contains(&Symbol::new("S")));
        // S -> a S survives as wrapper(a) S.
        assert_eq!(wnf.binary_rules.len(), 1);
        assert_eq!(wnf.terminal_rules.len(), 2);
    }

    #[test]
    fn test_wnf_drops_unreachable_rules() {
        let wnf = WeakNormalForm::of(&Cfg::from_text("S -> a\nX -> b").unwrap());
        assert_eq!(wnf.terminal_rules.len(), 1);
        assert_eq!(wnf.terminal_rules[0].0, Symbol::new("S"));
    }

    #[test]
    fn test_wnf_drops_unproductive_rules() {
        let wnf = WeakNormalForm::of(&Cfg::from_text("S -> a | X Y\nX -> a\nY -> Y Y").unwrap());
        assert!(wnf.binary_rules.is_empty());
        assert_eq!(wnf.terminal_rules.len(), 1);
    }

    #[test]
    fn test_wnf_unit_chain_collapses() {
        let wnf = WeakNormalForm::of(&Cfg::from_text("S -> A\nA -> B\nB -> b").unwrap());
        assert!(wnf.binary_rules.is_empty());
        assert!(
            wnf.terminal_rules
                .contains(&(Symbol::new("S"), Symbol::new("b"))),
        );
    }

    #[test]
    fn test_wnf_long_body_splits_into_binaries() {
        let wnf = WeakNormalForm::of(&Cfg::from_text("S -> a b c").unwrap());
        assert_eq!(wnf.binary_rules.len(), 2);
        assert_eq!(wnf.terminal_rules.len(), 3);
    }
}
