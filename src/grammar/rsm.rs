use indexmap::IndexMap;

use crate::automaton::{StateId, Symbol};
use crate::grammar::Cfg;
use crate::regex::ast::Ast;
use crate::regex::dfa::{self, Dfa};
use crate::regex::nfa::Nfa;

/// Identifier of a box within an [`Rsm`]: its insertion index.
pub type BoxId = u32;

/// A state of a recursive state machine: a box and a DFA state within it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RsmState {
    /// The box (variable) this state belongs to.
    pub box_id: BoxId,
    /// The state inside the box DFA.
    pub state: StateId,
}

/// One box of a recursive state machine: the DFA recognizing the
/// right-hand sides of a single variable. Transition labels mix terminals
/// with references to other boxes.
#[derive(Debug, Clone)]
pub struct RsmBox {
    /// The box automaton.
    pub dfa: Dfa,
}

/// A recursive state machine: one DFA box per variable.
///
/// An edge labeled with a symbol that names a box is a recursive call into
/// that box; any other label consumes a graph edge.
#[derive(Debug, Clone)]
pub struct Rsm {
    /// Start variable; its box is entered first.
    pub start: Symbol,
    /// Boxes keyed by variable, in insertion order (the [`BoxId`] order).
    pub boxes: IndexMap<Symbol, RsmBox>,
}

impl Rsm {
    /// Builds the machine for a grammar: each variable's productions become
    /// one alternation of concatenations, compiled through the shared
    /// Thompson and subset constructions.
    #[must_use]
    pub fn from_cfg(cfg: &Cfg) -> Rsm {
        let mut alternatives: IndexMap<Symbol, Option<Ast>> = IndexMap::new();
        // The start box exists even for a grammar without start productions.
        alternatives.insert(cfg.start.clone(), None);
        for production in &cfg.productions {
            let body_ast = production
                .body
                .iter()
                .cloned()
                .map(Ast::Atom)
                .reduce(Ast::concat)
                .unwrap_or(Ast::Epsilon);
            let slot = alternatives.entry(production.head.clone()).or_insert(None);
            *slot = Some(match slot.take() {
                Some(ast) => Ast::alt(ast, body_ast),
                None => body_ast,
            });
        }

        let boxes = alternatives
            .into_iter()
            .map(|(variable, ast)| {
                let ast = ast.unwrap_or(Ast::Empty);
                let dfa = dfa::determinize(&Nfa::build(&ast));
                (variable, RsmBox { dfa })
            })
            .collect();

        Rsm {
            start: cfg.start.clone(),
            boxes,
        }
    }

    /// The entry state of the start box.
    #[must_use]
    pub fn start_state(&self) -> RsmState {
        let (box_id, _, rsm_box) = self
            .boxes
            .get_full(&self.start)
            .expect("the start box always exists");
        RsmState {
            box_id: box_id as BoxId,
            state: rsm_box.dfa.start,
        }
    }

    /// Looks up a box by the symbol naming it.
    #[must_use]
    pub fn box_of(&self, symbol: &Symbol) -> Option<(BoxId, &RsmBox)> {
        self.boxes
            .get_full(symbol)
            .map(|(idx, _, rsm_box)| (idx as BoxId, rsm_box))
    }
}
