//! Context-free grammar model shared by the CFPQ engines.

pub mod normal;
pub mod rsm;

use std::collections::HashSet;

use crate::automaton::Symbol;
use crate::errors::GrammarError;

/// A single production `head → body`. An empty body derives the empty word.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Production {
    /// Left-hand side variable.
    pub head: Symbol,
    /// Right-hand side symbols; terminals and variables mixed freely.
    pub body: Vec<Symbol>,
}

impl Production {
    /// Creates a new [`Production`].
    #[must_use]
    pub fn new(head: impl Into<Symbol>, body: Vec<Symbol>) -> Self {
        Self {
            head: head.into(),
            body,
        }
    }
}

/// A context-free grammar over [`Symbol`]s.
///
/// The variables are exactly the symbols that occur as production heads;
/// every other symbol is a terminal.
#[derive(Debug, Clone)]
pub struct Cfg {
    /// Start variable.
    pub start: Symbol,
    /// Production list, in declaration order.
    pub productions: Vec<Production>,
}

impl Cfg {
    /// Creates a grammar from parts.
    #[must_use]
    pub fn new(start: impl Into<Symbol>, productions: Vec<Production>) -> Self {
        Self {
            start: start.into(),
            productions,
        }
    }

    /// Reads the line-oriented grammar form.
    ///
    /// Each non-blank line is `head -> body | body | …` with
    /// whitespace-separated symbols. `epsilon`, `eps` and `$` denote the
    /// empty word and vanish from bodies; an alternative without symbols is
    /// an ε-production as well. The head of the first line is the start
    /// variable.
    ///
    /// ```
    /// use pathquery::Cfg;
    ///
    /// let cfg = Cfg::from_text("S -> a S b | a b").unwrap();
    /// assert_eq!(cfg.start.as_str(), "S");
    /// assert_eq!(cfg.productions.len(), 2);
    /// ```
    ///
    /// # Errors
    ///
    /// Returns a [`GrammarError`] for a line without `->`, a head that is
    /// not a single symbol, or a text without any production.
    pub fn from_text(text: &str) -> Result<Cfg, GrammarError> {
        let mut productions = Vec::new();
        let mut start = None;

        for (idx, raw_line) in text.lines().enumerate() {
            let line = raw_line.trim();
            if line.is_empty() {
                continue;
            }
            let lineno = idx + 1;
            let (head_part, body_part) = line
                .split_once("->")
                .ok_or(GrammarError::MissingArrow { line: lineno })?;

            let mut head_symbols = head_part.split_whitespace();
            let head = match (head_symbols.next(), head_symbols.next()) {
                (Some(head), None) => Symbol::new(head),
                _ => return Err(GrammarError::BadHead { line: lineno }),
            };
            if start.is_none() {
                start = Some(head.clone());
            }

            for alternative in body_part.split('|') {
                let body: Vec<Symbol> = alternative
                    .split_whitespace()
                    .filter(|tok| !matches!(*tok, "epsilon" | "eps" | "$"))
                    .map(Symbol::new)
                    .collect();
                productions.push(Production {
                    head: head.clone(),
                    body,
                });
            }
        }

        match start {
            Some(start) => Ok(Cfg {
                start,
                productions,
            }),
            None => Err(GrammarError::Empty),
        }
    }

    /// The set of variables (symbols occurring as production heads).
    #[must_use]
    pub fn variables(&self) -> HashSet<Symbol> {
        self.productions
            .iter()
            .map(|p| p.head.clone())
            .collect()
    }
}
