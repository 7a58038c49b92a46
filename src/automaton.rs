use std::fmt;

/// Identifier type for automaton states.
pub type StateId = u32;

/// An edge or word label, compared and hashed by value.
///
/// Terminals and nonterminals share this type; a [`Rsm`](crate::grammar::rsm::Rsm)
/// tells them apart by box membership.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(String);

impl Symbol {
    /// Creates a new [`Symbol`] from anything string-like.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the label text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Symbol {
    fn from(name: &str) -> Self {
        Self(name.to_owned())
    }
}

impl From<String> for Symbol {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Labels describing the kind of transition between states.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EdgeLabel {
    /// Epsilon transition that consumes no input.
    Eps,
    /// Consumes a specific symbol.
    Sym(Symbol),
}

impl fmt::Display for EdgeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EdgeLabel::Eps => write!(f, "ε"),
            EdgeLabel::Sym(s) => write!(f, "{s}"),
        }
    }
}

/// Transition stored in adjacency lists.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    /// Destination state.
    pub to: StateId,
    /// Transition label.
    pub label: EdgeLabel,
}
