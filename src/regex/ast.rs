use crate::automaton::Symbol;
use crate::errors::BuildError;
use crate::regex::{lexer, parser};

/// An abstract syntax tree for a query regular expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ast {
    /// The empty language (an empty pattern).
    Empty,
    /// The empty word.
    Epsilon,
    /// A literal symbol.
    Atom(Symbol),
    /// Concatenation of two expressions.
    Concat(Box<Ast>, Box<Ast>),
    /// Alternation between two expressions.
    Alt(Box<Ast>, Box<Ast>),
    /// Zero-or-more repetition.
    Star(Box<Ast>),
}

impl Ast {
    /// Lexes and parses a pattern string.
    ///
    /// # Errors
    ///
    /// Returns a [`BuildError`] when the pattern fails to lex or parse.
    pub fn build(pattern: &str) -> Result<Ast, BuildError> {
        let tokens = lexer::lex(pattern)?;
        Ok(parser::parse(&tokens)?)
    }

    /// Creates a concatenation node.
    #[must_use]
    pub fn concat(lhs: Ast, rhs: Ast) -> Ast {
        Ast::Concat(Box::new(lhs), Box::new(rhs))
    }

    /// Creates an alternation node.
    #[must_use]
    pub fn alt(lhs: Ast, rhs: Ast) -> Ast {
        Ast::Alt(Box::new(lhs), Box::new(rhs))
    }

    /// Creates a Kleene star node.
    #[must_use]
    pub fn star(inner: Ast) -> Ast {
        Ast::Star(Box::new(inner))
    }
}
