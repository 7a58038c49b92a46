//! Query-regex surface syntax and its compilation to a minimal DFA.
//!
//! The pipeline runs lexer → parser → Thompson construction → subset
//! construction → partition-refinement minimization. Atoms are
//! whitespace/`.`-separated multi-character symbols; `|` and `+` both mean
//! alternation; `epsilon` and `$` denote the empty word; an empty pattern
//! denotes the empty language.

pub mod ast;
pub mod dfa;
pub mod lexer;
pub mod min;
pub mod nfa;
pub mod parser;
pub mod tokens;

use crate::errors::BuildError;

use self::ast::Ast;
use self::dfa::Dfa;
use self::nfa::Nfa;

/// Compiles a pattern string into a minimal DFA.
///
/// # Errors
///
/// Returns a [`BuildError`] when the pattern fails to lex or parse.
pub fn to_dfa(pattern: &str) -> Result<Dfa, BuildError> {
    let ast = Ast::build(pattern)?;
    let nfa = Nfa::build(&ast);
    let dfa = dfa::determinize(&nfa);
    Ok(min::minimize(&dfa))
}
