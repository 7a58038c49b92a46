//! Path queries over labeled directed multigraphs.
//!
//! Given a directed graph whose edges carry [`Symbol`] labels, the crate
//! answers which node pairs `(u, v)` are connected by a path whose
//! edge-label word belongs to a query language:
//!
//! - [`tensor_rpq`] and [`ms_bfs_rpq`] evaluate *regular* path queries
//!   (the language is a regular expression),
//! - [`hellings_cfpq`], [`matrix_cfpq`] and [`gll_cfpq`] evaluate
//!   *context-free* path queries (the language is a [`Cfg`] or an [`Rsm`]).
//!
//! All five engines are pure functions of their inputs and return an
//! unordered set of node-index pairs. They share the adjacency-matrix
//! automaton model in [`fa`] and the grammar model in [`grammar`].

pub mod automaton;
pub mod cfpq;
pub mod errors;
pub mod fa;
pub mod grammar;
pub mod graph;
pub mod matrix;
pub mod regex;
pub mod rpq;

pub use automaton::{StateId, Symbol};
pub use cfpq::{gll_cfpq, hellings_cfpq, matrix_cfpq};
pub use errors::{BuildError, GrammarError};
pub use fa::MatrixFa;
pub use grammar::rsm::Rsm;
pub use grammar::{Cfg, Production};
pub use graph::LabeledGraph;
pub use rpq::{ms_bfs_rpq, tensor_rpq};
