//! Context-free path query engines.

pub mod gll;
pub mod hellings;
pub mod matrix;

pub use gll::gll_cfpq;
pub use hellings::hellings_cfpq;
pub use matrix::matrix_cfpq;
