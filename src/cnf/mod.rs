//! CNF construction: variables, literals, clauses, and gate encodings.
//!
//! [`Problem`] owns the growing store of variables and clauses for one SAT
//! instance. The gate builders in [`gates`] and the word-level builders in
//! [`words`] all allocate fresh variables from the same store and emit
//! implication clauses into it, so a single `&mut Problem` is threaded
//! through every encoding step.

mod dimacs;
mod gates;
mod problem;
mod types;
pub mod words;

pub use dimacs::{parse_dimacs, DimacsError};
pub use problem::Problem;
pub use types::{Clause, Lit, Var};
pub use words::{Word, WORD_WIDTH};
