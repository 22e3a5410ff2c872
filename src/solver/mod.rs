//! Driving an external DIMACS solver and decoding its answers.

mod bridge;
mod solution;

pub use bridge::{solve, Outcome, SolveError, SolverCmd};
pub use solution::Solution;
