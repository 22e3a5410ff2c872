//! SAT-based synthesis of straight-line bit-vector programs.
//!
//! The crate is split into three layers:
//!
//! - [`cnf`]: variables, literals, clauses, and Tseitin-style gate encodings
//!   (boolean and lane-wise over fixed-width words).
//! - [`solver`]: serialization to the DIMACS exchange format, a bridge to an
//!   external solver subprocess, and decoding of satisfying assignments.
//! - [`synth`]: the client of the two layers above, encoding an unknown
//!   straight-line ALU program as boolean constraints, plus the
//!   counterexample-guided loop that grows the example set until a candidate
//!   survives an external oracle.

pub mod cnf;
pub mod solver;
pub mod synth;
