//! Core types for CNF construction

use std::fmt;
use std::ops::Not;

/// A propositional variable: an opaque positive identifier, unique within
/// one [`Problem`](crate::cnf::Problem) and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Var(pub(crate) u32);

impl Var {
    /// The variable's numeric identifier, always >= 1.
    pub fn id(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Var {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// A literal: a variable with a polarity, or a compile-time constant.
///
/// The constants get their own arms so they can never collide with a real
/// variable identifier; constant folding happens where clauses are built,
/// see [`Problem::add_clause`](crate::cnf::Problem::add_clause).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lit {
    /// The variable, asserted true.
    Pos(Var),
    /// The variable, asserted false.
    Neg(Var),
    /// Known true at encoding time.
    True,
    /// Known false at encoding time.
    False,
}

impl Lit {
    /// The underlying variable, if this is not a constant.
    pub fn var(self) -> Option<Var> {
        match self {
            Lit::Pos(v) | Lit::Neg(v) => Some(v),
            Lit::True | Lit::False => None,
        }
    }

    /// A constant literal with the given truth value.
    pub fn from_bool(value: bool) -> Lit {
        if value {
            Lit::True
        } else {
            Lit::False
        }
    }

    /// The signed-integer form used by the DIMACS exchange format.
    ///
    /// Panics on constants: they are folded away before serialization and
    /// have no numeric representation.
    pub(crate) fn to_dimacs(self) -> i32 {
        match self {
            Lit::Pos(v) => v.0 as i32,
            Lit::Neg(v) => -(v.0 as i32),
            Lit::True | Lit::False => panic!("constant literal has no DIMACS form"),
        }
    }
}

impl Not for Lit {
    type Output = Lit;

    fn not(self) -> Lit {
        match self {
            Lit::Pos(v) => Lit::Neg(v),
            Lit::Neg(v) => Lit::Pos(v),
            Lit::True => Lit::False,
            Lit::False => Lit::True,
        }
    }
}

impl From<Var> for Lit {
    fn from(v: Var) -> Lit {
        Lit::Pos(v)
    }
}

/// One disjunction of literals. Stored clauses contain no constants; those
/// are folded out at construction time.
pub type Clause = Vec<Lit>;
