//! Decoded satisfying assignments.

use crate::cnf::{Clause, Lit, Var};

/// A read-only total assignment decoded from solver output. Built once,
/// never mutated; enumeration of further solutions goes through
/// [`Solution::blocking_clause`].
#[derive(Debug, Clone)]
pub struct Solution {
    /// Value of variable `i + 1` at index `i`.
    assignment: Vec<bool>,
}

impl Solution {
    /// Build from the signed assignment literals of the solver's `v` lines,
    /// terminator excluded. Variables the solver never mentioned decode as
    /// false.
    pub fn from_literals(lits: &[i64]) -> Solution {
        let max = lits.iter().map(|l| l.unsigned_abs()).max().unwrap_or(0);
        let mut assignment = vec![false; max as usize];
        for &lit in lits {
            debug_assert_ne!(lit, 0, "terminator must be stripped before decoding");
            if lit > 0 {
                assignment[lit as usize - 1] = true;
            }
        }
        Solution { assignment }
    }

    /// The assigned value of a variable.
    pub fn get(&self, var: Var) -> bool {
        self.assignment.get(var.id() as usize - 1).copied().unwrap_or(false)
    }

    pub fn get_many(&self, vars: &[Var]) -> Vec<bool> {
        vars.iter().map(|&v| self.get(v)).collect()
    }

    /// The truth value of a literal under this assignment; constants decode
    /// to themselves.
    pub fn lit(&self, lit: Lit) -> bool {
        match lit {
            Lit::Pos(v) => self.get(v),
            Lit::Neg(v) => !self.get(v),
            Lit::True => true,
            Lit::False => false,
        }
    }

    /// Decode a bit field as an unsigned integer, `bits[0]` least
    /// significant.
    pub fn as_u64(&self, bits: &[Lit]) -> u64 {
        assert!(bits.len() <= 64, "bit field wider than 64");
        let mut value = 0u64;
        for (i, &bit) in bits.iter().enumerate() {
            if self.lit(bit) {
                value |= 1 << i;
            }
        }
        value
    }

    /// Binary rendering, most significant bit leftmost.
    pub fn as_binary_string(&self, bits: &[Lit]) -> String {
        bits.iter()
            .rev()
            .map(|&b| if self.lit(b) { '1' } else { '0' })
            .collect()
    }

    /// Hex rendering in nibbles of four bits, least-significant nibble
    /// rightmost. A width that is not a multiple of four is zero-padded at
    /// the top.
    pub fn as_hex_string(&self, bits: &[Lit]) -> String {
        let mut digits = Vec::new();
        for nibble in bits.chunks(4) {
            let mut value = 0u32;
            for (i, &bit) in nibble.iter().enumerate() {
                if self.lit(bit) {
                    value |= 1 << i;
                }
            }
            digits.push(std::char::from_digit(value, 16).expect("nibble in range"));
        }
        digits.iter().rev().collect()
    }

    /// The clause forbidding exactly this assignment: the disjunction of
    /// the negations of every assigned literal. Adding it back to the
    /// originating problem forces the next solve to differ somewhere.
    pub fn blocking_clause(&self) -> Clause {
        self.assignment
            .iter()
            .enumerate()
            .map(|(i, &value)| {
                let var = Var(i as u32 + 1);
                if value {
                    Lit::Neg(var)
                } else {
                    Lit::Pos(var)
                }
            })
            .collect()
    }

    /// Number of assigned variables.
    pub fn len(&self) -> usize {
        self.assignment.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignment.is_empty()
    }
}
