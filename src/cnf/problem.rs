//! The growing store of variables and clauses for one SAT instance.

use std::io::{self, Write};

use super::types::{Clause, Lit, Var};

/// One CNF instance under construction: a variable counter plus the clause
/// set. Exclusively owned by a single encoding run; there is no deletion,
/// the store only grows.
#[derive(Debug, Default, Clone)]
pub struct Problem {
    last_var: u32,
    clauses: Vec<Clause>,
}

impl Problem {
    pub fn new() -> Problem {
        Problem::default()
    }

    /// Allocate a fresh variable. Identifiers start at 1 and are never
    /// reused.
    pub fn mk_var(&mut self) -> Var {
        self.last_var += 1;
        Var(self.last_var)
    }

    /// Allocate `n` fresh variables.
    pub fn mk_vars(&mut self, n: usize) -> Vec<Var> {
        (0..n).map(|_| self.mk_var()).collect()
    }

    /// Number of variables allocated so far.
    pub fn var_count(&self) -> u32 {
        self.last_var
    }

    pub fn clause_count(&self) -> usize {
        self.clauses.len()
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    /// Assert a disjunction, folding constants: a clause containing a
    /// constant-true literal is a tautology and is discarded; constant-false
    /// literals can never satisfy the clause and are dropped from it. An
    /// empty clause (possibly after folding) is kept and makes the problem
    /// unsatisfiable.
    pub fn add_clause<I>(&mut self, lits: I)
    where
        I: IntoIterator<Item = Lit>,
    {
        let mut clause = Clause::new();
        for lit in lits {
            match lit {
                Lit::True => return,
                Lit::False => {}
                lit => clause.push(lit),
            }
        }
        self.clauses.push(clause);
    }

    /// Assert `and(antecedents) -> or(consequents)`, the clause shape every
    /// gate encoding reduces to: `¬a1 ∨ … ∨ ¬an ∨ c1 ∨ … ∨ cm`.
    pub fn implies(&mut self, antecedents: &[Lit], consequents: &[Lit]) {
        self.add_clause(
            antecedents
                .iter()
                .map(|&a| !a)
                .chain(consequents.iter().copied()),
        );
    }

    /// Assert a single literal.
    pub fn assert_lit(&mut self, lit: Lit) {
        self.add_clause([lit]);
    }

    /// Write the DIMACS exchange format: a `p cnf <vars> <clauses>` header,
    /// then one line per clause of signed decimal literals terminated by
    /// `0`.
    pub fn write_dimacs<W: Write>(&self, mut w: W) -> io::Result<()> {
        writeln!(w, "p cnf {} {}", self.last_var, self.clauses.len())?;
        for clause in &self.clauses {
            for lit in clause {
                write!(w, "{} ", lit.to_dimacs())?;
            }
            writeln!(w, "0")?;
        }
        Ok(())
    }

    /// The DIMACS serialization as an owned byte buffer.
    pub fn to_dimacs(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        self.write_dimacs(&mut buf)
            .expect("writing to a Vec cannot fail");
        buf
    }

    /// Used by the DIMACS parser to pre-declare the header's variable
    /// count.
    pub(crate) fn reserve_vars(&mut self, count: u32) {
        self.last_var = self.last_var.max(count);
    }
}
