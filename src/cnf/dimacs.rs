//! Reading the textual CNF exchange format back into a [`Problem`].
//!
//! The writer lives on [`Problem`] itself; this parser exists for the
//! `solve` CLI subcommand and for round-trip checks.

use std::io::{self, BufRead};
use std::num::ParseIntError;

use thiserror::Error;

use super::problem::Problem;
use super::types::{Lit, Var};

#[derive(Debug, Error)]
pub enum DimacsError {
    #[error("i/o error reading CNF: {0}")]
    Io(#[from] io::Error),
    #[error("missing `p cnf` header")]
    MissingHeader,
    #[error("malformed header line: `{0}`")]
    MalformedHeader(String),
    #[error("malformed literal: {0}")]
    MalformedLiteral(#[from] ParseIntError),
    #[error("literal {0} references a variable beyond the header's count {1}")]
    VariableOutOfRange(i32, u32),
    #[error("clause not terminated by 0")]
    UnterminatedClause,
}

/// Parse `p cnf` input: comment lines are skipped, clauses are
/// whitespace-separated signed literals terminated by `0` and may span
/// lines.
pub fn parse_dimacs<R: BufRead>(reader: R) -> Result<Problem, DimacsError> {
    let mut problem = Problem::new();
    let mut var_count: Option<u32> = None;
    let mut clause: Vec<Lit> = Vec::new();
    let mut in_clause = false;

    for line in reader.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('c') {
            continue;
        }
        if line.starts_with('p') {
            let fields: Vec<&str> = line.split_whitespace().collect();
            match fields.as_slice() {
                ["p", "cnf", vars, _clauses] => {
                    let vars: u32 = vars.parse()?;
                    problem.reserve_vars(vars);
                    var_count = Some(vars);
                }
                _ => return Err(DimacsError::MalformedHeader(line.to_string())),
            }
            continue;
        }
        let max_var = var_count.ok_or(DimacsError::MissingHeader)?;
        for token in line.split_whitespace() {
            let value: i32 = token.parse()?;
            if value == 0 {
                problem.add_clause(clause.drain(..));
                in_clause = false;
                continue;
            }
            let id = value.unsigned_abs();
            if id > max_var {
                return Err(DimacsError::VariableOutOfRange(value, max_var));
            }
            let var = Var(id);
            clause.push(if value > 0 { Lit::Pos(var) } else { Lit::Neg(var) });
            in_clause = true;
        }
    }

    if in_clause {
        return Err(DimacsError::UnterminatedClause);
    }
    Ok(problem)
}
