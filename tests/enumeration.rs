//! Solution enumeration through blocking clauses, against a real solver.

mod common;

use std::collections::HashSet;

use bvsynth::cnf::{Lit, Problem};
use bvsynth::solver::{solve, Outcome};

#[test]
fn blocking_exhausts_exactly_the_solution_count() {
    let Some(solver) = common::solver_or_skip("blocking enumeration") else {
        return;
    };

    // (a or b) over two variables has exactly three satisfying
    // assignments, so three solve/block cycles must exhaust the problem
    // and no assignment may repeat.
    let mut prob = Problem::new();
    let a = Lit::from(prob.mk_var());
    let b = Lit::from(prob.mk_var());
    prob.add_clause([a, b]);

    let mut seen: HashSet<(bool, bool)> = HashSet::new();
    loop {
        match solve(&prob, &solver).expect("solver run failed") {
            Outcome::Satisfiable(soln) => {
                let assignment = (soln.lit(a), soln.lit(b));
                assert!(
                    seen.insert(assignment),
                    "solver returned a blocked assignment {:?}",
                    assignment
                );
                assert!(assignment.0 || assignment.1, "assignment violates the clause");
                prob.add_clause(soln.blocking_clause());
            }
            Outcome::Unsatisfiable => break,
            Outcome::Indeterminate(reason) => panic!("indeterminate: {}", reason),
        }
    }
    assert_eq!(seen.len(), 3);
}
