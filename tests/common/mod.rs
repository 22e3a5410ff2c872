use bvsynth::solver::SolverCmd;

/// Locate a real DIMACS solver, or skip the calling test with a note.
/// End-to-end tests need one; everything else in the suite is hermetic.
pub fn solver_or_skip(test: &str) -> Option<SolverCmd> {
    match SolverCmd::probe() {
        Some(cmd) => Some(cmd),
        None => {
            eprintln!("skipping {}: no SAT solver found on PATH", test);
            None
        }
    }
}
