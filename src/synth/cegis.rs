//! Counterexample-guided synthesis against an external oracle.
//!
//! The loop owns no verification cleverness of its own: solve, decode,
//! probe the candidate on concrete inputs, and either accept it or feed
//! the first disagreeing input back in as a new example.

use log::{debug, info};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::cnf::Problem;
use crate::solver::{solve, Outcome, SolveError, SolverCmd};

use super::program::{Program, SynthesizedProgram};

/// Knobs for the synthesis loop.
#[derive(Debug, Clone)]
pub struct CegisConfig {
    /// Upper bound on solve/probe rounds before giving up.
    pub max_rounds: usize,
    /// Random probes per round, on top of the fixed edge cases.
    pub random_probes: usize,
    /// Seed for the probe generator, so runs are reproducible.
    pub seed: u64,
}

impl Default for CegisConfig {
    fn default() -> Self {
        CegisConfig { max_rounds: 32, random_probes: 64, seed: 0xb5 }
    }
}

/// How a synthesis run ended.
#[derive(Debug)]
pub enum CegisResult {
    /// A candidate consistent with all examples that also survived every
    /// probe against the oracle.
    Synthesized(SynthesizedProgram),
    /// No program of this slot count matches the accumulated examples.
    Unsatisfiable,
    /// Solver infrastructure failure or round budget exhausted; retryable,
    /// and never to be confused with unsatisfiability.
    Inconclusive(String),
}

/// Inputs worth probing regardless of the random draw. Mirrors the edge
/// values concrete-testing layers conventionally use for 64-bit words.
fn edge_case_inputs(width: usize) -> Vec<u64> {
    let mask = if width == 64 { u64::MAX } else { (1u64 << width) - 1 };
    let raw = [
        0,
        1,
        u64::MAX,
        1 << (width - 1),
        (1 << (width - 1)) - 1,
        0x5555_5555_5555_5555,
        0xAAAA_AAAA_AAAA_AAAA,
        0x0000_0000_FFFF_FFFF,
        0xFFFF_FFFF_0000_0000,
    ];
    let mut values: Vec<u64> = raw.iter().map(|v| v & mask).collect();
    values.sort_unstable();
    values.dedup();
    values
}

/// The first probe input where the candidate and the oracle disagree.
fn find_counterexample<F>(
    candidate: &SynthesizedProgram,
    oracle: &mut F,
    rng: &mut ChaCha8Rng,
    config: &CegisConfig,
) -> Option<u64>
where
    F: FnMut(u64) -> u64,
{
    let mask = if candidate.width() == 64 {
        u64::MAX
    } else {
        (1u64 << candidate.width()) - 1
    };
    for x in edge_case_inputs(candidate.width()) {
        if candidate.eval(x) != oracle(x) & mask {
            return Some(x);
        }
    }
    for _ in 0..config.random_probes {
        let x = rng.random::<u64>() & mask;
        if candidate.eval(x) != oracle(x) & mask {
            return Some(x);
        }
    }
    None
}

/// Synthesize an `n_slots` program agreeing with `oracle`, starting from
/// `examples` and growing them with counterexamples until a candidate
/// survives the probe budget.
pub fn synthesize<F>(
    n_slots: usize,
    width: usize,
    examples: &[(u64, u64)],
    mut oracle: F,
    config: &CegisConfig,
    solver: &SolverCmd,
) -> Result<CegisResult, SolveError>
where
    F: FnMut(u64) -> u64,
{
    let mut prob = Problem::new();
    let mut program = Program::new(&mut prob, n_slots, width);
    for &(input, output) in examples {
        program.add_example(&mut prob, input, output);
    }

    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    for round in 0..config.max_rounds {
        debug!(
            "synthesis round {}: {} examples, {} clauses",
            round,
            program.examples().len(),
            prob.clause_count()
        );
        match solve(&prob, solver)? {
            Outcome::Unsatisfiable => return Ok(CegisResult::Unsatisfiable),
            Outcome::Indeterminate(reason) => return Ok(CegisResult::Inconclusive(reason)),
            Outcome::Satisfiable(soln) => {
                let candidate = program.decode(&soln);
                match find_counterexample(&candidate, &mut oracle, &mut rng, config) {
                    None => {
                        info!("accepted candidate after {} rounds:\n{}", round + 1, candidate);
                        return Ok(CegisResult::Synthesized(candidate));
                    }
                    Some(x) => {
                        let y = oracle(x);
                        info!("counterexample: {:#x} -> {:#x}", x, y);
                        program.add_example(&mut prob, x, y);
                    }
                }
            }
        }
    }
    Ok(CegisResult::Inconclusive(format!(
        "no candidate survived within {} rounds",
        config.max_rounds
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synth::alu::Opcode;
    use crate::synth::program::Inst;

    #[test]
    fn edge_cases_respect_the_width() {
        for width in [8, 16, 64] {
            let mask = if width == 64 { u64::MAX } else { (1u64 << width) - 1 };
            for value in edge_case_inputs(width) {
                assert_eq!(value & mask, value);
            }
        }
    }

    #[test]
    fn counterexample_search_finds_a_disagreement() {
        // Candidate computes x; oracle wants x + 1: everything disagrees.
        let candidate = SynthesizedProgram::from_insts(
            64,
            vec![Inst { opcode: Opcode::Input, args: [None; 3] }],
        );
        let mut oracle = |x: u64| x.wrapping_add(1);
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let config = CegisConfig::default();
        let cx = find_counterexample(&candidate, &mut oracle, &mut rng, &config);
        assert!(cx.is_some());
    }

    #[test]
    fn agreeing_candidate_has_no_counterexample() {
        let candidate = SynthesizedProgram::from_insts(
            64,
            vec![
                Inst { opcode: Opcode::Input, args: [None; 3] },
                Inst { opcode: Opcode::Shr4, args: [Some(0), None, None] },
            ],
        );
        let mut oracle = |x: u64| x >> 4;
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let config = CegisConfig::default();
        assert!(find_counterexample(&candidate, &mut oracle, &mut rng, &config).is_none());
    }
}
