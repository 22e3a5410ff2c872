//! Tseitin-style boolean gate encodings layered over [`Problem`].
//!
//! Every `mk_*` builder allocates exactly one fresh output variable and
//! asserts biconditional clauses, so under any total assignment the clauses
//! hold iff the output matches the gate's truth table.

use super::problem::Problem;
use super::types::Lit;

/// The parity encoding enumerates every assignment of its atoms, which is
/// exponential; it is only meant for the small fixed arities the ALU needs.
const PARITY_MAX_ATOMS: usize = 8;

impl Problem {
    /// Fresh `output` with `output <-> and(inputs)`.
    pub fn mk_and(&mut self, inputs: &[Lit]) -> Lit {
        let output = Lit::from(self.mk_var());
        self.implies(inputs, &[output]);
        for &input in inputs {
            self.implies(&[!input], &[!output]);
        }
        output
    }

    /// Fresh `output` with `output <-> or(inputs)`.
    pub fn mk_or(&mut self, inputs: &[Lit]) -> Lit {
        let output = Lit::from(self.mk_var());
        self.implies(&[output], inputs);
        for &input in inputs {
            self.implies(&[input], &[output]);
        }
        output
    }

    /// Constrain the atoms to odd or even parity by blocking every
    /// assignment of the wrong parity. Exponential in `atoms.len()`, so
    /// the fan-in is capped at [`PARITY_MAX_ATOMS`].
    pub fn parity(&mut self, atoms: &[Lit], odd: bool) {
        assert!(
            atoms.len() <= PARITY_MAX_ATOMS,
            "parity fan-in {} exceeds the exponential encoding's cap of {}",
            atoms.len(),
            PARITY_MAX_ATOMS
        );
        let n = atoms.len();
        for row in 0u32..(1 << n) {
            if (row.count_ones() & 1 == 1) != odd {
                let banned: Vec<Lit> = atoms
                    .iter()
                    .enumerate()
                    .map(|(j, &a)| if row >> j & 1 == 1 { a } else { !a })
                    .collect();
                self.implies(&banned, &[]);
            }
        }
    }

    /// Fresh `output` with `output <-> xor(inputs)`, via the parity
    /// encoding over `{output} ∪ inputs`.
    pub fn mk_xor(&mut self, inputs: &[Lit]) -> Lit {
        let output = Lit::from(self.mk_var());
        let mut atoms = vec![output];
        atoms.extend_from_slice(inputs);
        self.parity(&atoms, false);
        output
    }

    /// `ctl -> (a <-> b)`; when `ctl` is false the two are unrelated.
    pub fn eq_if(&mut self, ctl: Lit, a: Lit, b: Lit) {
        self.implies(&[ctl, a], &[b]);
        self.implies(&[ctl, b], &[a]);
    }

    /// Fresh `output` equal to `input0` when `ctl` is false and `input1`
    /// when it is true.
    pub fn mk_mux(&mut self, ctl: Lit, input0: Lit, input1: Lit) -> Lit {
        let output = Lit::from(self.mk_var());
        self.eq_if(!ctl, input0, output);
        self.eq_if(ctl, input1, output);
        output
    }

    /// At least one of the atoms is true: a single disjunction.
    pub fn at_least_one(&mut self, atoms: &[Lit]) {
        self.implies(&[], atoms);
    }

    /// At most one of the atoms is true: the pairwise O(n²) encoding.
    pub fn at_most_one(&mut self, atoms: &[Lit]) {
        for (i, &a) in atoms.iter().enumerate() {
            for &b in &atoms[i + 1..] {
                self.implies(&[a, b], &[]);
            }
        }
    }

    /// Exactly one of the atoms is true.
    pub fn exactly_one(&mut self, atoms: &[Lit]) {
        self.at_least_one(atoms);
        self.at_most_one(atoms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cnf::test_support::{satisfies, satisfying_assignments};
    use crate::cnf::Var;
    use std::collections::HashMap;

    /// Check a gate builder against its truth table: over all total
    /// assignments of inputs and output, the clauses hold iff the output
    /// equals `expected(inputs)`.
    fn check_gate<F>(arity: usize, build: impl Fn(&mut Problem, &[Lit]) -> Lit, expected: F)
    where
        F: Fn(&[bool]) -> bool,
    {
        let mut p = Problem::new();
        let inputs: Vec<Lit> = p.mk_vars(arity).into_iter().map(Lit::from).collect();
        let output = build(&mut p, &inputs);
        let out_var = output.var().unwrap();
        for bits in 0u32..(1 << (arity + 1)) {
            let mut assignment: HashMap<Var, bool> = inputs
                .iter()
                .enumerate()
                .map(|(i, l)| (l.var().unwrap(), bits >> i & 1 == 1))
                .collect();
            let out_value = bits >> arity & 1 == 1;
            assignment.insert(out_var, out_value);
            let input_values: Vec<bool> =
                (0..arity).map(|i| bits >> i & 1 == 1).collect();
            assert_eq!(
                satisfies(&p, &assignment),
                out_value == expected(&input_values),
                "gate disagrees with truth table at bits {:b}",
                bits
            );
        }
    }

    #[test]
    fn and_matches_truth_table() {
        for arity in 1..=4 {
            check_gate(arity, |p, ins| p.mk_and(ins), |vals| vals.iter().all(|&v| v));
        }
    }

    #[test]
    fn or_matches_truth_table() {
        for arity in 1..=4 {
            check_gate(arity, |p, ins| p.mk_or(ins), |vals| vals.iter().any(|&v| v));
        }
    }

    #[test]
    fn xor_matches_truth_table() {
        for arity in 1..=4 {
            check_gate(
                arity,
                |p, ins| p.mk_xor(ins),
                |vals| vals.iter().filter(|&&v| v).count() % 2 == 1,
            );
        }
    }

    #[test]
    fn mux_matches_truth_table() {
        // Inputs ordered [ctl, input0, input1].
        check_gate(
            3,
            |p, ins| p.mk_mux(ins[0], ins[1], ins[2]),
            |vals| if vals[0] { vals[2] } else { vals[1] },
        );
    }

    #[test]
    fn gates_accept_constant_inputs() {
        let mut p = Problem::new();
        let a = Lit::from(p.mk_var());
        let out = p.mk_and(&[a, Lit::False]);
        // The only satisfying assignments set the output false.
        let vars = vec![a.var().unwrap(), out.var().unwrap()];
        let solutions = satisfying_assignments(&p, &vars);
        assert!(!solutions.is_empty());
        assert!(solutions.iter().all(|s| !s[&out.var().unwrap()]));
    }

    #[test]
    fn exactly_one_holds_iff_one_atom_true() {
        for arity in 1..=5 {
            let mut p = Problem::new();
            let atoms: Vec<Lit> = p.mk_vars(arity).into_iter().map(Lit::from).collect();
            p.exactly_one(&atoms);
            let vars: Vec<Var> = atoms.iter().map(|l| l.var().unwrap()).collect();
            for bits in 0u32..(1 << arity) {
                let assignment: HashMap<Var, bool> = vars
                    .iter()
                    .enumerate()
                    .map(|(i, &v)| (v, bits >> i & 1 == 1))
                    .collect();
                assert_eq!(satisfies(&p, &assignment), bits.count_ones() == 1);
            }
        }
    }

    #[test]
    fn parity_blocks_exactly_the_wrong_rows() {
        let mut p = Problem::new();
        let atoms: Vec<Lit> = p.mk_vars(3).into_iter().map(Lit::from).collect();
        p.parity(&atoms, true);
        let vars: Vec<Var> = atoms.iter().map(|l| l.var().unwrap()).collect();
        let solutions = satisfying_assignments(&p, &vars);
        assert_eq!(solutions.len(), 4);
        for s in solutions {
            assert_eq!(vars.iter().filter(|&v| s[v]).count() % 2, 1);
        }
    }

    #[test]
    #[should_panic(expected = "parity fan-in")]
    fn parity_rejects_wide_fan_in() {
        let mut p = Problem::new();
        let atoms: Vec<Lit> = p.mk_vars(9).into_iter().map(Lit::from).collect();
        p.parity(&atoms, false);
    }
}
