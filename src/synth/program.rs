//! Composing instruction slots into a straight-line program.
//!
//! Slots are laid out in evaluation order: every producer precedes its
//! consumer and the last slot's output is the program output. Each
//! instruction's operands are the results of a contiguous, non-overlapping
//! span of the preceding slots, so the slot sequence reads like
//! reverse-Polish notation without ever simulating a stack:
//!
//! - argument 0 of slot `i` is always produced by the adjacent slot `i-1`;
//! - `span_start[i][b]` holds when the span consumed by slot `i` (itself
//!   included) begins at slot `b`; a leaf spans only itself;
//! - if argument `k` comes from producer `j` whose span begins at `b`, the
//!   next argument must come from slot `b-1`, immediately below that span;
//! - every slot's output is consumed exactly once, except the last, and
//!   the final span covers the whole program, so no slot is dead.
//!
//! The wiring (control and routing variables) is shared across examples;
//! each example only contributes fresh data words and equality constraints.

use std::fmt;

use log::debug;

use crate::cnf::words::Word;
use crate::cnf::{Lit, Problem};
use crate::solver::Solution;

use super::alu::{AluData, AluSlot, Opcode};

/// The encoded router for a fixed slot count and word width.
#[derive(Debug)]
pub struct Program {
    width: usize,
    slots: Vec<AluSlot>,
    /// `route[k][i][j]`: argument `k` of consumer `i` is wired from
    /// producer `j`. `None` where the combination is structurally
    /// impossible.
    route: Vec<Vec<Vec<Option<Lit>>>>,
    /// `span_start[i][b]` for `b <= i`; see the module docs.
    span_start: Vec<Vec<Lit>>,
    examples: Vec<(u64, u64)>,
}

/// Producers structurally allowed to feed argument `k` of consumer `i`:
/// argument 0 only the adjacent slot, argument `k` must leave room for the
/// `k` spans wired in between.
fn producer_range(k: usize, i: usize) -> std::ops::Range<usize> {
    if i <= k {
        return 0..0;
    }
    if k == 0 {
        i - 1..i
    } else {
        0..i - k
    }
}

impl Program {
    /// Allocate `n_slots` instruction slots and the routing constraints
    /// tying them into one straight-line program.
    pub fn new(prob: &mut Problem, n_slots: usize, width: usize) -> Program {
        assert!(n_slots >= 1, "a program needs at least one slot");
        let slots: Vec<AluSlot> = (0..n_slots).map(|_| AluSlot::new(prob)).collect();

        let mut route = vec![vec![vec![None; n_slots]; n_slots]; 3];
        for (k, per_arg) in route.iter_mut().enumerate() {
            for (i, per_consumer) in per_arg.iter_mut().enumerate() {
                for j in producer_range(k, i) {
                    per_consumer[j] = Some(Lit::from(prob.mk_var()));
                }
            }
        }

        // Each enabled argument is fed by exactly one producer; a disabled
        // argument by none.
        for (i, slot) in slots.iter().enumerate() {
            for k in 0..3 {
                let mut atoms = vec![!slot.inenb[k]];
                atoms.extend(producer_range(k, i).filter_map(|j| route[k][i][j]));
                prob.exactly_one(&atoms);
            }
        }

        // Every producer's output is consumed exactly once; the last slot
        // is the program output and is consumed by nobody.
        for j in 0..n_slots.saturating_sub(1) {
            let mut atoms = Vec::new();
            for per_arg in &route {
                for per_consumer in per_arg.iter().skip(j + 1) {
                    if let Some(r) = per_consumer[j] {
                        atoms.push(r);
                    }
                }
            }
            prob.exactly_one(&atoms);
        }

        // span_start[i][b]: built bottom-up, consumers after producers.
        let mut span_start: Vec<Vec<Lit>> = Vec::with_capacity(n_slots);
        for (i, slot) in slots.iter().enumerate() {
            let mut row = vec![Lit::False; i + 1];
            row[i] = !slot.inenb[0];
            for b in (0..i).rev() {
                let mut terms = Vec::new();
                for k in 0..3 {
                    for j in producer_range(k, i) {
                        let Some(r) = route[k][i][j] else { continue };
                        if j < b {
                            continue;
                        }
                        // Argument k is the last one enabled, it is wired
                        // from j, and j's own span begins at b.
                        let mut atoms = vec![slot.inenb[k], r, span_start[j][b]];
                        if k < 2 {
                            atoms.push(!slot.inenb[k + 1]);
                        }
                        terms.push(prob.mk_and(&atoms));
                    }
                }
                row[b] = if terms.is_empty() { Lit::False } else { prob.mk_or(&terms) };
            }
            span_start.push(row);
        }

        // Consecutive arguments consume adjacent spans: argument k wired
        // from j whose span begins at b forces argument k+1 to come from
        // slot b-1, or forbids the combination when no slot is left below.
        for (i, slot) in slots.iter().enumerate() {
            for k in 0..2 {
                for j in producer_range(k, i) {
                    let Some(r) = route[k][i][j] else { continue };
                    for b in 0..=j {
                        let span = span_start[j][b];
                        let next = slot.inenb[k + 1];
                        match b.checked_sub(1).and_then(|jj| route[k + 1][i][jj]) {
                            Some(next_route) => prob.implies(&[r, span, next], &[next_route]),
                            None => prob.implies(&[r, span, next], &[]),
                        }
                    }
                }
            }
        }

        // The program's span covers every slot.
        prob.assert_lit(span_start[n_slots - 1][0]);

        Program { width, slots, route, span_start, examples: Vec::new() }
    }

    pub fn n_slots(&self) -> usize {
        self.slots.len()
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn slots(&self) -> &[AluSlot] {
        &self.slots
    }

    pub fn examples(&self) -> &[(u64, u64)] {
        &self.examples
    }

    /// Bind one input/output pair: fresh data words for every slot, routed
    /// equalities against the shared wiring, the input word pinned to
    /// `input`, and the last slot's output pinned to `output`.
    pub fn add_example(&mut self, prob: &mut Problem, input: u64, output: u64) {
        let x = prob.mk_word(self.width);
        bind_word(prob, &x, input);

        let data: Vec<AluData> = self
            .slots
            .iter()
            .map(|slot| slot.encode_data(prob, &x))
            .collect();

        for (k, per_arg) in self.route.iter().enumerate() {
            for (i, per_consumer) in per_arg.iter().enumerate() {
                for (j, &r) in per_consumer.iter().enumerate() {
                    if let Some(r) = r {
                        let (consumer, producer) =
                            (&data[i].inputs[k], &data[j].out);
                        prob.eqn_if(r, consumer, producer);
                    }
                }
            }
        }

        let last = data[self.slots.len() - 1].out.clone();
        bind_word(prob, &last, output);

        debug!(
            "bound example {:#x} -> {:#x} ({} examples total)",
            input,
            output,
            self.examples.len() + 1
        );
        self.examples.push((input, output));
    }

    /// Read the synthesized program out of a satisfying assignment.
    pub fn decode(&self, soln: &Solution) -> SynthesizedProgram {
        let insts = self
            .slots
            .iter()
            .enumerate()
            .map(|(i, slot)| {
                let opcode = slot.decode_opcode(soln);
                let mut args = [None; 3];
                for (k, arg) in args.iter_mut().enumerate() {
                    *arg = producer_range(k, i)
                        .find(|&j| self.route[k][i][j].is_some_and(|r| soln.lit(r)));
                }
                Inst { opcode, args }
            })
            .collect();
        SynthesizedProgram { width: self.width, insts }
    }

    /// The span-start bound decoded for one slot; exposed for invariant
    /// checks in tests.
    pub fn decode_span_start(&self, soln: &Solution, slot: usize) -> usize {
        self.span_start[slot]
            .iter()
            .position(|&l| soln.lit(l))
            .expect("satisfying assignment leaves a slot without a span")
    }
}

fn bind_word(prob: &mut Problem, word: &Word, value: u64) {
    for (i, &lit) in word.iter().enumerate() {
        prob.assert_lit(if value >> i & 1 == 1 { lit } else { !lit });
    }
}

/// One decoded instruction: its opcode and the producer slot feeding each
/// enabled argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Inst {
    pub opcode: Opcode,
    pub args: [Option<usize>; 3],
}

/// A concrete straight-line program decoded from a solution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesizedProgram {
    width: usize,
    insts: Vec<Inst>,
}

impl SynthesizedProgram {
    /// Assemble a program directly from instructions, e.g. to evaluate a
    /// hand-written candidate.
    pub fn from_insts(width: usize, insts: Vec<Inst>) -> SynthesizedProgram {
        assert!(!insts.is_empty(), "programs have at least one slot");
        assert!(width >= 1 && width <= 64, "unsupported word width {}", width);
        SynthesizedProgram { width, insts }
    }

    pub fn insts(&self) -> &[Inst] {
        &self.insts
    }

    pub fn len(&self) -> usize {
        self.insts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.insts.is_empty()
    }

    pub fn width(&self) -> usize {
        self.width
    }

    fn mask(&self) -> u64 {
        if self.width == 64 {
            u64::MAX
        } else {
            (1u64 << self.width) - 1
        }
    }

    /// Evaluate the program on a concrete input word. Slots are already in
    /// evaluation order, so a single left-to-right pass suffices.
    pub fn eval(&self, input: u64) -> u64 {
        let mask = self.mask();
        let x = input & mask;
        let mut values = vec![0u64; self.insts.len()];
        for (i, inst) in self.insts.iter().enumerate() {
            let operand = |k: usize| inst.args[k].map(|j| values[j]).unwrap_or(0);
            values[i] = inst.opcode.eval(x, operand(0), operand(1), operand(2)) & mask;
        }
        *values.last().expect("programs have at least one slot")
    }
}

impl fmt::Display for SynthesizedProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, inst) in self.insts.iter().enumerate() {
            write!(f, "t{} = {}", i, inst.opcode)?;
            for arg in inst.args.iter().flatten() {
                write!(f, " t{}", arg)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cnf::test_support::propagate;

    #[test]
    fn producer_ranges_are_structural() {
        // Argument 0 only from the adjacent slot.
        assert_eq!(producer_range(0, 3).collect::<Vec<_>>(), vec![2]);
        assert_eq!(producer_range(0, 0).count(), 0);
        // Argument 1 leaves one slot of room, argument 2 two.
        assert_eq!(producer_range(1, 4).collect::<Vec<_>>(), vec![0, 1, 2]);
        assert_eq!(producer_range(2, 4).collect::<Vec<_>>(), vec![0, 1]);
        assert_eq!(producer_range(2, 2).count(), 0);
    }

    #[test]
    fn single_slot_program_must_be_a_leaf() {
        let mut prob = Problem::new();
        let program = Program::new(&mut prob, 1, 8);
        // With no producers available, the only argument cardinality
        // solution disables input 0, which propagation derives on its own.
        let assignment = propagate(&prob, &[]).expect("one-slot program conflicts");
        let enb0 = program.slots[0].inenb[0].var().unwrap();
        assert_eq!(assignment.get(&enb0), Some(&false));
    }

    #[test]
    fn a_leaf_final_slot_cannot_head_a_two_slot_program() {
        // If the last of two slots consumes nothing, slot 0's output is
        // dead and the full-span and consumed-exactly-once constraints
        // must conflict.
        let mut prob = Problem::new();
        let program = Program::new(&mut prob, 2, 8);
        let enb0 = program.slots[1].inenb[0].var().unwrap();
        assert!(propagate(&prob, &[(enb0, false)]).is_none());
    }

    #[test]
    fn evaluation_follows_the_routing() {
        // t0 = input; t1 = shr4 t0; t2 = plus t1 t0  (args: [t1, t0])
        let program = SynthesizedProgram {
            width: 64,
            insts: vec![
                Inst { opcode: Opcode::Input, args: [None; 3] },
                Inst { opcode: Opcode::Shr4, args: [Some(0), None, None] },
                Inst { opcode: Opcode::Plus, args: [Some(1), Some(0), None] },
            ],
        };
        for x in [0u64, 1, 0xffff, u64::MAX] {
            assert_eq!(program.eval(x), (x >> 4).wrapping_add(x));
        }
    }

    #[test]
    fn narrow_widths_mask_the_result() {
        let program = SynthesizedProgram {
            width: 8,
            insts: vec![
                Inst { opcode: Opcode::Input, args: [None; 3] },
                Inst { opcode: Opcode::Shl1, args: [Some(0), None, None] },
            ],
        };
        assert_eq!(program.eval(0xff), 0xfe);
        assert_eq!(program.eval(0x180), 0x00);
    }

    #[test]
    fn display_lists_one_slot_per_line() {
        let program = SynthesizedProgram {
            width: 64,
            insts: vec![
                Inst { opcode: Opcode::Input, args: [None; 3] },
                Inst { opcode: Opcode::Not, args: [Some(0), None, None] },
            ],
        };
        assert_eq!(program.to_string(), "t0 = input\nt1 = not t0\n");
    }
}
