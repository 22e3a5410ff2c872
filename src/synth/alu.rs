//! One instruction slot: a 5-bit opcode selector over word-level
//! operations, built entirely from the gate and word encoders.
//!
//! `ctl[0]` is the constant payload bit; `ctl[1..=4]` form the opcode
//! nibble `op0..op3`:
//!
//! ```text
//! op3 op2 op1 op0   opcode
//!  0   0   0   0    constant (value = payload)
//!  0   0   0   1    pass-through of the program input
//!  0   0   1   0    bitwise not
//!  0   0   1   1    undefined
//!  0   1   n   n    shl1, shr1, shr4, shr16
//!  1   0   n   n    and, or, xor, plus
//!  1   1   0   0    sel (per-lane conditional select)
//!  1   1   0   1    undefined
//!  1   1   1   x    undefined
//! ```
//!
//! Undefined patterns are excluded by blocking clauses, so a satisfying
//! assignment can never select one; the payload bit is likewise forced
//! false for every non-constant opcode.

use std::fmt;

use crate::cnf::words::{shift, word_not, zero_word, Word};
use crate::cnf::{Lit, Problem};
use crate::solver::Solution;

/// Control bits per slot: the payload bit plus the opcode nibble.
pub const CTL_BITS: usize = 5;

/// The closed instruction set. Arities and concrete semantics live here so
/// decoded programs can be evaluated without touching the encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    Const0,
    Const1,
    Input,
    Not,
    Shl1,
    Shr1,
    Shr4,
    Shr16,
    And,
    Or,
    Xor,
    Plus,
    Sel,
}

impl Opcode {
    /// How many routed inputs the instruction consumes.
    pub fn arity(self) -> usize {
        match self {
            Opcode::Const0 | Opcode::Const1 | Opcode::Input => 0,
            Opcode::Not | Opcode::Shl1 | Opcode::Shr1 | Opcode::Shr4 | Opcode::Shr16 => 1,
            Opcode::And | Opcode::Or | Opcode::Xor | Opcode::Plus => 2,
            Opcode::Sel => 3,
        }
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            Opcode::Const0 => "const0",
            Opcode::Const1 => "const1",
            Opcode::Input => "input",
            Opcode::Not => "not",
            Opcode::Shl1 => "shl1",
            Opcode::Shr1 => "shr1",
            Opcode::Shr4 => "shr4",
            Opcode::Shr16 => "shr16",
            Opcode::And => "and",
            Opcode::Or => "or",
            Opcode::Xor => "xor",
            Opcode::Plus => "plus",
            Opcode::Sel => "sel",
        }
    }

    /// Concrete semantics over 64-bit words; `x` is the program input,
    /// `a`/`b`/`c` the routed operands (zero where unused). `sel` picks
    /// `b` or `c` per lane depending on the matching lane of `a`.
    pub fn eval(self, x: u64, a: u64, b: u64, c: u64) -> u64 {
        match self {
            Opcode::Const0 => 0,
            Opcode::Const1 => 1,
            Opcode::Input => x,
            Opcode::Not => !a,
            Opcode::Shl1 => a << 1,
            Opcode::Shr1 => a >> 1,
            Opcode::Shr4 => a >> 4,
            Opcode::Shr16 => a >> 16,
            Opcode::And => a & b,
            Opcode::Or => a | b,
            Opcode::Xor => a ^ b,
            Opcode::Plus => a.wrapping_add(b),
            Opcode::Sel => (!a & b) | (a & c),
        }
    }

    /// Decode five control bit values (`[payload, op0..op3]`). `None` means
    /// the solver picked an excluded pattern, which the blocking clauses
    /// make impossible on any legal solution.
    pub fn from_ctl_bits(bits: &[bool]) -> Option<Opcode> {
        assert_eq!(bits.len(), CTL_BITS);
        let payload = bits[0];
        let nibble = bits[1..]
            .iter()
            .enumerate()
            .fold(0u8, |acc, (i, &b)| acc | (b as u8) << i);
        match (nibble, payload) {
            (0b0000, false) => Some(Opcode::Const0),
            (0b0000, true) => Some(Opcode::Const1),
            (0b0001, false) => Some(Opcode::Input),
            (0b0010, false) => Some(Opcode::Not),
            (0b0100, false) => Some(Opcode::Shl1),
            (0b0101, false) => Some(Opcode::Shr1),
            (0b0110, false) => Some(Opcode::Shr4),
            (0b0111, false) => Some(Opcode::Shr16),
            (0b1000, false) => Some(Opcode::And),
            (0b1001, false) => Some(Opcode::Or),
            (0b1010, false) => Some(Opcode::Xor),
            (0b1011, false) => Some(Opcode::Plus),
            (0b1100, false) => Some(Opcode::Sel),
            _ => None,
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

/// One slot's example-independent state: its control variables and the
/// input-enable flags derived from them. Data words are not owned here;
/// every example instantiates fresh ones against the shared controls.
#[derive(Debug, Clone)]
pub struct AluSlot {
    /// `[payload, op0, op1, op2, op3]`, all fresh variables.
    pub ctl: Vec<Lit>,
    /// Whether the slot consumes its first, second, third input; pure
    /// functions of the opcode bits.
    pub inenb: [Lit; 3],
}

/// Data words for one slot in one example.
#[derive(Debug, Clone)]
pub struct AluData {
    pub inputs: [Word; 3],
    pub out: Word,
}

impl AluSlot {
    pub fn new(prob: &mut Problem) -> AluSlot {
        let ctl: Vec<Lit> = prob.mk_vars(CTL_BITS).into_iter().map(Lit::from).collect();
        let payload = ctl[0];
        let (op0, op1, op2, op3) = (ctl[1], ctl[2], ctl[3], ctl[4]);

        // Undefined opcode patterns: 0011, 11x1, 111x.
        prob.implies(&[op0, op1, !op2, !op3], &[]);
        prob.implies(&[op0, op2, op3], &[]);
        prob.implies(&[op1, op2, op3], &[]);
        // The payload bit only means something for the constant opcode.
        for &op in &ctl[1..] {
            prob.implies(&[payload, op], &[]);
        }

        let inenb0 = prob.mk_or(&[op1, op2, op3]);
        let inenb1 = op3;
        let inenb2 = prob.mk_and(&[op2, op3]);

        AluSlot { ctl, inenb: [inenb0, inenb1, inenb2] }
    }

    /// Instantiate the slot's data path for one example: fresh input and
    /// output words, disabled inputs pinned to zero, and the opcode mux
    /// tree selecting among the candidate results. `x` is the example's
    /// program-input word.
    pub fn encode_data(&self, prob: &mut Problem, x: &[Lit]) -> AluData {
        let width = x.len();
        let in0 = prob.mk_word(width);
        let in1 = prob.mk_word(width);
        let in2 = prob.mk_word(width);

        // Disabled inputs are pinned to zero, never left floating.
        let zero = zero_word(width);
        prob.eqn_if(!self.inenb[0], &in0, &zero);
        prob.eqn_if(!self.inenb[1], &in1, &zero);
        prob.eqn_if(!self.inenb[2], &in2, &zero);

        let payload = self.ctl[0];
        let (op0, op1, op2, op3) = (self.ctl[1], self.ctl[2], self.ctl[3], self.ctl[4]);

        let mut tconst = zero_word(width);
        tconst[0] = payload;
        let tpass = x.to_vec();
        let tnot = word_not(&in0);
        let tshl1 = shift(&in0, 1);
        let tshr1 = shift(&in0, -1);
        let tshr4 = shift(&in0, -4);
        let tshr16 = shift(&in0, -16);
        let tand = prob.mk_andn(&in0, &in1);
        let tor = prob.mk_orn(&in0, &in1);
        let txor = prob.mk_xorn(&in0, &in1);
        let tplus = prob.mk_ripplecarry(&in0, &in1);
        let tsel = prob.mk_muxnn(&in0, &in1, &in2);

        // Opcode nibble as a mux tree, low bit innermost.
        let mcp = prob.mk_muxn(op0, &tconst, &tpass);
        let m00 = prob.mk_muxn(op1, &mcp, &tnot);
        let msh1 = prob.mk_muxn(op0, &tshl1, &tshr1);
        let mshr = prob.mk_muxn(op0, &tshr4, &tshr16);
        let msh = prob.mk_muxn(op1, &msh1, &mshr);
        let mao = prob.mk_muxn(op0, &tand, &tor);
        let mxp = prob.mk_muxn(op0, &txor, &tplus);
        let mop2 = prob.mk_muxn(op1, &mao, &mxp);
        let m0 = prob.mk_muxn(op2, &m00, &msh);
        let m1 = prob.mk_muxn(op2, &mop2, &tsel);
        let out = prob.mk_muxn(op3, &m0, &m1);

        AluData { inputs: [in0, in1, in2], out }
    }

    /// Read this slot's opcode out of a satisfying assignment.
    pub fn decode_opcode(&self, soln: &Solution) -> Opcode {
        let bits: Vec<bool> = self.ctl.iter().map(|&l| soln.lit(l)).collect();
        Opcode::from_ctl_bits(&bits)
            .expect("solver selected an opcode pattern the encoding excludes")
    }
}
