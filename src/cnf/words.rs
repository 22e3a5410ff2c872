//! Lane-wise encodings over fixed-width words of literals.
//!
//! A [`Word`] is a vector of literals, lane 0 least significant. All
//! builders require equal widths and panic on a mismatch; that is a bug in
//! the caller, not a recoverable condition.

use super::problem::Problem;
use super::types::Lit;

/// Word width used by the synthesizer. The encoders themselves are
/// width-generic; tests use narrower words to keep enumeration cheap.
pub const WORD_WIDTH: usize = 64;

/// A fixed-width vector of literals, least-significant lane first.
pub type Word = Vec<Lit>;

/// A word of constant literals carrying `value`, truncated to `width`.
pub fn word_from_u64(value: u64, width: usize) -> Word {
    assert!(width <= 64, "word width {} exceeds 64", width);
    (0..width).map(|i| Lit::from_bool(value >> i & 1 == 1)).collect()
}

/// The all-false word.
pub fn zero_word(width: usize) -> Word {
    vec![Lit::False; width]
}

/// Lane-wise negation. Free: literal polarity flips need no clauses.
pub fn word_not(a: &[Lit]) -> Word {
    a.iter().map(|&l| !l).collect()
}

/// Logical shift by `n` lanes: positive toward higher indices (left),
/// negative toward lower (right). Lanes shifted in are constant false; no
/// clauses are emitted.
pub fn shift(a: &[Lit], n: i32) -> Word {
    let width = a.len() as i32;
    (0..width)
        .map(|i| {
            let src = i - n;
            if (0..width).contains(&src) {
                a[src as usize]
            } else {
                Lit::False
            }
        })
        .collect()
}

fn check_widths(a: &[Lit], b: &[Lit]) {
    assert_eq!(a.len(), b.len(), "word width mismatch: {} vs {}", a.len(), b.len());
}

impl Problem {
    /// A word of fresh variables.
    pub fn mk_word(&mut self, width: usize) -> Word {
        self.mk_vars(width).into_iter().map(Lit::from).collect()
    }

    /// Lane-wise AND.
    pub fn mk_andn(&mut self, a: &[Lit], b: &[Lit]) -> Word {
        check_widths(a, b);
        a.iter().zip(b).map(|(&x, &y)| self.mk_and(&[x, y])).collect()
    }

    /// Lane-wise OR.
    pub fn mk_orn(&mut self, a: &[Lit], b: &[Lit]) -> Word {
        check_widths(a, b);
        a.iter().zip(b).map(|(&x, &y)| self.mk_or(&[x, y])).collect()
    }

    /// Lane-wise XOR.
    pub fn mk_xorn(&mut self, a: &[Lit], b: &[Lit]) -> Word {
        check_widths(a, b);
        a.iter().zip(b).map(|(&x, &y)| self.mk_xor(&[x, y])).collect()
    }

    /// Word-level MUX with one shared selector: `a` when `ctl` is false,
    /// `b` when true.
    pub fn mk_muxn(&mut self, ctl: Lit, a: &[Lit], b: &[Lit]) -> Word {
        check_widths(a, b);
        a.iter().zip(b).map(|(&x, &y)| self.mk_mux(ctl, x, y)).collect()
    }

    /// Word-level MUX with one selector per lane: lane i is `a[i]` when
    /// `ctl[i]` is false and `b[i]` when true. This is the conditional
    /// bit-select the ALU's three-input opcode uses.
    pub fn mk_muxnn(&mut self, ctl: &[Lit], a: &[Lit], b: &[Lit]) -> Word {
        check_widths(ctl, a);
        check_widths(a, b);
        ctl.iter()
            .zip(a.iter().zip(b))
            .map(|(&c, (&x, &y))| self.mk_mux(c, x, y))
            .collect()
    }

    /// `ctl -> (a == b)` lane by lane.
    pub fn eqn_if(&mut self, ctl: Lit, a: &[Lit], b: &[Lit]) {
        check_widths(a, b);
        for (&x, &y) in a.iter().zip(b) {
            self.eq_if(ctl, x, y);
        }
    }

    /// Ripple-carry addition: per lane, `sum = xor(a, b, carry_in)` and
    /// `carry_out = or(and(a, b), and(b, carry_in), and(carry_in, a))`.
    /// The final carry is discarded: arithmetic is modulo 2^width and
    /// overflow silently wraps.
    pub fn mk_ripplecarry(&mut self, a: &[Lit], b: &[Lit]) -> Word {
        check_widths(a, b);
        let mut carry = Lit::False;
        let mut sum = Word::with_capacity(a.len());
        for (&x, &y) in a.iter().zip(b) {
            sum.push(self.mk_xor(&[x, y, carry]));
            let ab = self.mk_and(&[x, y]);
            let bc = self.mk_and(&[y, carry]);
            let ca = self.mk_and(&[carry, x]);
            carry = self.mk_or(&[ab, bc, ca]);
        }
        sum
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cnf::test_support::{propagate, word_value};
    use crate::cnf::Var;

    fn assume_word(word: &[Lit], value: u64) -> Vec<(Var, bool)> {
        word.iter()
            .enumerate()
            .map(|(i, l)| (l.var().unwrap(), value >> i & 1 == 1))
            .collect()
    }

    /// Evaluate a two-input word circuit under constant inputs by unit
    /// propagation; the Tseitin clauses force every gate output.
    fn eval_binary(
        width: usize,
        build: impl Fn(&mut Problem, &[Lit], &[Lit]) -> Word,
        a: u64,
        b: u64,
    ) -> u64 {
        let mut p = Problem::new();
        let wa = p.mk_word(width);
        let wb = p.mk_word(width);
        let out = build(&mut p, &wa, &wb);
        let mut assumptions = assume_word(&wa, a);
        assumptions.extend(assume_word(&wb, b));
        let assignment = propagate(&p, &assumptions).expect("circuit conflicts on constants");
        word_value(&assignment, &out)
    }

    #[test]
    fn ripplecarry_is_wrapping_add_exhaustive() {
        for width in 1..=6 {
            let mask = (1u64 << width) - 1;
            let mut p = Problem::new();
            let wa = p.mk_word(width);
            let wb = p.mk_word(width);
            let sum = p.mk_ripplecarry(&wa, &wb);
            for a in 0..=mask {
                for b in 0..=mask {
                    let mut assumptions = assume_word(&wa, a);
                    assumptions.extend(assume_word(&wb, b));
                    let assignment = propagate(&p, &assumptions).expect("adder conflict");
                    assert_eq!(
                        word_value(&assignment, &sum),
                        a.wrapping_add(b) & mask,
                        "width {} a {} b {}",
                        width,
                        a,
                        b
                    );
                }
            }
        }
    }

    #[test]
    fn ripplecarry_wraps_at_wider_widths() {
        for width in 7..=8 {
            let mask = (1u64 << width) - 1;
            // Deterministic sample including the overflow corners.
            let samples = [0, 1, 2, 3, mask, mask - 1, mask / 2, mask / 2 + 1, 0x55 & mask, 0xaa & mask];
            for &a in &samples {
                for &b in &samples {
                    assert_eq!(
                        eval_binary(width, |p, x, y| p.mk_ripplecarry(x, y), a, b),
                        a.wrapping_add(b) & mask
                    );
                }
            }
        }
    }

    #[test]
    fn lane_wise_gates_match_integer_ops() {
        let cases = [(0b1100u64, 0b1010u64), (0xf, 0x0), (0x9, 0x9)];
        for &(a, b) in &cases {
            assert_eq!(eval_binary(4, |p, x, y| p.mk_andn(x, y), a, b), a & b);
            assert_eq!(eval_binary(4, |p, x, y| p.mk_orn(x, y), a, b), a | b);
            assert_eq!(eval_binary(4, |p, x, y| p.mk_xorn(x, y), a, b), a ^ b);
        }
    }

    #[test]
    fn muxn_selects_whole_words() {
        for ctl_value in [false, true] {
            let mut p = Problem::new();
            let ctl = Lit::from(p.mk_var());
            let wa = p.mk_word(4);
            let wb = p.mk_word(4);
            let out = p.mk_muxn(ctl, &wa, &wb);
            let mut assumptions = vec![(ctl.var().unwrap(), ctl_value)];
            assumptions.extend(assume_word(&wa, 0b0011));
            assumptions.extend(assume_word(&wb, 0b1100));
            let assignment = propagate(&p, &assumptions).unwrap();
            let expected = if ctl_value { 0b1100 } else { 0b0011 };
            assert_eq!(word_value(&assignment, &out), expected);
        }
    }

    #[test]
    fn muxnn_selects_per_lane() {
        let mut p = Problem::new();
        let ctl = p.mk_word(4);
        let wa = p.mk_word(4);
        let wb = p.mk_word(4);
        let out = p.mk_muxnn(&ctl, &wa, &wb);
        let mut assumptions = assume_word(&ctl, 0b0101);
        assumptions.extend(assume_word(&wa, 0b0011));
        assumptions.extend(assume_word(&wb, 0b1100));
        let assignment = propagate(&p, &assumptions).unwrap();
        // Lane i takes wb where ctl is set, wa elsewhere.
        assert_eq!(word_value(&assignment, &out), (0b1100 & 0b0101) | (0b0011 & !0b0101u64 & 0xf));
    }

    #[test]
    fn shift_fills_with_false() {
        let mut p = Problem::new();
        let w = p.mk_word(8);
        let left = shift(&w, 3);
        assert_eq!(&left[0..3], &[Lit::False; 3]);
        assert_eq!(left[3], w[0]);
        assert_eq!(left[7], w[4]);
        let right = shift(&w, -2);
        assert_eq!(right[0], w[2]);
        assert_eq!(&right[6..8], &[Lit::False; 2]);
    }

    #[test]
    fn shift_round_trip_zeroes_the_top_lanes() {
        let mut p = Problem::new();
        let w = p.mk_word(8);
        let round = shift(&shift(&w, 3), -3);
        assert_eq!(&round[0..5], &w[0..5]);
        assert_eq!(&round[5..8], &[Lit::False; 3]);
    }

    #[test]
    fn word_from_u64_orders_lanes_lo_to_hi() {
        let w = word_from_u64(0b1101, 4);
        assert_eq!(w, vec![Lit::True, Lit::False, Lit::True, Lit::True]);
    }

    #[test]
    #[should_panic(expected = "width mismatch")]
    fn mismatched_widths_panic() {
        let mut p = Problem::new();
        let a = p.mk_word(4);
        let b = p.mk_word(5);
        p.mk_andn(&a, &b);
    }
}
