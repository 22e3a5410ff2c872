//! Encoding an unknown straight-line ALU program as boolean constraints.
//!
//! [`alu`] builds one instruction slot's circuit, [`program`] wires slots
//! together and binds input/output examples, [`cegis`] runs the
//! counterexample-guided loop against an oracle.

pub mod alu;
pub mod cegis;
pub mod program;

pub use alu::{AluSlot, Opcode};
pub use cegis::{synthesize, CegisConfig, CegisResult};
pub use program::{Inst, Program, SynthesizedProgram};
