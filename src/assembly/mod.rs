//! Abstract stack-machine instruction set and stream writer.
//!
//! Method bodies are written as a linear sequence of [`Instruction`]s over a machine with an
//! operand stack, indexed argument slots, symbolically allocated local slots and untyped heap
//! arrays. The [`InstructionEncoder`] is the writer handed to body callbacks; a generator
//! consumes the resulting [`MethodCode`].
//!
//! # Key Components
//!
//! - [`OpCode`] / [`OpCodeInfo`] - Opcode table with stack effects
//! - [`Instruction`] / [`Operand`] - Emitted instructions
//! - [`InstructionEncoder`] - Validating stream writer
//! - [`MethodCode`] - Finished body with locals and max stack

mod encoder;
mod instruction;
mod opcodes;

pub use encoder::{InstructionEncoder, MethodCode};
pub use instruction::{
    FlowType, Instruction, LocalPurpose, LocalSlot, LocalType, LocalVariable, Operand,
    OperandType,
};
pub use opcodes::{OpCode, OpCodeInfo};
