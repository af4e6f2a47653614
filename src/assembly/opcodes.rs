//! Opcode table for the abstract stack machine.
//!
//! Each [`OpCode`] carries static metadata: its mnemonic, the operand kind it expects, its
//! fixed stack effect and its flow behavior. `invoke.late` has a variable push count that is
//! supplied at emission time.

use strum::{EnumCount, EnumIter};

use crate::assembly::instruction::{FlowType, OperandType};

/// Static metadata describing one opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpCodeInfo {
    /// Textual mnemonic
    pub mnemonic: &'static str,
    /// Expected operand kind
    pub operand: OperandType,
    /// Values popped from the evaluation stack
    pub stack_pops: u8,
    /// Values pushed onto the evaluation stack
    pub stack_pushes: u8,
    /// Control flow behavior
    pub flow: FlowType,
}

/// Instruction set of the abstract stack machine.
///
/// The machine offers an operand stack, indexed argument slots (slot 0 is the implicit
/// receiver of instance methods), indexed local slots, and untyped heap arrays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumCount)]
pub enum OpCode {
    /// Do nothing
    Nop,
    /// Push a null reference
    Ldnull,
    /// Push a 32-bit integer constant
    LdcI4,
    /// Push the value of an argument slot
    Ldarg,
    /// Push the value of a local slot
    Ldloc,
    /// Pop into a local slot
    Stloc,
    /// Push a function pointer to a callable
    Ldftn,
    /// Pop a function pointer, push a bound adapter object wrapping it
    Newobj,
    /// Pop a length, push a new reference-typed array
    Newarr,
    /// Pop a value-type value, push its boxed object
    Box,
    /// Pop array, index and value; store the value at the index
    StelemRef,
    /// Pop receiver and packed argument array; late-bound invoke of a callable
    InvokeLate,
    /// Return from the method, the value on the stack (if any) is the result
    Ret,
}

impl OpCode {
    /// Static metadata for the opcode.
    #[must_use]
    pub const fn info(&self) -> OpCodeInfo {
        const fn op(
            mnemonic: &'static str,
            operand: OperandType,
            stack_pops: u8,
            stack_pushes: u8,
            flow: FlowType,
        ) -> OpCodeInfo {
            OpCodeInfo {
                mnemonic,
                operand,
                stack_pops,
                stack_pushes,
                flow,
            }
        }

        match self {
            OpCode::Nop => op("nop", OperandType::None, 0, 0, FlowType::Sequential),
            OpCode::Ldnull => op("ldnull", OperandType::None, 0, 1, FlowType::Sequential),
            OpCode::LdcI4 => op("ldc.i4", OperandType::Int32, 0, 1, FlowType::Sequential),
            OpCode::Ldarg => op("ldarg", OperandType::Argument, 0, 1, FlowType::Sequential),
            OpCode::Ldloc => op("ldloc", OperandType::Local, 0, 1, FlowType::Sequential),
            OpCode::Stloc => op("stloc", OperandType::Local, 1, 0, FlowType::Sequential),
            OpCode::Ldftn => op("ldftn", OperandType::Callable, 0, 1, FlowType::Sequential),
            OpCode::Newobj => op("newobj", OperandType::Adapter, 1, 1, FlowType::Call),
            OpCode::Newarr => op("newarr", OperandType::Type, 1, 1, FlowType::Sequential),
            OpCode::Box => op("box", OperandType::Type, 1, 1, FlowType::Sequential),
            OpCode::StelemRef => op("stelem.ref", OperandType::None, 3, 0, FlowType::Sequential),
            // Push count depends on the callable, see InstructionEncoder::emit_call
            OpCode::InvokeLate => op("invoke.late", OperandType::Callable, 2, 0, FlowType::Call),
            OpCode::Ret => op("ret", OperandType::None, 0, 0, FlowType::Return),
        }
    }

    /// Textual mnemonic.
    #[must_use]
    pub const fn mnemonic(&self) -> &'static str {
        self.info().mnemonic
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use strum::IntoEnumIterator;

    #[test]
    fn test_mnemonics_unique() {
        let set: HashSet<&str> = OpCode::iter().map(|op| op.mnemonic()).collect();
        assert_eq!(set.len(), OpCode::COUNT);
    }

    #[test]
    fn test_stack_effects() {
        assert_eq!(OpCode::StelemRef.info().stack_pops, 3);
        assert_eq!(OpCode::Ldnull.info().stack_pushes, 1);
        assert_eq!(OpCode::Ret.info().flow, FlowType::Return);
    }
}
