//! Instruction representation and operand types for the abstract stack machine.
//!
//! # Key Components
//!
//! - [`Instruction`] - An opcode with its operand
//! - [`Operand`] - Type-safe operand representation
//! - [`OperandType`] - The operand kind an opcode expects
//! - [`FlowType`] - Control flow behavior classification
//! - [`LocalSlot`] / [`LocalPurpose`] / [`LocalVariable`] - Symbolic local allocation

use std::fmt;

use strum::{Display, EnumIter};

use crate::{
    assembly::opcodes::OpCode,
    metadata::typesystem::{AdapterShape, CallableRef, TypeRef},
};

/// Types of operands for stack-machine instructions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandType {
    /// No operand present
    None,
    /// Signed 32-bit integer
    Int32,
    /// Argument slot index
    Argument,
    /// Local slot
    Local,
    /// Type handle
    Type,
    /// Callable handle
    Callable,
    /// Adapter shape
    Adapter,
}

impl OperandType {
    /// Human readable description, used in error messages.
    #[must_use]
    pub const fn describe(&self) -> &'static str {
        match self {
            OperandType::None => "no operand",
            OperandType::Int32 => "an int32 immediate",
            OperandType::Argument => "an argument index",
            OperandType::Local => "a local slot",
            OperandType::Type => "a type",
            OperandType::Callable => "a callable",
            OperandType::Adapter => "an adapter shape",
        }
    }
}

/// Operand attached to an [`Instruction`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    /// No operand
    None,
    /// 32-bit immediate
    Int32(i32),
    /// Argument slot index (0 is the implicit receiver of instance methods)
    Argument(u16),
    /// Local slot
    Local(LocalSlot),
    /// Type handle (array element type, box type)
    Type(TypeRef),
    /// Callable handle (function pointer load, late-bound dispatch)
    Callable(CallableRef),
    /// Adapter shape whose constructor is invoked
    Adapter(AdapterShape),
}

impl Operand {
    /// The operand kind.
    #[must_use]
    pub fn kind(&self) -> OperandType {
        match self {
            Operand::None => OperandType::None,
            Operand::Int32(_) => OperandType::Int32,
            Operand::Argument(_) => OperandType::Argument,
            Operand::Local(_) => OperandType::Local,
            Operand::Type(_) => OperandType::Type,
            Operand::Callable(_) => OperandType::Callable,
            Operand::Adapter(_) => OperandType::Adapter,
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::None => Ok(()),
            Operand::Int32(value) => write!(f, "{value}"),
            Operand::Argument(index) => write!(f, "{index}"),
            Operand::Local(slot) => write!(f, "{slot}"),
            Operand::Type(ty) => write!(f, "{ty}"),
            Operand::Callable(callable) => write!(f, "{callable}"),
            Operand::Adapter(shape) => write!(f, "{shape}::.ctor"),
        }
    }
}

/// Control flow behavior of an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowType {
    /// Falls through to the next instruction
    Sequential,
    /// Invokes code and falls through
    Call,
    /// Leaves the method
    Return,
}

/// A single emitted instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    /// The opcode
    pub opcode: OpCode,
    /// The operand, [`Operand::None`] if the opcode takes none
    pub operand: Operand,
}

impl Instruction {
    /// The instruction mnemonic.
    #[must_use]
    pub fn mnemonic(&self) -> &'static str {
        self.opcode.mnemonic()
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if matches!(self.operand, Operand::None) {
            f.write_str(self.mnemonic())
        } else {
            write!(f, "{} {}", self.mnemonic(), self.operand)
        }
    }
}

/// Index of a local slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LocalSlot(pub u16);

impl LocalSlot {
    /// The raw slot index.
    #[must_use]
    pub fn index(self) -> u16 {
        self.0
    }
}

impl fmt::Display for LocalSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "V_{}", self.0)
    }
}

/// What a local slot is used for.
///
/// Slots are allocated by purpose, not by position, so new purposes can be added without
/// renumbering existing ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, Display)]
pub enum LocalPurpose {
    /// Holds the bound receiver adapter
    #[strum(serialize = "adapter")]
    Adapter,
    /// Holds the packed argument array
    #[strum(serialize = "arguments")]
    Arguments,
}

/// Declared type of a local slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocalType {
    /// An adapter object of the given shape
    Adapter(AdapterShape),
    /// A single-dimension array of the element type
    Array(TypeRef),
    /// A plain value of the given type
    Value(TypeRef),
}

impl fmt::Display for LocalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocalType::Adapter(shape) => write!(f, "{shape}"),
            LocalType::Array(element) => write!(f, "{element}[]"),
            LocalType::Value(ty) => write!(f, "{ty}"),
        }
    }
}

/// A declared local variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalVariable {
    /// Allocated slot
    pub slot: LocalSlot,
    /// What the slot is used for
    pub purpose: LocalPurpose,
    /// Declared type
    pub local_type: LocalType,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instruction_display() {
        let ldarg = Instruction {
            opcode: OpCode::Ldarg,
            operand: Operand::Argument(2),
        };
        assert_eq!(ldarg.to_string(), "ldarg 2");

        let ret = Instruction {
            opcode: OpCode::Ret,
            operand: Operand::None,
        };
        assert_eq!(ret.to_string(), "ret");

        let stloc = Instruction {
            opcode: OpCode::Stloc,
            operand: Operand::Local(LocalSlot(1)),
        };
        assert_eq!(stloc.to_string(), "stloc V_1");
    }

    #[test]
    fn test_operand_kind() {
        assert_eq!(Operand::Int32(3).kind(), OperandType::Int32);
        assert_eq!(
            Operand::Type(TypeRef::new("System.Object")).kind(),
            OperandType::Type
        );
        assert_eq!(LocalPurpose::Arguments.to_string(), "arguments");
    }
}
