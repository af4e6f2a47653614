//! Stream writer for the abstract stack machine.
//!
//! [`InstructionEncoder`] is the sink a generator hands to a method-body callback. It validates
//! every instruction against the opcode table, tracks the evaluation stack depth, allocates
//! local slots symbolically by [`LocalPurpose`], and produces a [`MethodCode`] once the body
//! has been written.
//!
//! # Usage Examples
//!
//! ```rust
//! use dotforge::assembly::{InstructionEncoder, Operand};
//!
//! let mut encoder = InstructionEncoder::new();
//! encoder.emit_instruction("ldarg", Some(Operand::Argument(1)))?;
//! encoder.emit_instruction("ret", None)?;
//!
//! let code = encoder.finalize()?;
//! assert_eq!(code.instructions.len(), 2);
//! assert_eq!(code.max_stack, 1);
//! # Ok::<(), dotforge::Error>(())
//! ```

use std::{collections::HashMap, fmt, sync::OnceLock};

use log::trace;
use strum::IntoEnumIterator;

use crate::{
    assembly::{
        instruction::{
            FlowType, Instruction, LocalPurpose, LocalSlot, LocalType, LocalVariable, Operand,
        },
        opcodes::OpCode,
    },
    metadata::typesystem::{AdapterShape, CallableRef, TypeRef},
    Error, Result,
};

/// Reverse lookup table mapping mnemonics to opcodes.
static MNEMONIC_TO_OPCODE: OnceLock<HashMap<&'static str, OpCode>> = OnceLock::new();

fn get_mnemonic_lookup() -> &'static HashMap<&'static str, OpCode> {
    MNEMONIC_TO_OPCODE.get_or_init(|| OpCode::iter().map(|op| (op.mnemonic(), op)).collect())
}

/// A finished, validated method body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodCode {
    /// The linear instruction sequence, always ending in `ret`
    pub instructions: Vec<Instruction>,
    /// Declared locals, ordered by slot
    pub locals: Vec<LocalVariable>,
    /// Maximum evaluation stack depth reached
    pub max_stack: u16,
}

impl MethodCode {
    /// The slot allocated for `purpose`, if any.
    #[must_use]
    pub fn local(&self, purpose: LocalPurpose) -> Option<LocalSlot> {
        self.locals
            .iter()
            .find(|local| local.purpose == purpose)
            .map(|local| local.slot)
    }

    /// The opcodes of the body, in order.
    #[must_use]
    pub fn opcodes(&self) -> Vec<OpCode> {
        self.instructions.iter().map(|i| i.opcode).collect()
    }
}

impl fmt::Display for MethodCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, ".maxstack {}", self.max_stack)?;
        for local in &self.locals {
            writeln!(
                f,
                ".local {} {} ({})",
                local.slot, local.local_type, local.purpose
            )?;
        }
        for (offset, instruction) in self.instructions.iter().enumerate() {
            writeln!(f, "IL_{offset:04X}: {instruction}")?;
        }
        Ok(())
    }
}

/// Core stack-machine instruction writer.
///
/// # Thread Safety
///
/// [`InstructionEncoder`] holds mutable emission state. Create one per method body.
pub struct InstructionEncoder {
    /// Emitted instructions
    instructions: Vec<Instruction>,
    /// Declared locals, indexed by slot
    locals: Vec<LocalVariable>,
    /// Current stack depth (number of items on evaluation stack)
    current_stack_depth: u16,
    /// Maximum stack depth reached during encoding
    max_stack_depth: u16,
    /// Set once a `ret` was emitted; the body is a single basic block
    terminated: bool,
}

impl InstructionEncoder {
    /// Create a new, empty encoder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            instructions: Vec::new(),
            locals: Vec::new(),
            current_stack_depth: 0,
            max_stack_depth: 0,
            terminated: false,
        }
    }

    /// Emit a single instruction by mnemonic.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The mnemonic is not recognized
    /// - The operand doesn't match the instruction's expected operand type
    /// - The instruction would underflow the evaluation stack
    /// - The body already ended with `ret`
    pub fn emit_instruction(&mut self, mnemonic: &str, operand: Option<Operand>) -> Result<()> {
        let opcode = get_mnemonic_lookup()
            .get(mnemonic)
            .copied()
            .ok_or_else(|| Error::InvalidMnemonic(mnemonic.to_string()))?;

        let info = opcode.info();
        self.push_instruction(opcode, operand, info.stack_pops, info.stack_pushes)
    }

    /// Emit a call-like instruction with a caller-provided stack effect.
    ///
    /// # Arguments
    ///
    /// * `mnemonic` - The call instruction
    /// * `operand` - The callable operand
    /// * `num_args` - Values popped from the stack
    /// * `has_result` - Whether the call pushes a result
    ///
    /// # Errors
    ///
    /// Same as [`InstructionEncoder::emit_instruction`], and additionally if the mnemonic is
    /// not a call instruction.
    pub fn emit_call(
        &mut self,
        mnemonic: &str,
        operand: Option<Operand>,
        num_args: u8,
        has_result: bool,
    ) -> Result<()> {
        let opcode = get_mnemonic_lookup()
            .get(mnemonic)
            .copied()
            .ok_or_else(|| Error::InvalidMnemonic(mnemonic.to_string()))?;

        if opcode.info().flow != FlowType::Call {
            return Err(malformed_error!(
                "instruction '{}' is not a call instruction",
                mnemonic
            ));
        }

        let pushes = u8::from(has_result);
        self.push_instruction(opcode, operand, num_args, pushes)
    }

    fn push_instruction(
        &mut self,
        opcode: OpCode,
        operand: Option<Operand>,
        pops: u8,
        pushes: u8,
    ) -> Result<()> {
        let info = opcode.info();

        if self.terminated {
            return Err(malformed_error!(
                "instruction '{}' emitted after ret",
                info.mnemonic
            ));
        }

        let operand = operand.unwrap_or(Operand::None);
        if operand.kind() != info.operand {
            return Err(Error::InvalidOperand {
                mnemonic: info.mnemonic,
                expected: info.operand.describe(),
            });
        }

        if let Operand::Local(slot) = &operand {
            if usize::from(slot.index()) >= self.locals.len() {
                return Err(malformed_error!(
                    "local slot {} used by '{}' was never declared",
                    slot,
                    info.mnemonic
                ));
            }
        }

        self.update_stack_depth(info.mnemonic, pops, pushes)?;

        if info.flow == FlowType::Return {
            self.terminated = true;
        }

        let instruction = Instruction { opcode, operand };
        trace!("emit {instruction}");
        self.instructions.push(instruction);
        Ok(())
    }

    fn update_stack_depth(&mut self, mnemonic: &'static str, pops: u8, pushes: u8) -> Result<()> {
        let pops = u16::from(pops);
        if pops > self.current_stack_depth {
            return Err(Error::StackUnderflow {
                mnemonic,
                depth: self.current_stack_depth,
            });
        }

        self.current_stack_depth = self.current_stack_depth - pops + u16::from(pushes);
        self.max_stack_depth = self.max_stack_depth.max(self.current_stack_depth);
        Ok(())
    }

    /// Declare a local for `purpose`, or return the slot already allocated for it.
    ///
    /// Slots are numbered in declaration order. Re-declaring a purpose keeps the original
    /// slot and type.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Malformed`] if the slot count exceeds `u16`.
    pub fn declare_local(&mut self, purpose: LocalPurpose, local_type: LocalType) -> Result<LocalSlot> {
        if let Some(slot) = self.local(purpose) {
            return Ok(slot);
        }

        let index = u16::try_from(self.locals.len())
            .map_err(|_| malformed_error!("Local slot count exceeds u16 range"))?;
        let slot = LocalSlot(index);
        trace!("declare local {slot} ({purpose}): {local_type}");
        self.locals.push(LocalVariable {
            slot,
            purpose,
            local_type,
        });
        Ok(slot)
    }

    /// The slot allocated for `purpose`, if declared.
    #[must_use]
    pub fn local(&self, purpose: LocalPurpose) -> Option<LocalSlot> {
        self.locals
            .iter()
            .find(|local| local.purpose == purpose)
            .map(|local| local.slot)
    }

    /// Emit `nop`.
    ///
    /// # Errors
    /// See [`InstructionEncoder::emit_instruction`].
    pub fn emit_nop(&mut self) -> Result<()> {
        self.emit_instruction("nop", None)
    }

    /// Emit `ldnull`.
    ///
    /// # Errors
    /// See [`InstructionEncoder::emit_instruction`].
    pub fn emit_ldnull(&mut self) -> Result<()> {
        self.emit_instruction("ldnull", None)
    }

    /// Emit `ldc.i4 value`.
    ///
    /// # Errors
    /// See [`InstructionEncoder::emit_instruction`].
    pub fn emit_ldc_i4(&mut self, value: i32) -> Result<()> {
        self.emit_instruction("ldc.i4", Some(Operand::Int32(value)))
    }

    /// Emit `ldarg index`.
    ///
    /// # Errors
    /// See [`InstructionEncoder::emit_instruction`].
    pub fn emit_ldarg(&mut self, index: u16) -> Result<()> {
        self.emit_instruction("ldarg", Some(Operand::Argument(index)))
    }

    /// Emit `ldloc slot`.
    ///
    /// # Errors
    /// See [`InstructionEncoder::emit_instruction`].
    pub fn emit_ldloc(&mut self, slot: LocalSlot) -> Result<()> {
        self.emit_instruction("ldloc", Some(Operand::Local(slot)))
    }

    /// Emit `stloc slot`.
    ///
    /// # Errors
    /// See [`InstructionEncoder::emit_instruction`].
    pub fn emit_stloc(&mut self, slot: LocalSlot) -> Result<()> {
        self.emit_instruction("stloc", Some(Operand::Local(slot)))
    }

    /// Emit `ldftn callable`.
    ///
    /// # Errors
    /// See [`InstructionEncoder::emit_instruction`].
    pub fn emit_ldftn(&mut self, callable: CallableRef) -> Result<()> {
        self.emit_instruction("ldftn", Some(Operand::Callable(callable)))
    }

    /// Emit `newobj` for an adapter of the given shape.
    ///
    /// # Errors
    /// See [`InstructionEncoder::emit_instruction`].
    pub fn emit_newobj_adapter(&mut self, shape: AdapterShape) -> Result<()> {
        self.emit_instruction("newobj", Some(Operand::Adapter(shape)))
    }

    /// Emit `newarr element`.
    ///
    /// # Errors
    /// See [`InstructionEncoder::emit_instruction`].
    pub fn emit_newarr(&mut self, element: TypeRef) -> Result<()> {
        self.emit_instruction("newarr", Some(Operand::Type(element)))
    }

    /// Emit `box ty`.
    ///
    /// # Errors
    /// See [`InstructionEncoder::emit_instruction`].
    pub fn emit_box(&mut self, ty: TypeRef) -> Result<()> {
        self.emit_instruction("box", Some(Operand::Type(ty)))
    }

    /// Emit `stelem.ref`.
    ///
    /// # Errors
    /// See [`InstructionEncoder::emit_instruction`].
    pub fn emit_stelem_ref(&mut self) -> Result<()> {
        self.emit_instruction("stelem.ref", None)
    }

    /// Emit a late-bound `invoke.late callable`, popping receiver and argument array.
    ///
    /// # Errors
    /// See [`InstructionEncoder::emit_call`].
    pub fn emit_invoke_late(&mut self, callable: CallableRef, returns_value: bool) -> Result<()> {
        self.emit_call(
            "invoke.late",
            Some(Operand::Callable(callable)),
            2,
            returns_value,
        )
    }

    /// Emit `ret`.
    ///
    /// # Errors
    /// See [`InstructionEncoder::emit_instruction`].
    pub fn emit_ret(&mut self) -> Result<()> {
        self.emit_instruction("ret", None)
    }

    /// Number of instructions emitted so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// Returns `true` if nothing has been emitted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Get the current stack depth.
    #[must_use]
    pub fn current_stack_depth(&self) -> u16 {
        self.current_stack_depth
    }

    /// Get the maximum stack depth reached so far.
    #[must_use]
    pub fn max_stack_depth(&self) -> u16 {
        self.max_stack_depth
    }

    /// Finish the body.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Malformed`] if the body does not end in `ret`.
    pub fn finalize(self) -> Result<MethodCode> {
        if !self.terminated {
            return Err(malformed_error!("method body does not end in ret"));
        }

        Ok(MethodCode {
            instructions: self.instructions,
            locals: self.locals,
            max_stack: self.max_stack_depth,
        })
    }
}

impl Default for InstructionEncoder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembly::OperandType;

    #[test]
    fn test_encoder_creation() {
        let encoder = InstructionEncoder::new();
        assert!(encoder.is_empty());
        assert_eq!(encoder.current_stack_depth(), 0);
    }

    #[test]
    fn test_simple_instruction_encoding() -> Result<()> {
        let mut encoder = InstructionEncoder::new();

        encoder.emit_instruction("nop", None)?;
        encoder.emit_instruction("ldc.i4", Some(Operand::Int32(7)))?;
        encoder.emit_instruction("ret", None)?;

        let code = encoder.finalize()?;
        assert_eq!(code.opcodes(), vec![OpCode::Nop, OpCode::LdcI4, OpCode::Ret]);
        assert_eq!(code.max_stack, 1);

        Ok(())
    }

    #[test]
    fn test_invalid_mnemonic() {
        let mut encoder = InstructionEncoder::new();
        let result = encoder.emit_instruction("invalid_instruction", None);
        assert!(matches!(result, Err(Error::InvalidMnemonic(_))));
    }

    #[test]
    fn test_wrong_operand_type() {
        let mut encoder = InstructionEncoder::new();
        let result = encoder.emit_instruction("ldarg", Some(Operand::Int32(1)));
        assert!(matches!(result, Err(Error::InvalidOperand { .. })));

        let result = encoder.emit_instruction("ldarg", None);
        assert!(matches!(result, Err(Error::InvalidOperand { .. })));
    }

    #[test]
    fn test_stack_underflow() {
        let mut encoder = InstructionEncoder::new();
        let result = encoder.emit_stelem_ref();
        assert!(matches!(
            result,
            Err(Error::StackUnderflow {
                mnemonic: "stelem.ref",
                depth: 0
            })
        ));
    }

    #[test]
    fn test_missing_ret() -> Result<()> {
        let mut encoder = InstructionEncoder::new();
        encoder.emit_ldnull()?;
        assert!(encoder.finalize().is_err());
        Ok(())
    }

    #[test]
    fn test_emit_after_ret() -> Result<()> {
        let mut encoder = InstructionEncoder::new();
        encoder.emit_ret()?;
        assert!(encoder.emit_instruction("nop", None).is_err());
        Ok(())
    }

    #[test]
    fn test_locals_by_purpose() -> Result<()> {
        let object = TypeRef::new("System.Object");
        let mut encoder = InstructionEncoder::new();

        let args = encoder.declare_local(LocalPurpose::Arguments, LocalType::Array(object.clone()))?;
        let again = encoder.declare_local(LocalPurpose::Arguments, LocalType::Value(object))?;
        assert_eq!(args, again);
        assert_eq!(args, LocalSlot(0));

        let adapter = encoder.declare_local(
            LocalPurpose::Adapter,
            LocalType::Adapter(AdapterShape::Action {
                parameters: Vec::new(),
            }),
        )?;
        assert_eq!(adapter, LocalSlot(1));

        encoder.emit_ldnull()?;
        encoder.emit_stloc(adapter)?;
        encoder.emit_ret()?;

        let code = encoder.finalize()?;
        assert_eq!(code.locals.len(), 2);
        assert_eq!(code.local(LocalPurpose::Adapter), Some(LocalSlot(1)));
        assert!(matches!(code.locals[0].local_type, LocalType::Array(_)));
        Ok(())
    }

    #[test]
    fn test_undeclared_local() {
        let mut encoder = InstructionEncoder::new();
        let result = encoder.emit_ldloc(LocalSlot(3));
        assert!(result.is_err());
    }

    #[test]
    fn test_call_stack_effect() -> Result<()> {
        let mut encoder = InstructionEncoder::new();
        encoder.emit_ldnull()?;
        encoder.emit_ldnull()?;
        encoder.emit_invoke_late(CallableRef::new("f"), true)?;
        assert_eq!(encoder.current_stack_depth(), 1);
        assert_eq!(encoder.max_stack_depth(), 2);

        let result = encoder.emit_call("ldnull", None, 0, true);
        assert!(result.is_err());
        Ok(())
    }

    #[test]
    fn test_listing() -> Result<()> {
        let mut encoder = InstructionEncoder::new();
        encoder.emit_ldarg(1)?;
        encoder.emit_ret()?;
        let listing = encoder.finalize()?.to_string();
        assert!(listing.contains("IL_0000: ldarg 1"));
        assert!(listing.contains("IL_0001: ret"));
        Ok(())
    }

    #[test]
    fn test_reverse_lookup_table_completeness() {
        for op in OpCode::iter() {
            assert_eq!(get_mnemonic_lookup().get(op.mnemonic()), Some(&op));
        }
    }

    #[test]
    fn test_operand_type_describe() {
        assert_eq!(OperandType::Local.describe(), "a local slot");
    }
}
