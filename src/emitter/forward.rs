//! Forwarding-thunk synthesis.
//!
//! [`BodyEmitter::forward`] turns "forward every argument to this callable" into a single
//! basic block over the abstract stack machine:
//!
//! ```text
//! receiver   ldnull                                   static callable (or unbound, if allowed)
//!            ldftn f; newobj A; stloc a; ldloc a      instance callable bound through adapter A
//! packing    ldc.i4 n; newarr object; stloc args
//!            ldloc args; ldc.i4 i-1; ldarg i; [box T]; stelem.ref     for i in 1..=n
//! dispatch   ldloc args; invoke.late f
//! return     ret
//! ```
//!
//! The receiver decision is made once, when the body is attached, and is exposed through
//! [`BodyEmitter::plan`].

use std::fmt;

use log::{trace, warn};

use crate::{
    assembly::{InstructionEncoder, LocalPurpose, LocalType},
    builders::{MethodBody, MethodDescriptor},
    emitter::{EmitterConfig, UnboundReceiver},
    metadata::typesystem::{
        AdapterShape, CallableRef, DeclaringType, PrimitiveKind, TypeInfoProviderRc, TypeRef,
    },
    Result,
};

/// How the dispatch receiver of a forwarding body is obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdapterOutcome {
    /// Static callable, the receiver is null
    Static,
    /// Instance callable bound through a freshly constructed adapter of this shape
    AdapterConstructed(AdapterShape),
    /// Instance callable whose declaring shape does not match the required adapter shape
    AdapterSkipped {
        /// Shape derived from the method's parameters and the callable's return kind
        required: AdapterShape,
        /// Where the callable is actually declared
        declared: DeclaringType,
    },
}

impl fmt::Display for AdapterOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdapterOutcome::Static => f.write_str("static"),
            AdapterOutcome::AdapterConstructed(shape) => write!(f, "adapter {shape}"),
            AdapterOutcome::AdapterSkipped { required, declared } => {
                let declared = match declared {
                    DeclaringType::Type(ty) => ty.to_string(),
                    DeclaringType::Adapter(shape) => shape.to_string(),
                };
                write!(f, "skipped (requires {required}, declared on {declared})")
            }
        }
    }
}

/// The decisions behind a forwarding body, computed before anything is attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardPlan {
    /// The dispatch target
    pub callable: CallableRef,
    /// Receiver decision
    pub outcome: AdapterOutcome,
    /// Declared parameter types of the forwarding method
    pub parameters: Vec<TypeRef>,
    /// Whether dispatch leaves a result on the stack
    pub returns_value: bool,
}

/// Synthesizes and attaches method bodies.
///
/// # Examples
///
/// ```rust
/// use dotforge::prelude::*;
/// use std::sync::Arc;
///
/// let mut registry = TypeRegistry::new();
/// let int = registry.primitive(PrimitiveKind::I4);
/// let square = registry.callable(CallableInfo::adapter_invoke(
///     "square",
///     vec![int.clone()],
///     ReturnKind::Value(int.clone()),
/// ));
/// let provider: TypeInfoProviderRc = Arc::new(registry);
///
/// let emitter = BodyEmitter::new(provider.clone());
/// let mut ty = TypeDescriptor::new(provider);
/// let id = ty
///     .declare_method(
///         Some("Square"),
///         Some(ReturnKind::Value(int.clone())),
///         Some(vec![ParameterDescriptor::new("x", int)?]),
///     )?
///     .id();
///
/// let method = ty.method_mut(id);
/// emitter.forward(method, &square)?;
///
/// let code = ty.methods()[0].build_body()?;
/// println!("{code}");
/// assert_eq!(code.instructions.last().map(|i| i.opcode), Some(OpCode::Ret));
/// # Ok::<(), dotforge::Error>(())
/// ```
pub struct BodyEmitter {
    provider: TypeInfoProviderRc,
    config: EmitterConfig,
}

impl BodyEmitter {
    /// Create an emitter with the default configuration.
    #[must_use]
    pub fn new(provider: TypeInfoProviderRc) -> Self {
        Self::with_config(provider, EmitterConfig::default())
    }

    /// Create an emitter with an explicit configuration.
    #[must_use]
    pub fn with_config(provider: TypeInfoProviderRc, config: EmitterConfig) -> Self {
        BodyEmitter { provider, config }
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &EmitterConfig {
        &self.config
    }

    /// Work out how `method` would forward to `callable` without attaching anything.
    ///
    /// # Errors
    ///
    /// - [`crate::Error::InvalidArgument`] if `callable` cannot be resolved
    /// - [`crate::Error::InvalidConfiguration`] if the method and the callable disagree on
    ///   void / non-void or on the number of parameters
    pub fn plan(&self, method: &MethodDescriptor, callable: &CallableRef) -> Result<ForwardPlan> {
        let info = self
            .provider
            .callable_info(callable)
            .ok_or_else(|| invalid_argument!("callable {} cannot be resolved", callable))?;

        if method.return_kind().is_void() != info.return_kind.is_void() {
            return Err(invalid_config!(
                "method returning {} cannot forward to {} returning {}",
                method.return_kind(),
                callable,
                info.return_kind
            ));
        }

        if method.parameters().len() != info.parameters.len() {
            return Err(invalid_config!(
                "method takes {} parameter(s) but {} takes {}",
                method.parameters().len(),
                callable,
                info.parameters.len()
            ));
        }

        let parameters = method.parameter_types();
        let outcome = if info.is_static {
            AdapterOutcome::Static
        } else {
            let required = AdapterShape::for_signature(&parameters, &info.return_kind);
            match info.declaring_shape() {
                Some(declared) if *declared == required => {
                    AdapterOutcome::AdapterConstructed(required)
                }
                _ => AdapterOutcome::AdapterSkipped {
                    required,
                    declared: info.declaring.clone(),
                },
            }
        };

        trace!("forward plan for {callable}: {outcome}");
        Ok(ForwardPlan {
            callable: callable.clone(),
            outcome,
            parameters,
            returns_value: info.returns_value(),
        })
    }

    /// Attach a body forwarding every argument of `method` to `callable`.
    ///
    /// # Errors
    ///
    /// - [`crate::Error::InvalidArgument`] if `method` is absent or `callable` cannot be
    ///   resolved
    /// - [`crate::Error::InvalidConfiguration`] if the signatures disagree (see
    ///   [`BodyEmitter::plan`]), or if no receiver can be bound and the configuration rejects
    ///   unbound receivers
    ///
    /// The method is unchanged on failure.
    pub fn forward(
        &self,
        method: Option<&mut MethodDescriptor>,
        callable: &CallableRef,
    ) -> Result<()> {
        let method =
            method.ok_or_else(|| invalid_argument!("a method descriptor is required"))?;
        let plan = self.plan(method, callable)?;

        if let AdapterOutcome::AdapterSkipped { required, .. } = &plan.outcome {
            match self.config.unbound_receiver {
                UnboundReceiver::Reject => {
                    return Err(invalid_config!(
                        "instance callable {} cannot be bound to {}: {}",
                        callable,
                        required,
                        plan.outcome
                    ));
                }
                UnboundReceiver::NullReceiver => {
                    warn!("callable {callable} dispatched with a null receiver: {}", plan.outcome);
                }
            }
        }

        let thunk = ForwardingThunk {
            plan,
            provider: self.provider.clone(),
            box_value_types: self.config.box_value_types,
        };
        method.set_body(Box::new(
            move |encoder: &mut InstructionEncoder, parameters: &[TypeRef]| {
                thunk.emit(encoder, parameters)
            },
        ));
        Ok(())
    }

    /// Attach a caller-supplied body unmodified.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidArgument`] if `method` or `body` is absent.
    pub fn attach(&self, method: Option<&mut MethodDescriptor>, body: Option<MethodBody>) -> Result<()> {
        let method =
            method.ok_or_else(|| invalid_argument!("a method descriptor is required"))?;
        let body = body.ok_or_else(|| invalid_argument!("a body callback is required"))?;

        method.set_body(body);
        Ok(())
    }

    /// Emit the forwarding sequence for `plan` into `encoder`, packing `plan.parameters`.
    ///
    /// This is the body [`BodyEmitter::forward`] attaches, exposed for generators that
    /// drive emission themselves.
    ///
    /// # Errors
    ///
    /// Returns an error if the encoder rejects an instruction.
    pub fn emit(&self, plan: &ForwardPlan, encoder: &mut InstructionEncoder) -> Result<()> {
        emit_forwarding(
            plan,
            &self.provider,
            self.config.box_value_types,
            encoder,
            &plan.parameters,
        )
    }
}

struct ForwardingThunk {
    plan: ForwardPlan,
    provider: TypeInfoProviderRc,
    box_value_types: bool,
}

impl ForwardingThunk {
    fn emit(&self, encoder: &mut InstructionEncoder, parameters: &[TypeRef]) -> Result<()> {
        emit_forwarding(
            &self.plan,
            &self.provider,
            self.box_value_types,
            encoder,
            parameters,
        )
    }
}

fn emit_forwarding(
    plan: &ForwardPlan,
    provider: &TypeInfoProviderRc,
    box_value_types: bool,
    encoder: &mut InstructionEncoder,
    parameters: &[TypeRef],
) -> Result<()> {
    if parameters.len() != plan.parameters.len() {
        return Err(invalid_argument!(
            "forwarding to {} was planned for {} parameter(s), got {}",
            plan.callable,
            plan.parameters.len(),
            parameters.len()
        ));
    }

    // Receiver
    match &plan.outcome {
        AdapterOutcome::AdapterConstructed(shape) => {
            let adapter =
                encoder.declare_local(LocalPurpose::Adapter, LocalType::Adapter(shape.clone()))?;
            encoder.emit_ldftn(plan.callable.clone())?;
            encoder.emit_newobj_adapter(shape.clone())?;
            encoder.emit_stloc(adapter)?;
            encoder.emit_ldloc(adapter)?;
        }
        AdapterOutcome::Static | AdapterOutcome::AdapterSkipped { .. } => {
            encoder.emit_ldnull()?;
        }
    }

    // Argument packing
    let object = PrimitiveKind::Object.type_ref();
    let count = i32::try_from(parameters.len())
        .map_err(|_| malformed_error!("too many parameters to pack: {}", parameters.len()))?;
    let args = encoder.declare_local(LocalPurpose::Arguments, LocalType::Array(object.clone()))?;
    encoder.emit_ldc_i4(count)?;
    encoder.emit_newarr(object)?;
    encoder.emit_stloc(args)?;

    for (index, ty) in parameters.iter().enumerate() {
        let slot = u16::try_from(index + 1)
            .map_err(|_| malformed_error!("argument slot {} out of range", index + 1))?;
        let element = i32::from(slot) - 1;

        encoder.emit_ldloc(args)?;
        encoder.emit_ldc_i4(element)?;
        encoder.emit_ldarg(slot)?;
        if box_value_types && provider.is_value_type(ty) {
            encoder.emit_box(ty.clone())?;
        }
        encoder.emit_stelem_ref()?;
    }

    // Dispatch and return
    encoder.emit_ldloc(args)?;
    encoder.emit_invoke_late(plan.callable.clone(), plan.returns_value)?;
    encoder.emit_ret()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        assembly::{LocalSlot, OpCode, Operand},
        builders::{ParameterDescriptor, TypeDescriptor},
        metadata::typesystem::ReturnKind,
        test::{fixture_registry, registry_rc, Fixture},
        Error,
    };

    fn setup() -> (Fixture, TypeInfoProviderRc) {
        let fixture = fixture_registry();
        let provider: TypeInfoProviderRc = Arc::new(fixture.registry.clone());
        (fixture, provider)
    }

    fn string_method(ty: &mut TypeDescriptor, count: usize, returns: ReturnKind) -> Result<usize> {
        let params = (0..count)
            .map(|i| ParameterDescriptor::new(format!("p{i}"), TypeRef::new("System.String")))
            .collect::<Result<Vec<_>>>()?;
        Ok(ty.declare_method(Some("Forward"), Some(returns), Some(params))?.id().index())
    }

    fn ret_only() -> MethodBody {
        Box::new(|encoder: &mut InstructionEncoder, _: &[TypeRef]| encoder.emit_ret())
    }

    #[test]
    fn test_missing_method() {
        let (fixture, provider) = setup();
        let emitter = BodyEmitter::new(provider);
        let result = emitter.forward(None, &fixture.greet);
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_unresolved_callable_leaves_method_untouched() -> Result<()> {
        let (_, provider) = setup();
        let emitter = BodyEmitter::new(provider.clone());
        let mut ty = TypeDescriptor::new(provider);
        let index = string_method(&mut ty, 0, ReturnKind::Void)?;

        let result = emitter.forward(
            ty.methods.get_mut(index),
            &CallableRef::new("does.not.exist"),
        );
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
        assert!(!ty.methods()[index].has_body());
        Ok(())
    }

    #[test]
    fn test_static_sequence() -> Result<()> {
        let (fixture, provider) = setup();
        let emitter = BodyEmitter::new(provider.clone());
        let mut ty = TypeDescriptor::new(provider);
        let index = string_method(&mut ty, 2, ReturnKind::Void)?;

        emitter.forward(ty.methods.get_mut(index), &fixture.static_join)?;
        let code = ty.methods()[index].build_body()?;

        assert_eq!(
            code.opcodes(),
            vec![
                OpCode::Ldnull,
                OpCode::LdcI4,
                OpCode::Newarr,
                OpCode::Stloc,
                OpCode::Ldloc,
                OpCode::LdcI4,
                OpCode::Ldarg,
                OpCode::StelemRef,
                OpCode::Ldloc,
                OpCode::LdcI4,
                OpCode::Ldarg,
                OpCode::StelemRef,
                OpCode::Ldloc,
                OpCode::InvokeLate,
                OpCode::Ret,
            ]
        );
        assert_eq!(code.locals.len(), 1);
        assert_eq!(code.local(LocalPurpose::Adapter), None);
        assert_eq!(code.instructions[10].operand, Operand::Argument(2));
        assert_eq!(code.instructions[9].operand, Operand::Int32(1));
        Ok(())
    }

    #[test]
    fn test_adapter_sequence() -> Result<()> {
        let (fixture, provider) = setup();
        let emitter = BodyEmitter::new(provider.clone());
        let mut ty = TypeDescriptor::new(provider);
        let index = string_method(&mut ty, 1, ReturnKind::Void)?;

        let plan = emitter.plan(&ty.methods()[index], &fixture.greet)?;
        assert!(matches!(plan.outcome, AdapterOutcome::AdapterConstructed(_)));

        emitter.forward(ty.methods.get_mut(index), &fixture.greet)?;
        let code = ty.methods()[index].build_body()?;

        assert_eq!(
            &code.opcodes()[..4],
            &[OpCode::Ldftn, OpCode::Newobj, OpCode::Stloc, OpCode::Ldloc]
        );
        let adapter = code.local(LocalPurpose::Adapter);
        let args = code.local(LocalPurpose::Arguments);
        assert_eq!(adapter, Some(LocalSlot(0)));
        assert_eq!(args, Some(LocalSlot(1)));
        assert_eq!(code.instructions[2].operand, Operand::Local(LocalSlot(0)));
        Ok(())
    }

    #[test]
    fn test_shape_mismatch_rejected_by_default() -> Result<()> {
        let (fixture, provider) = setup();
        let emitter = BodyEmitter::new(provider.clone());
        let mut ty = TypeDescriptor::new(provider);
        let index = string_method(&mut ty, 1, ReturnKind::Void)?;

        let plan = emitter.plan(&ty.methods()[index], &fixture.instance_greet)?;
        assert!(matches!(plan.outcome, AdapterOutcome::AdapterSkipped { .. }));

        let result = emitter.forward(ty.methods.get_mut(index), &fixture.instance_greet);
        assert!(matches!(result, Err(Error::InvalidConfiguration(_))));
        assert!(!ty.methods()[index].has_body());
        Ok(())
    }

    #[test]
    fn test_shape_mismatch_null_receiver() -> Result<()> {
        let (fixture, provider) = setup();
        let config = EmitterConfig::default().with_unbound_receiver(UnboundReceiver::NullReceiver);
        let emitter = BodyEmitter::with_config(provider.clone(), config);
        let mut ty = TypeDescriptor::new(provider);
        let index = string_method(&mut ty, 1, ReturnKind::Void)?;

        emitter.forward(ty.methods.get_mut(index), &fixture.instance_greet)?;
        let code = ty.methods()[index].build_body()?;
        assert_eq!(code.opcodes()[0], OpCode::Ldnull);
        assert_eq!(code.local(LocalPurpose::Adapter), None);
        Ok(())
    }

    #[test]
    fn test_parameter_type_mismatch_skips_adapter() -> Result<()> {
        let (fixture, provider) = setup();
        let emitter = BodyEmitter::new(provider.clone());
        let mut ty = TypeDescriptor::new(provider);
        let int = TypeRef::new("System.Int32");
        let id = ty
            .declare_method(
                Some("Greet"),
                None,
                Some(vec![ParameterDescriptor::new("x", int.clone())?]),
            )?
            .id();

        let plan = emitter.plan(&ty.methods()[id.index()], &fixture.greet)?;
        match plan.outcome {
            AdapterOutcome::AdapterSkipped { required, .. } => {
                assert_eq!(required.parameters(), &[int]);
            }
            other => panic!("unexpected outcome {other}"),
        }
        Ok(())
    }

    #[test]
    fn test_return_kind_mismatch_rejected() -> Result<()> {
        let (fixture, provider) = setup();
        let emitter = BodyEmitter::new(provider.clone());
        let mut ty = TypeDescriptor::new(provider);
        let int = TypeRef::new("System.Int32");

        let void_id = ty
            .declare_method(
                Some("M"),
                None,
                Some(vec![ParameterDescriptor::new("x", int.clone())?]),
            )?
            .id();
        let result = emitter.forward(ty.method_mut(void_id), &fixture.square);
        assert!(matches!(result, Err(Error::InvalidConfiguration(_))));
        assert!(!ty.methods()[void_id.index()].has_body());

        let value_index = string_method(&mut ty, 1, ReturnKind::Value(int))?;
        let result = emitter.forward(ty.methods.get_mut(value_index), &fixture.greet);
        assert!(matches!(result, Err(Error::InvalidConfiguration(_))));
        assert!(!ty.methods()[value_index].has_body());
        Ok(())
    }

    #[test]
    fn test_arity_mismatch_rejected() -> Result<()> {
        let (fixture, provider) = setup();
        let config = EmitterConfig::default().with_unbound_receiver(UnboundReceiver::NullReceiver);
        let emitter = BodyEmitter::with_config(provider.clone(), config);
        let mut ty = TypeDescriptor::new(provider);
        let index = string_method(&mut ty, 2, ReturnKind::Void)?;

        let result = emitter.plan(&ty.methods()[index], &fixture.greet);
        assert!(matches!(result, Err(Error::InvalidConfiguration(_))));

        let result = emitter.forward(ty.methods.get_mut(index), &fixture.greet);
        assert!(matches!(result, Err(Error::InvalidConfiguration(_))));
        assert!(!ty.methods()[index].has_body());
        Ok(())
    }

    #[test]
    fn test_value_types_boxed() -> Result<()> {
        let (fixture, provider) = setup();
        let int = TypeRef::new("System.Int32");
        let mut ty = TypeDescriptor::new(provider.clone());
        let id = ty
            .declare_method(
                Some("Square"),
                Some(ReturnKind::Value(int.clone())),
                Some(vec![ParameterDescriptor::new("x", int.clone())?]),
            )?
            .id();

        let emitter = BodyEmitter::new(provider.clone());
        emitter.forward(ty.method_mut(id), &fixture.square)?;
        let code = ty.methods()[id.index()].build_body()?;
        assert!(code.opcodes().contains(&OpCode::Box));
        assert!(code
            .instructions
            .iter()
            .any(|i| i.opcode == OpCode::Box && i.operand == Operand::Type(int.clone())));

        let config = EmitterConfig::default().with_box_value_types(false);
        let emitter = BodyEmitter::with_config(provider, config);
        emitter.forward(ty.method_mut(id), &fixture.square)?;
        let code = ty.methods()[id.index()].build_body()?;
        assert!(!code.opcodes().contains(&OpCode::Box));
        Ok(())
    }

    #[test]
    fn test_result_left_on_stack() -> Result<()> {
        let (fixture, provider) = setup();
        let emitter = BodyEmitter::new(provider.clone());
        let mut ty = TypeDescriptor::new(provider);
        let index = string_method(&mut ty, 1, ReturnKind::Value(TypeRef::new("System.String")))?;

        let plan = emitter.plan(&ty.methods()[index], &fixture.echo)?;
        assert!(plan.returns_value);

        let mut encoder = InstructionEncoder::new();
        emitter.emit(&plan, &mut encoder)?;
        // receiver + array consumed, result remains
        assert_eq!(encoder.current_stack_depth(), 1);
        assert_eq!(encoder.max_stack_depth(), 4);
        Ok(())
    }

    #[test]
    fn test_thunk_rejects_parameter_list_of_other_arity() -> Result<()> {
        let (fixture, provider) = setup();
        let emitter = BodyEmitter::new(provider.clone());
        let mut ty = TypeDescriptor::new(provider);
        let index = string_method(&mut ty, 1, ReturnKind::Void)?;
        emitter.forward(ty.methods.get_mut(index), &fixture.greet)?;

        let body = ty.methods()[index]
            .body()
            .ok_or_else(|| invalid_state!("no body"))?;
        let mut encoder = InstructionEncoder::new();
        let result = body(&mut encoder, &[]);
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
        assert!(encoder.is_empty());
        Ok(())
    }

    #[test]
    fn test_attach() -> Result<()> {
        let emitter = BodyEmitter::new(registry_rc());
        let mut ty = TypeDescriptor::new(registry_rc());
        let index = string_method(&mut ty, 0, ReturnKind::Void)?;

        assert!(matches!(
            emitter.attach(None, Some(ret_only())),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            emitter.attach(ty.methods.get_mut(index), None),
            Err(Error::InvalidArgument(_))
        ));
        assert!(!ty.methods()[index].has_body());

        emitter.attach(
            ty.methods.get_mut(index),
            Some(Box::new(|encoder: &mut InstructionEncoder, _: &[TypeRef]| {
                encoder.emit_nop()?;
                encoder.emit_ret()
            })),
        )?;
        let code = ty.methods()[index].build_body()?;
        assert_eq!(code.opcodes(), vec![OpCode::Nop, OpCode::Ret]);
        Ok(())
    }
}
