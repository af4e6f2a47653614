//! Method descriptors, their body callbacks and their fluent builder.

use std::fmt;

use log::{debug, warn};

use crate::{
    assembly::{InstructionEncoder, MethodCode},
    builders::{ParameterDescriptor, TypeDescriptor, VisibilityScope},
    emitter::BodyEmitter,
    metadata::typesystem::{CallableRef, ReturnKind, TypeRef},
    Result,
};

/// Instruction-emission callback attached to a method.
///
/// The generator invokes it with the stream writer it owns and the method's resolved
/// parameter types. Callbacks built by [`BodyEmitter::forward`] emit a forwarding thunk;
/// callbacks attached through [`BodyEmitter::attach`] or [`MethodBuilder::body`] are stored
/// as supplied.
pub type MethodBody = Box<dyn Fn(&mut InstructionEncoder, &[TypeRef]) -> Result<()>>;

/// Stable identity of a method within its [`TypeDescriptor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MethodId(pub(crate) usize);

impl MethodId {
    /// Declaration index of the method.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

/// A described method.
///
/// Name, return kind and parameters are fixed at declaration; visibility and body stay
/// mutable until the graph is handed to the generator.
pub struct MethodDescriptor {
    id: MethodId,
    name: Option<String>,
    return_kind: ReturnKind,
    parameters: Vec<ParameterDescriptor>,
    visibility: VisibilityScope,
    body: Option<MethodBody>,
}

impl MethodDescriptor {
    pub(crate) fn new(
        id: MethodId,
        name: Option<String>,
        return_kind: ReturnKind,
        parameters: Vec<ParameterDescriptor>,
        visibility: VisibilityScope,
    ) -> Self {
        MethodDescriptor {
            id,
            name,
            return_kind,
            parameters,
            visibility,
            body: None,
        }
    }

    /// Stable identity.
    #[must_use]
    pub fn id(&self) -> MethodId {
        self.id
    }

    /// Method name, if one was given.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Declared return kind.
    #[must_use]
    pub fn return_kind(&self) -> &ReturnKind {
        &self.return_kind
    }

    /// Parameters in declaration order.
    #[must_use]
    pub fn parameters(&self) -> &[ParameterDescriptor] {
        &self.parameters
    }

    /// Parameter types in declaration order.
    #[must_use]
    pub fn parameter_types(&self) -> Vec<TypeRef> {
        self.parameters.iter().map(|p| p.ty().clone()).collect()
    }

    /// Current visibility.
    #[must_use]
    pub fn visibility(&self) -> VisibilityScope {
        self.visibility
    }

    /// Change the visibility.
    pub fn set_visibility(&mut self, scope: VisibilityScope) {
        self.visibility = scope;
    }

    /// Returns `true` once a body has been attached.
    #[must_use]
    pub fn has_body(&self) -> bool {
        self.body.is_some()
    }

    /// The attached body callback.
    #[must_use]
    pub fn body(&self) -> Option<&MethodBody> {
        self.body.as_ref()
    }

    /// Attach `body`, replacing any previous one.
    pub(crate) fn set_body(&mut self, body: MethodBody) {
        if self.body.is_some() {
            warn!("replacing body of method {}", self.display_name());
        }
        debug!("body attached to method {}", self.display_name());
        self.body = Some(body);
    }

    /// Invoke the attached body against `encoder` with this method's parameter types.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidState`] if no body is attached, or whatever the body
    /// callback returns.
    pub fn emit_body(&self, encoder: &mut InstructionEncoder) -> Result<()> {
        let body = self
            .body
            .as_ref()
            .ok_or_else(|| invalid_state!("method {} has no body", self.display_name()))?;

        body(encoder, &self.parameter_types())
    }

    /// Emit the attached body into a fresh encoder and finalize it.
    ///
    /// The stack at `ret` must hold exactly one value for a value-returning method and none
    /// for a void one.
    ///
    /// # Errors
    ///
    /// See [`MethodDescriptor::emit_body`] and [`InstructionEncoder::finalize`]. Returns
    /// [`crate::Error::Malformed`] if the stack at `ret` does not match the return kind.
    pub fn build_body(&self) -> Result<MethodCode> {
        let mut encoder = InstructionEncoder::new();
        self.emit_body(&mut encoder)?;

        let expected = u16::from(!self.return_kind.is_void());
        if encoder.current_stack_depth() != expected {
            return Err(malformed_error!(
                "method {} returns {} but leaves {} value(s) on the stack at ret",
                self.display_name(),
                self.return_kind,
                encoder.current_stack_depth()
            ));
        }

        encoder.finalize()
    }

    fn display_name(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => format!("#{}", self.id.0),
        }
    }
}

impl fmt::Debug for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodDescriptor")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("return_kind", &self.return_kind)
            .field("parameters", &self.parameters)
            .field("visibility", &self.visibility)
            .field("has_body", &self.body.is_some())
            .finish()
    }
}

impl fmt::Display for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params: Vec<String> = self.parameters.iter().map(ToString::to_string).collect();
        write!(
            f,
            "{} {} {}({})",
            self.visibility,
            self.return_kind,
            self.display_name(),
            params.join(", ")
        )
    }
}

/// Fluent builder for a method owned by a [`TypeDescriptor`].
///
/// # Examples
///
/// ```rust
/// use dotforge::prelude::*;
/// use std::sync::Arc;
///
/// let mut registry = TypeRegistry::new();
/// let string = registry.primitive(PrimitiveKind::String);
/// let log = registry.callable(CallableInfo::adapter_invoke(
///     "log",
///     vec![string.clone()],
///     ReturnKind::Void,
/// ));
/// let provider: TypeInfoProviderRc = Arc::new(registry);
///
/// let emitter = BodyEmitter::new(provider.clone());
/// let mut ty = TypeDescriptor::new(provider);
///
/// let id = ty
///     .declare_method(
///         Some("Log"),
///         None,
///         Some(vec![ParameterDescriptor::new("message", string)?]),
///     )?
///     .visibility(VisibilityScope::Public)
///     .forward_to(&emitter, &log)?
///     .id();
///
/// assert!(ty.method(id).is_some_and(MethodDescriptor::has_body));
/// # Ok::<(), dotforge::Error>(())
/// ```
pub struct MethodBuilder<'a> {
    parent: &'a mut TypeDescriptor,
    id: MethodId,
}

impl<'a> MethodBuilder<'a> {
    pub(crate) fn new(parent: &'a mut TypeDescriptor, id: MethodId) -> Self {
        MethodBuilder { parent, id }
    }

    fn descriptor(&mut self) -> &mut MethodDescriptor {
        &mut self.parent.methods[self.id.0]
    }

    /// Stable identity of the method being built.
    #[must_use]
    pub fn id(&self) -> MethodId {
        self.id
    }

    /// Set the visibility.
    #[must_use]
    pub fn visibility(mut self, scope: VisibilityScope) -> Self {
        self.descriptor().set_visibility(scope);
        self
    }

    /// Set the method name.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.descriptor().name = Some(name.into());
        self
    }

    /// Attach a body forwarding every argument to `callable`.
    ///
    /// # Errors
    ///
    /// See [`BodyEmitter::forward`]. The method is unchanged on failure.
    pub fn forward_to(mut self, emitter: &BodyEmitter, callable: &CallableRef) -> Result<Self> {
        emitter.forward(Some(self.descriptor()), callable)?;
        Ok(self)
    }

    /// Attach a manual body callback.
    #[must_use]
    pub fn body<F>(mut self, body: F) -> Self
    where
        F: Fn(&mut InstructionEncoder, &[TypeRef]) -> Result<()> + 'static,
    {
        self.descriptor().set_body(Box::new(body));
        self
    }

    /// Return to the owning type.
    pub fn and(self) -> &'a mut TypeDescriptor {
        self.parent
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{test::registry_rc, Error};

    #[test]
    fn test_defaults() -> Result<()> {
        let mut ty = TypeDescriptor::new(registry_rc());
        let id = ty.declare_method(None, None, None)?.id();

        let method = &ty.methods()[id.index()];
        assert!(method.return_kind().is_void());
        assert!(method.parameters().is_empty());
        assert_eq!(method.visibility(), VisibilityScope::Private);
        assert!(method.name().is_none());
        assert!(!method.has_body());
        Ok(())
    }

    #[test]
    fn test_visibility_mutable() -> Result<()> {
        let mut ty = TypeDescriptor::new(registry_rc());
        let id = ty
            .declare_method(Some("Run"), None, None)?
            .visibility(VisibilityScope::Protected)
            .visibility(VisibilityScope::Public)
            .id();
        assert_eq!(ty.methods()[id.index()].visibility(), VisibilityScope::Public);
        Ok(())
    }

    #[test]
    fn test_manual_body() -> Result<()> {
        let mut ty = TypeDescriptor::new(registry_rc());
        let id = ty
            .declare_method(Some("Nothing"), None, None)?
            .body(|encoder, params| {
                assert!(params.is_empty());
                encoder.emit_ret()
            })
            .id();

        let code = ty.methods()[id.index()].build_body()?;
        assert_eq!(code.instructions.len(), 1);
        Ok(())
    }

    #[test]
    fn test_emit_without_body() -> Result<()> {
        let mut ty = TypeDescriptor::new(registry_rc());
        let id = ty.declare_method(Some("Empty"), None, None)?.id();
        let result = ty.methods()[id.index()].build_body();
        assert!(matches!(result, Err(Error::InvalidState(_))));
        Ok(())
    }

    #[test]
    fn test_stack_at_ret_matches_return_kind() -> Result<()> {
        let mut ty = TypeDescriptor::new(registry_rc());
        let int = TypeRef::new("System.Int32");

        let stray = ty
            .declare_method(Some("Stray"), None, None)?
            .body(|encoder, _| {
                encoder.emit_ldc_i4(1)?;
                encoder.emit_ret()
            })
            .id();
        let missing = ty
            .declare_method(Some("Missing"), Some(ReturnKind::Value(int)), None)?
            .body(|encoder, _| encoder.emit_ret())
            .id();

        assert!(matches!(
            ty.methods()[stray.index()].build_body(),
            Err(Error::Malformed { .. })
        ));
        assert!(matches!(
            ty.methods()[missing.index()].build_body(),
            Err(Error::Malformed { .. })
        ));
        Ok(())
    }

    #[test]
    fn test_body_replaced() -> Result<()> {
        let mut ty = TypeDescriptor::new(registry_rc());
        let id = ty
            .declare_method(Some("Twice"), None, None)?
            .body(|encoder, _| encoder.emit_ret())
            .body(|encoder, _| {
                encoder.emit_nop()?;
                encoder.emit_ret()
            })
            .id();

        let code = ty.methods()[id.index()].build_body()?;
        assert_eq!(code.instructions.len(), 2);
        Ok(())
    }

    #[test]
    fn test_display() -> Result<()> {
        let mut ty = TypeDescriptor::new(registry_rc());
        let int = TypeRef::new("System.Int32");
        ty.declare_method(
            Some("Add"),
            Some(ReturnKind::Value(int.clone())),
            Some(vec![
                ParameterDescriptor::new("a", int.clone())?,
                ParameterDescriptor::new("b", int)?,
            ]),
        )?;
        assert_eq!(
            ty.methods()[0].to_string(),
            "private System.Int32 Add(System.Int32 a, System.Int32 b)"
        );
        Ok(())
    }
}
