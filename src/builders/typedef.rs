//! The type descriptor: aggregate root of the descriptor graph.
//!
//! A [`TypeDescriptor`] models a type that does not exist yet. It records visibility, the
//! sealed and abstract markers, at most one base type, any number of interfaces, and ordered
//! collections of constructors, methods and properties. Every structural rule is checked
//! before the graph is touched, so a failed call leaves the descriptor exactly as it was.
//!
//! # Examples
//!
//! ```rust
//! use dotforge::prelude::*;
//! use std::sync::Arc;
//!
//! let mut registry = TypeRegistry::new();
//! let base = registry.class("Acme", "Entity");
//! let disposable = registry.interface("System", "IDisposable");
//! let string = registry.primitive(PrimitiveKind::String);
//!
//! let mut ty = TypeDescriptor::new(Arc::new(registry));
//! ty.set_visibility(VisibilityScope::Public)
//!     .declare_base_type(&base)?
//!     .declare_interface(&disposable)?
//!     .seal()?
//!     .declare_constructor(None)
//!     .takes_named("name", string.clone())?
//!     .and()
//!     .declare_property(string, Some("Name"), None)?
//!     .writable(false)
//!     .and();
//!
//! assert!(ty.is_sealed());
//! assert_eq!(ty.interfaces().len(), 1);
//! assert_eq!(ty.properties()[0].read_scope(), VisibilityScope::Public);
//! # Ok::<(), dotforge::Error>(())
//! ```

use std::fmt;

use log::debug;

use crate::{
    builders::{
        ConstructorBuilder, ConstructorDescriptor, ConstructorId, InheritanceEdge, MethodBuilder,
        MethodDescriptor, MethodId, ParameterDescriptor, PropertyBuilder, PropertyDescriptor,
        PropertyId, TypeAttributes, VisibilityScope,
    },
    emitter::BodyEmitter,
    metadata::typesystem::{CallableRef, ReturnKind, TypeInfoProviderRc, TypeRef},
    Result,
};

/// In-memory model of a type to be synthesized by an external generator.
pub struct TypeDescriptor {
    provider: TypeInfoProviderRc,
    name: Option<String>,
    visibility: VisibilityScope,
    sealed: bool,
    is_abstract: bool,
    base: Option<InheritanceEdge>,
    interfaces: Vec<TypeRef>,
    pub(crate) constructors: Vec<ConstructorDescriptor>,
    pub(crate) methods: Vec<MethodDescriptor>,
    pub(crate) properties: Vec<PropertyDescriptor>,
}

impl TypeDescriptor {
    /// Create an empty, internal type.
    ///
    /// # Arguments
    ///
    /// * `provider` - Answers every structural question about existing types and callables
    #[must_use]
    pub fn new(provider: TypeInfoProviderRc) -> Self {
        Self::with_visibility(provider, VisibilityScope::Internal)
    }

    /// Create an empty type with the given visibility.
    #[must_use]
    pub fn with_visibility(provider: TypeInfoProviderRc, visibility: VisibilityScope) -> Self {
        TypeDescriptor {
            provider,
            name: None,
            visibility,
            sealed: false,
            is_abstract: false,
            base: None,
            interfaces: Vec::new(),
            constructors: Vec::new(),
            methods: Vec::new(),
            properties: Vec::new(),
        }
    }

    /// The type-information provider used for validation.
    #[must_use]
    pub fn provider(&self) -> &TypeInfoProviderRc {
        &self.provider
    }

    /// Set the type name handed to the generator.
    pub fn set_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.name = Some(name.into());
        self
    }

    /// Mark the type abstract.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidState`] if the type is sealed.
    pub fn set_abstract(&mut self) -> Result<&mut Self> {
        if self.sealed {
            return Err(invalid_state!("a sealed type cannot be marked abstract"));
        }

        debug!("type {} marked abstract", self.display_name());
        self.is_abstract = true;
        Ok(self)
    }

    /// Mark the type non-inheritable.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidState`] if the type is abstract.
    pub fn seal(&mut self) -> Result<&mut Self> {
        if self.is_abstract {
            return Err(invalid_state!("an abstract type cannot be sealed"));
        }

        debug!("type {} sealed", self.display_name());
        self.sealed = true;
        Ok(self)
    }

    /// Change the type visibility.
    ///
    /// Existing members keep their scopes; members declared afterwards that default to the
    /// type's visibility pick up the new value.
    pub fn set_visibility(&mut self, scope: VisibilityScope) -> &mut Self {
        self.visibility = scope;
        self
    }

    /// Declare the base type.
    ///
    /// Declaring the current base again is a no-op.
    ///
    /// # Errors
    ///
    /// - [`crate::Error::InvalidArgument`] if `base` cannot be resolved
    /// - [`crate::Error::InvalidConfiguration`] if `base` is an interface, is sealed, or a
    ///   different base type is already declared
    pub fn declare_base_type(&mut self, base: &TypeRef) -> Result<&mut Self> {
        let info = self
            .provider
            .type_info(base)
            .ok_or_else(|| invalid_argument!("base type {} cannot be resolved", base))?;

        if info.is_interface() {
            return Err(invalid_config!(
                "{} is an interface, use declare_interface instead",
                base
            ));
        }

        if info.sealed {
            return Err(invalid_config!("{} is sealed and cannot be inherited", base));
        }

        if let Some(existing) = &self.base {
            if existing.base() == base {
                return Ok(self);
            }

            return Err(invalid_config!(
                "type already inherits from {}, cannot also inherit from {}",
                existing.base(),
                base
            ));
        }

        debug!("type {} extends {}", self.display_name(), base);
        self.base = Some(InheritanceEdge::new(base.clone()));
        Ok(self)
    }

    /// Declare an implemented interface. Duplicates are ignored.
    ///
    /// # Errors
    ///
    /// - [`crate::Error::InvalidArgument`] if `interface` cannot be resolved
    /// - [`crate::Error::InvalidConfiguration`] if `interface` is not an interface
    pub fn declare_interface(&mut self, interface: &TypeRef) -> Result<&mut Self> {
        let info = self
            .provider
            .type_info(interface)
            .ok_or_else(|| invalid_argument!("interface {} cannot be resolved", interface))?;

        if !info.is_interface() {
            return Err(invalid_config!(
                "{} is not an interface, use declare_base_type instead",
                interface
            ));
        }

        if !self.interfaces.contains(interface) {
            debug!("type {} implements {}", self.display_name(), interface);
            self.interfaces.push(interface.clone());
        }

        Ok(self)
    }

    /// Declare a constructor; `None` means public.
    pub fn declare_constructor(&mut self, scope: Option<VisibilityScope>) -> ConstructorBuilder<'_> {
        let id = ConstructorId(self.constructors.len());
        let scope = scope.unwrap_or(VisibilityScope::Public);
        self.constructors.push(ConstructorDescriptor::new(id, scope));
        ConstructorBuilder::new(self, id)
    }

    /// Declare a private method.
    ///
    /// # Arguments
    ///
    /// * `name` - Method name, may be set later through the builder
    /// * `return_kind` - Defaults to [`ReturnKind::Void`]
    /// * `parameters` - Defaults to none
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidArgument`] if the return type or any parameter type
    /// cannot be resolved. Nothing is added in that case.
    pub fn declare_method(
        &mut self,
        name: Option<&str>,
        return_kind: Option<ReturnKind>,
        parameters: Option<Vec<ParameterDescriptor>>,
    ) -> Result<MethodBuilder<'_>> {
        let return_kind = return_kind.unwrap_or_default();
        let parameters = parameters.unwrap_or_default();

        if let Some(ty) = return_kind.value_type() {
            self.ensure_resolved(ty, "return type")?;
        }
        for parameter in &parameters {
            self.ensure_resolved(parameter.ty(), &format!("parameter '{}'", parameter.name()))?;
        }

        let id = MethodId(self.methods.len());
        self.methods.push(MethodDescriptor::new(
            id,
            name.map(str::to_string),
            return_kind,
            parameters,
            VisibilityScope::Private,
        ));
        Ok(MethodBuilder::new(self, id))
    }

    /// Declare a method shaped after `callable` whose body forwards to it.
    ///
    /// The method takes the callable's name, return kind and parameter types; parameters are
    /// named `arg1`, `arg2`, ... in order. Nothing is added if the body cannot be attached.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidArgument`] if `callable` cannot be resolved, or any
    /// error of [`BodyEmitter::forward`].
    pub fn declare_forwarding_method(
        &mut self,
        emitter: &BodyEmitter,
        callable: &CallableRef,
    ) -> Result<MethodBuilder<'_>> {
        let info = self
            .provider
            .callable_info(callable)
            .ok_or_else(|| invalid_argument!("callable {} cannot be resolved", callable))?;

        let parameters = info
            .parameters
            .iter()
            .enumerate()
            .map(|(i, ty)| ParameterDescriptor::new(format!("arg{}", i + 1), ty.clone()))
            .collect::<Result<Vec<_>>>()?;

        let id = MethodId(self.methods.len());
        let mut method = MethodDescriptor::new(
            id,
            Some(info.name.clone()),
            info.return_kind.clone(),
            parameters,
            VisibilityScope::Private,
        );

        emitter.forward(Some(&mut method), callable)?;
        self.methods.push(method);
        Ok(MethodBuilder::new(self, id))
    }

    /// Declare a readable, writable property.
    ///
    /// Both accessors take `scope`, or the type's current visibility if `None`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidArgument`] if `ty` cannot be resolved.
    pub fn declare_property(
        &mut self,
        ty: TypeRef,
        name: Option<&str>,
        scope: Option<VisibilityScope>,
    ) -> Result<PropertyBuilder<'_>> {
        self.ensure_resolved(&ty, "property type")?;

        let id = PropertyId(self.properties.len());
        let scope = scope.unwrap_or(self.visibility);
        self.properties.push(PropertyDescriptor::new(
            id,
            ty,
            name.map(str::to_string),
            scope,
        ));
        Ok(PropertyBuilder::new(self, id))
    }

    /// Type name, if set.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Current visibility.
    #[must_use]
    pub fn visibility(&self) -> VisibilityScope {
        self.visibility
    }

    /// Returns `true` if the type is sealed.
    #[must_use]
    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    /// Returns `true` if the type is abstract.
    #[must_use]
    pub fn is_abstract(&self) -> bool {
        self.is_abstract
    }

    /// The inheritance edge, if a base type was declared.
    #[must_use]
    pub fn base_type(&self) -> Option<&InheritanceEdge> {
        self.base.as_ref()
    }

    /// Implemented interfaces in declaration order.
    #[must_use]
    pub fn interfaces(&self) -> &[TypeRef] {
        &self.interfaces
    }

    /// Constructors in declaration order.
    #[must_use]
    pub fn constructors(&self) -> &[ConstructorDescriptor] {
        &self.constructors
    }

    /// Methods in declaration order.
    #[must_use]
    pub fn methods(&self) -> &[MethodDescriptor] {
        &self.methods
    }

    /// Properties in declaration order.
    #[must_use]
    pub fn properties(&self) -> &[PropertyDescriptor] {
        &self.properties
    }

    /// Look up a constructor by id.
    #[must_use]
    pub fn constructor(&self, id: ConstructorId) -> Option<&ConstructorDescriptor> {
        self.constructors.get(id.0)
    }

    /// Look up a method by id.
    #[must_use]
    pub fn method(&self, id: MethodId) -> Option<&MethodDescriptor> {
        self.methods.get(id.0)
    }

    /// Look up a method by id for further configuration.
    pub fn method_mut(&mut self, id: MethodId) -> Option<&mut MethodDescriptor> {
        self.methods.get_mut(id.0)
    }

    /// Look up a property by id.
    #[must_use]
    pub fn property(&self, id: PropertyId) -> Option<&PropertyDescriptor> {
        self.properties.get(id.0)
    }

    /// The attribute word for the generator: visibility, sealed and abstract bits.
    #[must_use]
    pub fn attributes(&self) -> TypeAttributes {
        let mut attributes = self.visibility.to_type_visibility();
        if self.sealed {
            attributes |= TypeAttributes::SEALED;
        }
        if self.is_abstract {
            attributes |= TypeAttributes::ABSTRACT;
        }
        attributes
    }

    fn ensure_resolved(&self, ty: &TypeRef, role: &str) -> Result<()> {
        if self.provider.is_resolved(ty) {
            Ok(())
        } else {
            Err(invalid_argument!("{} has unresolved type {}", role, ty))
        }
    }

    fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("<unnamed>")
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("name", &self.name)
            .field("visibility", &self.visibility)
            .field("sealed", &self.sealed)
            .field("abstract", &self.is_abstract)
            .field("base", &self.base)
            .field("interfaces", &self.interfaces)
            .field("constructors", &self.constructors)
            .field("methods", &self.methods)
            .field("properties", &self.properties)
            .finish_non_exhaustive()
    }
}
