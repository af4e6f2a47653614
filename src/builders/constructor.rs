//! Constructor descriptors and their fluent builder.

use std::fmt;

use log::debug;

use crate::{
    builders::{ParameterDescriptor, TypeDescriptor, VisibilityScope},
    metadata::typesystem::TypeRef,
    Result,
};

/// Stable identity of a constructor within its [`TypeDescriptor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConstructorId(pub(crate) usize);

impl ConstructorId {
    /// Declaration index of the constructor.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

/// A described constructor: fixed visibility plus an ordered parameter list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstructorDescriptor {
    id: ConstructorId,
    visibility: VisibilityScope,
    parameters: Vec<ParameterDescriptor>,
}

impl ConstructorDescriptor {
    pub(crate) fn new(id: ConstructorId, visibility: VisibilityScope) -> Self {
        ConstructorDescriptor {
            id,
            visibility,
            parameters: Vec::new(),
        }
    }

    /// Stable identity.
    #[must_use]
    pub fn id(&self) -> ConstructorId {
        self.id
    }

    /// Visibility, fixed at creation.
    #[must_use]
    pub fn visibility(&self) -> VisibilityScope {
        self.visibility
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
}

impl fmt::Display for ConstructorDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params: Vec<String> = self.parameters.iter().map(ToString::to_string).collect();
        write!(f, "{} .ctor({})", self.visibility, params.join(", "))
    }
}

/// Fluent builder for a constructor owned by a [`TypeDescriptor`].
///
/// Created by [`TypeDescriptor::declare_constructor`]. The builder keeps a handle on its
/// parent so type-level configuration can continue through [`ConstructorBuilder::and`].
///
/// # Examples
///
/// ```rust
/// use dotforge::prelude::*;
/// use std::sync::Arc;
///
/// let registry = TypeRegistry::new();
/// let int = registry.primitive(PrimitiveKind::I4);
/// let string = registry.primitive(PrimitiveKind::String);
/// let mut ty = TypeDescriptor::new(Arc::new(registry));
///
/// let ctor = ty
///     .declare_constructor(None)
///     .takes_named("id", int)?
///     .takes_named("label", string)?
///     .id();
///
/// assert_eq!(ty.constructor(ctor).map(|c| c.parameters().len()), Some(2));
/// # Ok::<(), dotforge::Error>(())
/// ```
pub struct ConstructorBuilder<'a> {
    parent: &'a mut TypeDescriptor,
    id: ConstructorId,
}

impl<'a> ConstructorBuilder<'a> {
    pub(crate) fn new(parent: &'a mut TypeDescriptor, id: ConstructorId) -> Self {
        ConstructorBuilder { parent, id }
    }

    /// Stable identity of the constructor being built.
    #[must_use]
    pub fn id(&self) -> ConstructorId {
        self.id
    }

    /// Visibility of the constructor being built.
    #[must_use]
    pub fn visibility(&self) -> VisibilityScope {
        self.parent.constructors[self.id.0].visibility
    }

    /// Append a parameter.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidArgument`] if the parameter type cannot be resolved.
    pub fn takes(self, parameter: ParameterDescriptor) -> Result<Self> {
        self.takes_all([parameter])
    }

    /// Append a parameter built from `name` and `ty`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidArgument`] if `name` is blank or `ty` cannot be
    /// resolved.
    pub fn takes_named(self, name: &str, ty: TypeRef) -> Result<Self> {
        let parameter = ParameterDescriptor::new(name, ty)?;
        self.takes(parameter)
    }

    /// Append several parameters in order.
    ///
    /// Every parameter is validated before any is appended, so a failure leaves the
    /// parameter list unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidArgument`] if any parameter type cannot be resolved.
    pub fn takes_all(
        self,
        parameters: impl IntoIterator<Item = ParameterDescriptor>,
    ) -> Result<Self> {
        let parameters: Vec<ParameterDescriptor> = parameters.into_iter().collect();

        if let Some(unresolved) = parameters
            .iter()
            .find(|p| !self.parent.provider().is_resolved(p.ty()))
        {
            return Err(invalid_argument!(
                "parameter '{}' has unresolved type {}",
                unresolved.name(),
                unresolved.ty()
            ));
        }

        let ctor = &mut self.parent.constructors[self.id.0];
        for parameter in parameters {
            debug!("constructor #{} takes {}", self.id.0, parameter);
            ctor.parameters.push(parameter);
        }

        Ok(self)
    }

    /// Return to the owning type.
    pub fn and(self) -> &'a mut TypeDescriptor {
        self.parent
    }
}
