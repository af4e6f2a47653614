//! Property descriptors and their fluent builder.

use std::fmt;

use crate::{
    builders::{TypeDescriptor, VisibilityScope},
    metadata::typesystem::TypeRef,
};

/// Stable identity of a property within its [`TypeDescriptor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PropertyId(pub(crate) usize);

impl PropertyId {
    /// Declaration index of the property.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

/// A described property with independent read and write accessors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyDescriptor {
    id: PropertyId,
    ty: TypeRef,
    name: Option<String>,
    readable: bool,
    writable: bool,
    read_scope: VisibilityScope,
    write_scope: VisibilityScope,
}

impl PropertyDescriptor {
    pub(crate) fn new(
        id: PropertyId,
        ty: TypeRef,
        name: Option<String>,
        scope: VisibilityScope,
    ) -> Self {
        PropertyDescriptor {
            id,
            ty,
            name,
            readable: true,
            writable: true,
            read_scope: scope,
            write_scope: scope,
        }
    }

    /// Stable identity.
    #[must_use]
    pub fn id(&self) -> PropertyId {
        self.id
    }

    /// Property type.
    #[must_use]
    pub fn ty(&self) -> &TypeRef {
        &self.ty
    }

    /// Property name, if one was given.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Whether a getter is generated.
    #[must_use]
    pub fn is_readable(&self) -> bool {
        self.readable
    }

    /// Whether a setter is generated.
    #[must_use]
    pub fn is_writable(&self) -> bool {
        self.writable
    }

    /// Getter visibility.
    #[must_use]
    pub fn read_scope(&self) -> VisibilityScope {
        self.read_scope
    }

    /// Setter visibility.
    #[must_use]
    pub fn write_scope(&self) -> VisibilityScope {
        self.write_scope
    }
}

impl fmt::Display for PropertyDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {{", self.ty, self.name.as_deref().unwrap_or("<unnamed>"))?;
        if self.readable {
            write!(f, " {} get;", self.read_scope)?;
        }
        if self.writable {
            write!(f, " {} set;", self.write_scope)?;
        }
        f.write_str(" }")
    }
}

/// Fluent builder for a property owned by a [`TypeDescriptor`].
pub struct PropertyBuilder<'a> {
    parent: &'a mut TypeDescriptor,
    id: PropertyId,
}

impl<'a> PropertyBuilder<'a> {
    pub(crate) fn new(parent: &'a mut TypeDescriptor, id: PropertyId) -> Self {
        PropertyBuilder { parent, id }
    }

    fn descriptor(&mut self) -> &mut PropertyDescriptor {
        &mut self.parent.properties[self.id.0]
    }

    /// Stable identity of the property being built.
    #[must_use]
    pub fn id(&self) -> PropertyId {
        self.id
    }

    /// Set the property name.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.descriptor().name = Some(name.into());
        self
    }

    /// Enable or disable the getter.
    #[must_use]
    pub fn readable(mut self, readable: bool) -> Self {
        self.descriptor().readable = readable;
        self
    }

    /// Enable or disable the setter.
    #[must_use]
    pub fn writable(mut self, writable: bool) -> Self {
        self.descriptor().writable = writable;
        self
    }

    /// Set the getter visibility.
    #[must_use]
    pub fn read_scope(mut self, scope: VisibilityScope) -> Self {
        self.descriptor().read_scope = scope;
        self
    }

    /// Set the setter visibility.
    #[must_use]
    pub fn write_scope(mut self, scope: VisibilityScope) -> Self {
        self.descriptor().write_scope = scope;
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
    use crate::{test::registry_rc, Result};

    #[test]
    fn test_defaults() -> Result<()> {
        let mut ty = TypeDescriptor::with_visibility(registry_rc(), VisibilityScope::Protected);
        let id = ty
            .declare_property(TypeRef::new("System.String"), Some("Name"), None)?
            .id();

        let property = &ty.properties()[id.index()];
        assert!(property.is_readable());
        assert!(property.is_writable());
        assert_eq!(property.read_scope(), VisibilityScope::Protected);
        assert_eq!(property.write_scope(), VisibilityScope::Protected);
        Ok(())
    }

    #[test]
    fn test_independent_accessors() -> Result<()> {
        let mut ty = TypeDescriptor::new(registry_rc());
        let id = ty
            .declare_property(
                TypeRef::new("System.Int32"),
                None,
                Some(VisibilityScope::Public),
            )?
            .name("Count")
            .write_scope(VisibilityScope::Private)
            .readable(true)
            .id();

        let property = &ty.properties()[id.index()];
        assert_eq!(property.read_scope(), VisibilityScope::Public);
        assert_eq!(property.write_scope(), VisibilityScope::Private);
        assert_eq!(
            property.to_string(),
            "System.Int32 Count { public get; private set; }"
        );
        Ok(())
    }

    #[test]
    fn test_read_only() -> Result<()> {
        let mut ty = TypeDescriptor::new(registry_rc());
        ty.declare_property(TypeRef::new("System.Int32"), Some("Id"), None)?
            .writable(false)
            .read_scope(VisibilityScope::Public)
            .and();

        let property = &ty.properties()[0];
        assert!(!property.is_writable());
        assert_eq!(property.to_string(), "System.Int32 Id { public get; }");
        Ok(())
    }
}
