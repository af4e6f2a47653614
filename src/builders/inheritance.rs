use std::fmt;

use crate::metadata::typesystem::TypeRef;

/// The single base-type relationship of a described type.
///
/// Only created by [`crate::builders::TypeDescriptor::declare_base_type`] after the base was
/// verified to be a resolvable, inheritable, non-interface type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InheritanceEdge {
    base: TypeRef,
}

impl InheritanceEdge {
    pub(crate) fn new(base: TypeRef) -> Self {
        InheritanceEdge { base }
    }

    /// The base type.
    #[must_use]
    pub fn base(&self) -> &TypeRef {
        &self.base
    }
}

impl fmt::Display for InheritanceEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "extends {}", self.base)
    }
}
