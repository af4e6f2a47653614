//! Visibility scopes and the attribute words a generator consumes.
//!
//! [`VisibilityScope`] is the closed set of scopes a described type or member can carry. It
//! is an opaque tag for the descriptor graph; the generator maps it onto the runtime's access
//! model, for which [`VisibilityScope::to_method_access`] and
//! [`VisibilityScope::to_type_visibility`] provide the ECMA-335 encodings.

use bitflags::bitflags;
use strum::{Display, EnumCount, EnumIter, IntoStaticStr};

/// Mask isolating the visibility bits of a [`TypeAttributes`] word
pub const TYPE_VISIBILITY_MASK: u32 = 0x0000_0007;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    /// Type attribute word handed to the generator (ECMA-335 §II.23.1.15)
    pub struct TypeAttributes: u32 {
        /// Type is not visible outside its assembly
        const NOT_PUBLIC = 0x0000_0000;
        /// Type is visible outside its assembly
        const PUBLIC = 0x0000_0001;
        /// Type is abstract and cannot be instantiated
        const ABSTRACT = 0x0000_0080;
        /// Type cannot be inherited from
        const SEALED = 0x0000_0100;
    }
}

impl TypeAttributes {
    /// The visibility bits of the word.
    #[must_use]
    pub fn visibility(self) -> Self {
        Self::from_bits_truncate(self.bits() & TYPE_VISIBILITY_MASK)
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    /// Member access flags (ECMA-335 §II.23.1.10)
    pub struct MethodAccessFlags: u32 {
        /// Accessible only by the parent type
        const PRIVATE = 0x0001;
        /// Accessible by sub-types only in this assembly
        const FAM_AND_ASSEM = 0x0002;
        /// Accessible by anyone in the assembly
        const ASSEM = 0x0003;
        /// Accessible only by type and sub-types
        const FAMILY = 0x0004;
        /// Accessible by sub-types anywhere, plus anyone in the assembly
        const FAM_OR_ASSEM = 0x0005;
        /// Accessible by anyone who has visibility to this scope
        const PUBLIC = 0x0006;
    }
}

/// Visibility of a described type or member.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumCount, Display, IntoStaticStr,
)]
pub enum VisibilityScope {
    /// Visible only within the declaring type
    #[strum(serialize = "private")]
    Private,
    /// Visible within the declaring type and derived types
    #[strum(serialize = "protected")]
    Protected,
    /// Visible within the defining assembly
    #[strum(serialize = "internal")]
    Internal,
    /// Visible within the defining assembly and to derived types
    #[strum(serialize = "protected internal")]
    ProtectedInternal,
    /// Visible everywhere
    #[strum(serialize = "public")]
    Public,
}

impl VisibilityScope {
    /// Member access flags for this scope.
    #[must_use]
    pub fn to_method_access(self) -> MethodAccessFlags {
        match self {
            VisibilityScope::Private => MethodAccessFlags::PRIVATE,
            VisibilityScope::Protected => MethodAccessFlags::FAMILY,
            VisibilityScope::Internal => MethodAccessFlags::ASSEM,
            VisibilityScope::ProtectedInternal => MethodAccessFlags::FAM_OR_ASSEM,
            VisibilityScope::Public => MethodAccessFlags::PUBLIC,
        }
    }

    /// Top-level type visibility bits for this scope.
    ///
    /// Only [`VisibilityScope::Public`] escapes the assembly; every other scope collapses to
    /// `NOT_PUBLIC` for a top-level type.
    #[must_use]
    pub fn to_type_visibility(self) -> TypeAttributes {
        match self {
            VisibilityScope::Public => TypeAttributes::PUBLIC,
            _ => TypeAttributes::NOT_PUBLIC,
        }
    }
}
