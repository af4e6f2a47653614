//! Built-in primitive types pre-registered by [`crate::metadata::typesystem::TypeRegistry`].

use strum::{EnumCount, EnumIter};

use crate::metadata::typesystem::{TypeInfo, TypeRef};

/// The primitive kinds every registry knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumCount)]
pub enum PrimitiveKind {
    /// `System.Object`, the root reference type
    Object,
    /// `System.String`
    String,
    /// `System.Boolean`
    Boolean,
    /// `System.Char`
    Char,
    /// `System.SByte`
    I1,
    /// `System.Byte`
    U1,
    /// `System.Int16`
    I2,
    /// `System.UInt16`
    U2,
    /// `System.Int32`
    I4,
    /// `System.UInt32`
    U4,
    /// `System.Int64`
    I8,
    /// `System.UInt64`
    U8,
    /// `System.Single`
    R4,
    /// `System.Double`
    R8,
}

impl PrimitiveKind {
    /// Fully qualified runtime name of the primitive.
    #[must_use]
    pub const fn fullname(&self) -> &'static str {
        match self {
            PrimitiveKind::Object => "System.Object",
            PrimitiveKind::String => "System.String",
            PrimitiveKind::Boolean => "System.Boolean",
            PrimitiveKind::Char => "System.Char",
            PrimitiveKind::I1 => "System.SByte",
            PrimitiveKind::U1 => "System.Byte",
            PrimitiveKind::I2 => "System.Int16",
            PrimitiveKind::U2 => "System.UInt16",
            PrimitiveKind::I4 => "System.Int32",
            PrimitiveKind::U4 => "System.UInt32",
            PrimitiveKind::I8 => "System.Int64",
            PrimitiveKind::U8 => "System.UInt64",
            PrimitiveKind::R4 => "System.Single",
            PrimitiveKind::R8 => "System.Double",
        }
    }

    /// Structural facts for the primitive.
    ///
    /// `Object` is an inheritable class, `String` a sealed class, everything else a value type.
    #[must_use]
    pub const fn info(&self) -> TypeInfo {
        match self {
            PrimitiveKind::Object => TypeInfo::class(),
            PrimitiveKind::String => TypeInfo::sealed_class(),
            _ => TypeInfo::value_type(),
        }
    }

    /// A handle for the primitive.
    #[must_use]
    pub fn type_ref(&self) -> TypeRef {
        TypeRef::new(self.fullname())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::typesystem::TypeFlavor;
    use strum::IntoEnumIterator;

    #[test]
    fn test_primitive_flavors() {
        assert_eq!(PrimitiveKind::Object.info().flavor, TypeFlavor::Class);
        assert!(!PrimitiveKind::Object.info().sealed);
        assert!(PrimitiveKind::String.info().sealed);
        assert_eq!(PrimitiveKind::I4.info().flavor, TypeFlavor::ValueType);
    }

    #[test]
    fn test_primitive_names_unique() {
        let mut names: Vec<&str> = PrimitiveKind::iter().map(|p| p.fullname()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), PrimitiveKind::COUNT);
    }
}
