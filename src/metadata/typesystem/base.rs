//! Core type handles used throughout the descriptor graph.
//!
//! A [`TypeRef`] is an opaque, nominal handle to a type that already exists in the host
//! runtime. It carries no structural information of its own; questions such as "is this an
//! interface?" are answered by a [`crate::metadata::typesystem::TypeInfoProvider`].

use std::{fmt, sync::Arc};

/// Opaque nominal reference to an existing runtime type.
///
/// Two `TypeRef`s are equal when their full names are equal. Cloning is cheap, the name is
/// shared.
///
/// # Examples
///
/// ```rust
/// use dotforge::metadata::typesystem::TypeRef;
///
/// let a = TypeRef::new("System.String");
/// let b = TypeRef::new("System.String");
/// assert_eq!(a, b);
/// assert_eq!(a.name(), "String");
/// assert_eq!(a.namespace(), "System");
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeRef {
    fullname: Arc<str>,
}

impl TypeRef {
    /// Create a handle from a fully qualified name (`Namespace.Name`).
    #[must_use]
    pub fn new(fullname: &str) -> Self {
        TypeRef {
            fullname: Arc::from(fullname),
        }
    }

    /// Create a handle from a namespace and a simple name.
    ///
    /// An empty namespace yields the bare name.
    #[must_use]
    pub fn from_parts(namespace: &str, name: &str) -> Self {
        if namespace.is_empty() {
            Self::new(name)
        } else {
            Self::new(&format!("{namespace}.{name}"))
        }
    }

    /// The fully qualified name.
    #[must_use]
    pub fn fullname(&self) -> &str {
        &self.fullname
    }

    /// The simple name, without namespace.
    #[must_use]
    pub fn name(&self) -> &str {
        match self.fullname.rfind('.') {
            Some(pos) => &self.fullname[pos + 1..],
            None => &self.fullname,
        }
    }

    /// The namespace, or an empty string for the global namespace.
    #[must_use]
    pub fn namespace(&self) -> &str {
        match self.fullname.rfind('.') {
            Some(pos) => &self.fullname[..pos],
            None => "",
        }
    }
}

impl fmt::Debug for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeRef({})", self.fullname)
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.fullname)
    }
}

/// Broad classification of a runtime type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeFlavor {
    /// Reference type that can serve as a base class
    Class,
    /// Interface type, can only be implemented
    Interface,
    /// Value type (struct / primitive); boxed when stored as an object
    ValueType,
}

/// Structural facts about a type, as reported by a type-information provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeInfo {
    /// The flavor of the type
    pub flavor: TypeFlavor,
    /// Whether the type is marked non-inheritable
    pub sealed: bool,
}

impl TypeInfo {
    /// An inheritable class.
    #[must_use]
    pub const fn class() -> Self {
        TypeInfo {
            flavor: TypeFlavor::Class,
            sealed: false,
        }
    }

    /// A non-inheritable class.
    #[must_use]
    pub const fn sealed_class() -> Self {
        TypeInfo {
            flavor: TypeFlavor::Class,
            sealed: true,
        }
    }

    /// An interface.
    #[must_use]
    pub const fn interface() -> Self {
        TypeInfo {
            flavor: TypeFlavor::Interface,
            sealed: false,
        }
    }

    /// A value type. Value types are implicitly sealed.
    #[must_use]
    pub const fn value_type() -> Self {
        TypeInfo {
            flavor: TypeFlavor::ValueType,
            sealed: true,
        }
    }

    /// Returns `true` for interfaces.
    #[must_use]
    pub fn is_interface(&self) -> bool {
        self.flavor == TypeFlavor::Interface
    }

    /// Returns `true` for value types.
    #[must_use]
    pub fn is_value_type(&self) -> bool {
        self.flavor == TypeFlavor::ValueType
    }
}

/// What a method or callable produces.
///
/// Either "no value" ([`ReturnKind::Void`]) or a value of a specific type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum ReturnKind {
    /// The callable produces no value
    #[default]
    Void,
    /// The callable produces a value of the given type
    Value(TypeRef),
}

impl ReturnKind {
    /// Returns `true` for [`ReturnKind::Void`].
    #[must_use]
    pub fn is_void(&self) -> bool {
        matches!(self, ReturnKind::Void)
    }

    /// The produced type, if any.
    #[must_use]
    pub fn value_type(&self) -> Option<&TypeRef> {
        match self {
            ReturnKind::Void => None,
            ReturnKind::Value(ty) => Some(ty),
        }
    }
}

impl From<TypeRef> for ReturnKind {
    fn from(ty: TypeRef) -> Self {
        ReturnKind::Value(ty)
    }
}

impl fmt::Display for ReturnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReturnKind::Void => f.write_str("void"),
            ReturnKind::Value(ty) => write!(f, "{ty}"),
        }
    }
}
