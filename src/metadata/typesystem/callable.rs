//! Existing callables and the adapter shapes used to bind them.
//!
//! A [`CallableRef`] names a callable that already exists in the host runtime. Its shape
//! (static or instance, declaring type, parameters, return) is described by a
//! [`CallableInfo`] supplied by a type-information provider.
//!
//! An [`AdapterShape`] is the fixed call shape of an adapter object: an n-ary action over a
//! list of parameter types, or an n-ary function over those types producing a result. The
//! body emitter compares the required shape with the callable's declaring shape to decide
//! whether a bound adapter can serve as the dispatch receiver.

use std::{fmt, sync::Arc};

use crate::metadata::typesystem::{ReturnKind, TypeRef};

/// Opaque reference to an existing callable.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct CallableRef {
    name: Arc<str>,
}

impl CallableRef {
    /// Create a handle for the callable with the given unique name.
    #[must_use]
    pub fn new(name: &str) -> Self {
        CallableRef {
            name: Arc::from(name),
        }
    }

    /// The unique name of the callable.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for CallableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CallableRef({})", self.name)
    }
}

impl fmt::Display for CallableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Fixed call shape of an adapter object.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AdapterShape {
    /// Accepts the parameters and produces no value
    Action {
        /// Ordered parameter types
        parameters: Vec<TypeRef>,
    },
    /// Accepts the parameters and produces `result`
    Function {
        /// Ordered parameter types
        parameters: Vec<TypeRef>,
        /// Produced type
        result: TypeRef,
    },
}

impl AdapterShape {
    /// The adapter shape required to wrap a callable with the given signature.
    ///
    /// "No value" maps to an action, "value of type R" to a function producing R.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use dotforge::metadata::typesystem::{AdapterShape, ReturnKind, TypeRef};
    ///
    /// let int = TypeRef::new("System.Int32");
    /// let shape = AdapterShape::for_signature(&[int.clone()], &ReturnKind::Value(int.clone()));
    /// assert_eq!(shape.to_string(), "Func<System.Int32, System.Int32>");
    /// ```
    #[must_use]
    pub fn for_signature(parameters: &[TypeRef], return_kind: &ReturnKind) -> Self {
        match return_kind {
            ReturnKind::Void => AdapterShape::Action {
                parameters: parameters.to_vec(),
            },
            ReturnKind::Value(result) => AdapterShape::Function {
                parameters: parameters.to_vec(),
                result: result.clone(),
            },
        }
    }

    /// The ordered parameter types.
    #[must_use]
    pub fn parameters(&self) -> &[TypeRef] {
        match self {
            AdapterShape::Action { parameters } | AdapterShape::Function { parameters, .. } => {
                parameters
            }
        }
    }

    /// The produced type of a function shape.
    #[must_use]
    pub fn result(&self) -> Option<&TypeRef> {
        match self {
            AdapterShape::Action { .. } => None,
            AdapterShape::Function { result, .. } => Some(result),
        }
    }

    /// Number of parameters.
    #[must_use]
    pub fn arity(&self) -> usize {
        self.parameters().len()
    }
}

impl fmt::Display for AdapterShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (prefix, result) = match self {
            AdapterShape::Action { .. } => ("Action", None),
            AdapterShape::Function { result, .. } => ("Func", Some(result)),
        };

        let args: Vec<String> = self
            .parameters()
            .iter()
            .chain(result)
            .map(ToString::to_string)
            .collect();

        if args.is_empty() {
            f.write_str(prefix)
        } else {
            write!(f, "{prefix}<{}>", args.join(", "))
        }
    }
}

/// Where a callable is declared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclaringType {
    /// An ordinary type
    Type(TypeRef),
    /// An adapter type of the given shape (the callable is the adapter's invoke entry)
    Adapter(AdapterShape),
}

/// Shape of an existing callable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallableInfo {
    /// Unique name
    pub name: String,
    /// Static callables need no receiver
    pub is_static: bool,
    /// Declaring type or adapter shape
    pub declaring: DeclaringType,
    /// Ordered parameter types
    pub parameters: Vec<TypeRef>,
    /// What the callable produces
    pub return_kind: ReturnKind,
}

impl CallableInfo {
    /// A static callable declared on an ordinary type.
    #[must_use]
    pub fn static_method(
        name: &str,
        declaring: TypeRef,
        parameters: Vec<TypeRef>,
        return_kind: ReturnKind,
    ) -> Self {
        CallableInfo {
            name: name.to_string(),
            is_static: true,
            declaring: DeclaringType::Type(declaring),
            parameters,
            return_kind,
        }
    }

    /// An instance callable declared on an ordinary type.
    #[must_use]
    pub fn instance_method(
        name: &str,
        declaring: TypeRef,
        parameters: Vec<TypeRef>,
        return_kind: ReturnKind,
    ) -> Self {
        CallableInfo {
            name: name.to_string(),
            is_static: false,
            declaring: DeclaringType::Type(declaring),
            parameters,
            return_kind,
        }
    }

    /// The invoke entry of an adapter object (a closure or delegate).
    ///
    /// The declaring shape is derived from the parameters and return kind, so a method
    /// forwarding with the same parameter types binds a receiver adapter.
    #[must_use]
    pub fn adapter_invoke(name: &str, parameters: Vec<TypeRef>, return_kind: ReturnKind) -> Self {
        let shape = AdapterShape::for_signature(&parameters, &return_kind);
        CallableInfo {
            name: name.to_string(),
            is_static: false,
            declaring: DeclaringType::Adapter(shape),
            parameters,
            return_kind,
        }
    }

    /// Returns `true` if the callable produces a value.
    #[must_use]
    pub fn returns_value(&self) -> bool {
        !self.return_kind.is_void()
    }

    /// The declaring adapter shape, if the callable is an adapter's invoke entry.
    #[must_use]
    pub fn declaring_shape(&self) -> Option<&AdapterShape> {
        match &self.declaring {
            DeclaringType::Adapter(shape) => Some(shape),
            DeclaringType::Type(_) => None,
        }
    }
}
