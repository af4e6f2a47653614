//! Type-information provider trait and its in-memory default implementation.
//!
//! The descriptor graph and the body emitter never inspect a host runtime directly. Every
//! question about an existing type or callable goes through [`TypeInfoProvider`], so a
//! generator can plug in whatever reflection facility its runtime offers. [`TypeRegistry`]
//! is a plain in-memory provider populated up front.

use std::collections::HashMap;

use strum::IntoEnumIterator;

use crate::metadata::typesystem::{
    CallableInfo, CallableRef, PrimitiveKind, TypeFlavor, TypeInfo, TypeRef,
};

/// Source of structural information about existing types and callables.
pub trait TypeInfoProvider {
    /// Structural facts about `ty`, or `None` if the type is unknown.
    fn type_info(&self, ty: &TypeRef) -> Option<TypeInfo>;

    /// Shape of `callable`, or `None` if the callable is unknown.
    fn callable_info(&self, callable: &CallableRef) -> Option<&CallableInfo>;

    /// Returns `true` if the provider knows `ty`.
    fn is_resolved(&self, ty: &TypeRef) -> bool {
        self.type_info(ty).is_some()
    }

    /// Returns `true` if `ty` is a known interface.
    fn is_interface(&self, ty: &TypeRef) -> bool {
        self.type_info(ty)
            .is_some_and(|info| info.flavor == TypeFlavor::Interface)
    }

    /// Returns `true` if `ty` is known and non-inheritable.
    fn is_sealed(&self, ty: &TypeRef) -> bool {
        self.type_info(ty).is_some_and(|info| info.sealed)
    }

    /// Returns `true` if `ty` is a known value type.
    fn is_value_type(&self, ty: &TypeRef) -> bool {
        self.type_info(ty)
            .is_some_and(|info| info.flavor == TypeFlavor::ValueType)
    }
}

/// In-memory [`TypeInfoProvider`].
///
/// A new registry knows every [`PrimitiveKind`]. Further types and callables are registered
/// before the registry is shared with builders and emitters.
///
/// # Examples
///
/// ```rust
/// use dotforge::metadata::typesystem::{
///     CallableInfo, PrimitiveKind, ReturnKind, TypeInfoProvider, TypeRegistry,
/// };
///
/// let mut registry = TypeRegistry::new();
/// let disposable = registry.interface("System", "IDisposable");
/// let string = registry.primitive(PrimitiveKind::String);
///
/// let log = registry.callable(CallableInfo::adapter_invoke(
///     "log",
///     vec![string.clone()],
///     ReturnKind::Void,
/// ));
///
/// assert!(registry.is_interface(&disposable));
/// assert!(registry.is_sealed(&string));
/// assert!(registry.callable_info(&log).is_some());
/// ```
#[derive(Debug, Clone)]
pub struct TypeRegistry {
    types: HashMap<TypeRef, TypeInfo>,
    callables: HashMap<CallableRef, CallableInfo>,
}

impl TypeRegistry {
    /// Create a registry with every primitive pre-registered.
    #[must_use]
    pub fn new() -> Self {
        let mut registry = TypeRegistry {
            types: HashMap::new(),
            callables: HashMap::new(),
        };

        for primitive in PrimitiveKind::iter() {
            registry.types.insert(primitive.type_ref(), primitive.info());
        }

        registry
    }

    /// Handle for a primitive type.
    #[must_use]
    pub fn primitive(&self, kind: PrimitiveKind) -> TypeRef {
        kind.type_ref()
    }

    /// Register (or re-register) a type with explicit structural facts.
    pub fn register(&mut self, ty: TypeRef, info: TypeInfo) -> TypeRef {
        self.types.insert(ty.clone(), info);
        ty
    }

    /// Register an inheritable class.
    pub fn class(&mut self, namespace: &str, name: &str) -> TypeRef {
        self.register(TypeRef::from_parts(namespace, name), TypeInfo::class())
    }

    /// Register a non-inheritable class.
    pub fn sealed_class(&mut self, namespace: &str, name: &str) -> TypeRef {
        self.register(TypeRef::from_parts(namespace, name), TypeInfo::sealed_class())
    }

    /// Register an interface.
    pub fn interface(&mut self, namespace: &str, name: &str) -> TypeRef {
        self.register(TypeRef::from_parts(namespace, name), TypeInfo::interface())
    }

    /// Register a value type.
    pub fn value_type(&mut self, namespace: &str, name: &str) -> TypeRef {
        self.register(TypeRef::from_parts(namespace, name), TypeInfo::value_type())
    }

    /// Register a callable, returning its handle. Re-registering a name replaces the shape.
    pub fn callable(&mut self, info: CallableInfo) -> CallableRef {
        let handle = CallableRef::new(&info.name);
        self.callables.insert(handle.clone(), info);
        handle
    }

    /// Look up a registered type by its fully qualified name.
    #[must_use]
    pub fn type_by_name(&self, fullname: &str) -> Option<TypeRef> {
        let probe = TypeRef::new(fullname);
        self.types.contains_key(&probe).then_some(probe)
    }

    /// Look up a registered callable by name.
    #[must_use]
    pub fn callable_by_name(&self, name: &str) -> Option<CallableRef> {
        let probe = CallableRef::new(name);
        self.callables.contains_key(&probe).then_some(probe)
    }

    /// Number of registered types, primitives included.
    #[must_use]
    pub fn type_count(&self) -> usize {
        self.types.len()
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeInfoProvider for TypeRegistry {
    fn type_info(&self, ty: &TypeRef) -> Option<TypeInfo> {
        self.types.get(ty).copied()
    }

    fn callable_info(&self, callable: &CallableRef) -> Option<&CallableInfo> {
        self.callables.get(callable)
    }
}
