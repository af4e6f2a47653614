//! Shared fixtures and a reference stack machine for unit tests.


use std::sync::Arc;

use crate::metadata::typesystem::{
    CallableInfo, CallableRef, PrimitiveKind, ReturnKind, TypeInfoProviderRc, TypeRef,
    TypeRegistry,
};

/// A registry populated with a small, fixed set of types and callables.
pub struct Fixture {
    pub registry: TypeRegistry,
    /// Inheritable class `Acme.Base`
    pub base: TypeRef,
    /// Inheritable class `Acme.OtherBase`
    pub other_base: TypeRef,
    /// Interface `Acme.IService`
    pub interface: TypeRef,
    /// Sealed class `Acme.Final`
    pub sealed: TypeRef,
    /// Adapter invoke `() -> void`
    pub notify: CallableRef,
    /// Adapter invoke `(string) -> void`
    pub greet: CallableRef,
    /// Adapter invoke `(string) -> string`
    pub echo: CallableRef,
    /// Adapter invoke `(int) -> int`
    pub square: CallableRef,
    /// Static `Acme.Base::join(string, string) -> void`
    pub static_join: CallableRef,
    /// Instance `Acme.Base::instance_greet(string) -> void`
    pub instance_greet: CallableRef,
}

pub fn fixture_registry() -> Fixture {
    let mut registry = TypeRegistry::new();
    let string = registry.primitive(PrimitiveKind::String);
    let int = registry.primitive(PrimitiveKind::I4);

    let base = registry.class("Acme", "Base");
    let other_base = registry.class("Acme", "OtherBase");
    let interface = registry.interface("Acme", "IService");
    let sealed = registry.sealed_class("Acme", "Final");

    let notify = registry.callable(CallableInfo::adapter_invoke(
        "notify",
        Vec::new(),
        ReturnKind::Void,
    ));
    let greet = registry.callable(CallableInfo::adapter_invoke(
        "greet",
        vec![string.clone()],
        ReturnKind::Void,
    ));
    let echo = registry.callable(CallableInfo::adapter_invoke(
        "echo",
        vec![string.clone()],
        ReturnKind::Value(string.clone()),
    ));
    let square = registry.callable(CallableInfo::adapter_invoke(
        "square",
        vec![int.clone()],
        ReturnKind::Value(int),
    ));
    let static_join = registry.callable(CallableInfo::static_method(
        "join",
        base.clone(),
        vec![string.clone(), string.clone()],
        ReturnKind::Void,
    ));
    let instance_greet = registry.callable(CallableInfo::instance_method(
        "instance_greet",
        base.clone(),
        vec![string],
        ReturnKind::Void,
    ));

    Fixture {
        registry,
        base,
        other_base,
        interface,
        sealed,
        notify,
        greet,
        echo,
        square,
        static_join,
        instance_greet,
    }
}

/// A provider knowing only the primitive types.
pub fn registry_rc() -> TypeInfoProviderRc {
    Arc::new(TypeRegistry::new())
}
