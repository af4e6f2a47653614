//! Type-system handles and the type-information provider seam.
//!
//! Nothing in this crate reflects over a live runtime. Types and callables are referred to by
//! opaque handles ([`TypeRef`], [`CallableRef`]) and every structural question is answered by
//! a [`TypeInfoProvider`]. [`TypeRegistry`] is the in-memory default provider.
//!
//! # Key Components
//!
//! - [`TypeRef`] - Nominal handle to an existing type
//! - [`TypeInfo`] / [`TypeFlavor`] - Interface / sealed / value-type facts
//! - [`ReturnKind`] - "no value" or "value of type R"
//! - [`CallableRef`] / [`CallableInfo`] - Existing callables and their shapes
//! - [`AdapterShape`] - Fixed n-ary action / function call shapes
//! - [`TypeInfoProvider`] / [`TypeRegistry`] - Injectable introspection
//!
//! # Examples
//!
//! ```rust
//! use dotforge::metadata::typesystem::{TypeInfoProvider, TypeRegistry};
//!
//! let mut registry = TypeRegistry::new();
//! let base = registry.class("Acme", "Base");
//! assert!(!registry.is_sealed(&base));
//! ```

mod base;
mod callable;
mod primitives;
mod registry;

use std::sync::Arc;

pub use base::{ReturnKind, TypeFlavor, TypeInfo, TypeRef};
pub use callable::{AdapterShape, CallableInfo, CallableRef, DeclaringType};
pub use primitives::PrimitiveKind;
pub use registry::{TypeInfoProvider, TypeRegistry};

/// Shared handle to a type-information provider
pub type TypeInfoProviderRc = Arc<dyn TypeInfoProvider>;
