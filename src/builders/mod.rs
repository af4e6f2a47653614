//! Fluent builders for the descriptor graph.
//!
//! This module provides the in-memory model of a type that an external generator will
//! materialize later. A [`TypeDescriptor`] owns every child descriptor; children are created
//! only through its `declare_*` factories, keep a stable id for the whole session, and are
//! never removed.
//!
//! # Key Components
//!
//! - [`TypeDescriptor`] - Aggregate root enforcing the structural rules of the type
//! - [`ConstructorBuilder`] / [`MethodBuilder`] / [`PropertyBuilder`] - Member builders with
//!   an `and()` handle back to the owning type
//! - [`ParameterDescriptor`] - Validated (name, type) pair
//! - [`InheritanceEdge`] - The single base-type relationship
//! - [`VisibilityScope`] - Access tag, with ECMA-335 encodings for the generator
//!
//! # Examples
//!
//! ```rust
//! use dotforge::prelude::*;
//! use std::sync::Arc;
//!
//! let registry = TypeRegistry::new();
//! let int = registry.primitive(PrimitiveKind::I4);
//! let mut ty = TypeDescriptor::new(Arc::new(registry));
//!
//! let method = ty
//!     .declare_method(Some("Reset"), None, None)?
//!     .visibility(VisibilityScope::Public)
//!     .and()
//!     .declare_constructor(Some(VisibilityScope::Protected))
//!     .takes_named("seed", int)?
//!     .and()
//!     .methods()[0]
//!     .id();
//!
//! assert_eq!(ty.method(method).map(MethodDescriptor::visibility), Some(VisibilityScope::Public));
//! # Ok::<(), dotforge::Error>(())
//! ```

mod constructor;
mod inheritance;
mod method;
mod parameter;
mod property;
mod typedef;
mod visibility;

pub use constructor::{ConstructorBuilder, ConstructorDescriptor, ConstructorId};
pub use inheritance::InheritanceEdge;
pub use method::{MethodBody, MethodBuilder, MethodDescriptor, MethodId};
pub use parameter::ParameterDescriptor;
pub use property::{PropertyBuilder, PropertyDescriptor, PropertyId};
pub use typedef::TypeDescriptor;
pub use visibility::{MethodAccessFlags, TypeAttributes, VisibilityScope, TYPE_VISIBILITY_MASK};
