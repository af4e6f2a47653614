// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![deny(unsafe_code)]

//! # dotforge
//!
//! A fluent builder for describing types that a runtime code generator will synthesize,
//! paired with a body emitter that turns "forward every argument to this existing callable"
//! into a linear stack-machine instruction sequence.
//!
//! ## Features
//!
//! - **Descriptor graph** - Visibility, sealed / abstract markers, base type, interfaces,
//!   constructors, methods and properties, with every structural rule checked up front
//! - **Fluent chaining** - Member builders hand back their owning type through `and()`
//! - **Forwarding thunks** - Receiver setup, argument packing, late-bound dispatch and return
//!   emitted as a single basic block
//! - **Injectable introspection** - Every question about existing types and callables goes
//!   through a [`metadata::typesystem::TypeInfoProvider`]
//! - **Validating stream writer** - Operand checks, stack-depth tracking and symbolic locals
//!
//! ## Architecture
//!
//! - [`metadata::typesystem`] - Type and callable handles plus the provider seam
//! - [`builders`] - [`builders::TypeDescriptor`] and its child descriptors
//! - [`assembly`] - The abstract instruction set and [`assembly::InstructionEncoder`]
//! - [`emitter`] - [`emitter::BodyEmitter`] and its configuration
//!
//! Data flows one way: a caller configures a type descriptor, the body emitter attaches a
//! body callback to each method, and the finished graph is handed to an external generator
//! which invokes every callback with its own encoder.
//!
//! ## Quick Start
//!
//! ```rust
//! use dotforge::prelude::*;
//! use std::sync::Arc;
//!
//! let mut registry = TypeRegistry::new();
//! let string = registry.primitive(PrimitiveKind::String);
//! let greet = registry.callable(CallableInfo::adapter_invoke(
//!     "greet",
//!     vec![string.clone()],
//!     ReturnKind::Value(string.clone()),
//! ));
//! let provider: TypeInfoProviderRc = Arc::new(registry);
//!
//! let emitter = BodyEmitter::new(provider.clone());
//! let mut ty = TypeDescriptor::new(provider);
//! ty.set_name("Greeter")
//!     .set_visibility(VisibilityScope::Public)
//!     .declare_forwarding_method(&emitter, &greet)?
//!     .visibility(VisibilityScope::Public)
//!     .name("Greet")
//!     .and();
//!
//! let code = ty.methods()[0].build_body()?;
//! println!("{code}");
//! # Ok::<(), dotforge::Error>(())
//! ```
//!
//! ## Logging
//!
//! The crate logs through the [`log`] facade: structural changes at `debug`, planned
//! receivers and emitted instructions at `trace`, replaced bodies and null receivers at
//! `warn`. No logger is installed by the library.

#[macro_use]
pub(crate) mod error;

/// Shared functionality which is used in unit tests
#[cfg(test)]
pub(crate) mod test;

/// Convenient re-exports of the most commonly used types and traits.
///
/// # Example
///
/// ```rust
/// use dotforge::prelude::*;
/// use std::sync::Arc;
///
/// let ty = TypeDescriptor::new(Arc::new(TypeRegistry::new()));
/// assert_eq!(ty.visibility(), VisibilityScope::Internal);
/// ```
pub mod prelude;

/// Abstract stack-machine instruction set and the validating stream writer.
pub mod assembly;

/// Fluent descriptor graph: types, constructors, methods and properties.
pub mod builders;

/// Method body synthesis: forwarding thunks and manual bodies.
pub mod emitter;

/// Type and callable metadata consumed by the builders and the emitter.
pub mod metadata;

/// `dotforge` Result type
///
/// A type alias for `std::result::Result<T, Error>` where the error type is always
/// [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// `dotforge` Error type
///
/// The main error type for all operations in this crate.
///
/// # Examples
///
/// ```rust
/// use dotforge::{Error, builders::ParameterDescriptor, metadata::typesystem::TypeRef};
///
/// match ParameterDescriptor::new("", TypeRef::new("System.Int32")) {
///     Ok(_) => println!("created"),
///     Err(Error::InvalidArgument(message)) => println!("rejected: {message}"),
///     Err(e) => println!("Error: {e}"),
/// }
/// ```
pub use error::Error;
