//! # dotforge Prelude
//!
//! This module provides a convenient prelude for the most commonly used types and traits
//! from the dotforge library. Import it to describe a type and attach method bodies without
//! spelling out module paths.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all dotforge operations
pub use crate::Error;

/// The result type used throughout dotforge
pub use crate::Result;

// ================================================================================================
// Type System
// ================================================================================================

/// Type and callable handles, shapes and the provider seam
pub use crate::metadata::typesystem::{
    AdapterShape, CallableInfo, CallableRef, DeclaringType, PrimitiveKind, ReturnKind,
    TypeFlavor, TypeInfo, TypeInfoProvider, TypeInfoProviderRc, TypeRef, TypeRegistry,
};

// ================================================================================================
// Descriptor Graph
// ================================================================================================

/// The type descriptor and its member builders
pub use crate::builders::{
    ConstructorBuilder, ConstructorDescriptor, ConstructorId, InheritanceEdge, MethodBuilder,
    MethodDescriptor, MethodId, ParameterDescriptor, PropertyBuilder, PropertyDescriptor,
    PropertyId, TypeDescriptor, VisibilityScope,
};

// ================================================================================================
// Body Emission
// ================================================================================================

/// Body emitter, its configuration and outcomes
pub use crate::emitter::{
    AdapterOutcome, BodyEmitter, EmitterConfig, ForwardPlan, MethodBody, UnboundReceiver,
};

/// Stream writer and finished bodies
pub use crate::assembly::{InstructionEncoder, LocalPurpose, MethodCode, OpCode, Operand};
