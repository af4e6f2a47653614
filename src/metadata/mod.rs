//! Type and callable metadata consumed by the builders and the body emitter.
//!
//! # Key Components
//!
//! - [`typesystem`] - Type handles, callable shapes and the type-information provider seam

/// Type handles, callable shapes and the provider interface
pub mod typesystem;
