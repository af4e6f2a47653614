//! Method body synthesis.
//!
//! The [`BodyEmitter`] attaches instruction-emission callbacks to method descriptors. It has
//! two entry points that both end with a body attached to the method:
//!
//! - [`BodyEmitter::forward`] synthesizes a thunk that packs every argument into an object
//!   array and dispatches it late-bound to an existing callable, returning its result
//! - [`BodyEmitter::attach`] stores a caller-written callback unmodified
//!
//! Receiver binding for instance callables is decided up front and reported as an
//! [`AdapterOutcome`]; [`EmitterConfig`] controls what happens when no adapter can be bound.

mod config;
mod forward;

pub use crate::builders::MethodBody;
pub use config::{EmitterConfig, UnboundReceiver};
pub use forward::{AdapterOutcome, BodyEmitter, ForwardPlan};
