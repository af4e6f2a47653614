//! Configuration for the body emitter.

/// What a forwarding body does when an instance callable cannot be bound to an adapter.
///
/// An adapter is constructed as the dispatch receiver only if the callable's declaring shape
/// equals the shape required by the forwarding method. Otherwise there is no receiver to
/// bind, and this policy decides the outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnboundReceiver {
    /// Refuse to attach the body ([`crate::Error::InvalidConfiguration`])
    #[default]
    Reject,
    /// Push a null receiver and dispatch anyway
    NullReceiver,
}

/// Configuration for [`crate::emitter::BodyEmitter`].
#[derive(Debug, Clone)]
pub struct EmitterConfig {
    /// Handling of instance callables without a bindable adapter (default: `Reject`).
    pub unbound_receiver: UnboundReceiver,

    /// Emit `box` before packing value-type arguments (default: true).
    pub box_value_types: bool,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            unbound_receiver: UnboundReceiver::Reject,
            box_value_types: true,
        }
    }
}

impl EmitterConfig {
    /// Set the unbound receiver policy.
    #[must_use]
    pub fn with_unbound_receiver(mut self, policy: UnboundReceiver) -> Self {
        self.unbound_receiver = policy;
        self
    }

    /// Enable or disable explicit boxing of value-type arguments.
    #[must_use]
    pub fn with_box_value_types(mut self, enabled: bool) -> Self {
        self.box_value_types = enabled;
        self
    }
}
