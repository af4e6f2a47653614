use thiserror::Error;

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

macro_rules! invalid_argument {
    ($msg:expr) => {
        crate::Error::InvalidArgument($msg.to_string())
    };

    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::InvalidArgument(format!($fmt, $($arg)*))
    };
}

macro_rules! invalid_config {
    ($msg:expr) => {
        crate::Error::InvalidConfiguration($msg.to_string())
    };

    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::InvalidConfiguration(format!($fmt, $($arg)*))
    };
}

macro_rules! invalid_state {
    ($msg:expr) => {
        crate::Error::InvalidState($msg.to_string())
    };

    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::InvalidState(format!($fmt, $($arg)*))
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// Every builder and emitter operation is fail-fast and atomic: it either fully succeeds or
/// returns one of these variants without having mutated the descriptor graph.
///
/// # Error Categories
///
/// ## Descriptor Graph Errors
/// - [`Error::InvalidArgument`] - A required input was missing, blank or unresolvable
/// - [`Error::InvalidConfiguration`] - A structural rule of the type was violated
/// - [`Error::InvalidState`] - The sealed / abstract markers conflict
///
/// ## Instruction Stream Errors
/// - [`Error::InvalidMnemonic`] - Unknown instruction mnemonic
/// - [`Error::InvalidOperand`] - Operand does not fit the instruction
/// - [`Error::StackUnderflow`] - An instruction popped more than the stack held
/// - [`Error::Malformed`] - The stream is structurally unusable (e.g. missing `ret`)
///
/// # Examples
///
/// ```rust
/// use dotforge::{prelude::*, Error};
/// use std::sync::Arc;
///
/// let mut registry = TypeRegistry::new();
/// let sealed = registry.sealed_class("Acme", "Final");
/// let mut ty = TypeDescriptor::new(Arc::new(registry));
///
/// match ty.declare_base_type(&sealed) {
///     Err(Error::InvalidConfiguration(message)) => println!("rejected: {message}"),
///     Err(e) => println!("other error: {e}"),
///     Ok(_) => unreachable!(),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    // Descriptor graph errors
    /// A required input was absent, blank, or could not be resolved.
    ///
    /// Raised for blank parameter names, unknown types or callables, and missing method
    /// descriptors or body callbacks handed to the emitter.
    #[error("Invalid argument - {0}")]
    InvalidArgument(String),

    /// A structural rule of the described type was violated.
    ///
    /// Raised when an interface is used as a base type, a non-interface is registered as an
    /// interface, a sealed type is inherited, or a second distinct base type is declared.
    /// Also raised when a forwarding body cannot bind a receiver under the configured policy.
    #[error("Invalid configuration - {0}")]
    InvalidConfiguration(String),

    /// The operation conflicts with the current state of the descriptor.
    ///
    /// Sealing an abstract type or marking a sealed type abstract.
    #[error("Invalid state - {0}")]
    InvalidState(String),

    // Instruction stream errors
    /// The mnemonic is not part of the instruction set.
    #[error("Invalid instruction mnemonic - {0}")]
    InvalidMnemonic(String),

    /// The operand does not match what the instruction expects.
    #[error("Invalid operand for '{mnemonic}' - expected {expected}")]
    InvalidOperand {
        /// The instruction the operand was supplied to
        mnemonic: &'static str,
        /// Description of the expected operand kind
        expected: &'static str,
    },

    /// An instruction would pop more values than the evaluation stack holds.
    #[error("Stack underflow at '{mnemonic}' (depth {depth})")]
    StackUnderflow {
        /// The instruction that underflowed
        mnemonic: &'static str,
        /// The stack depth before the instruction
        depth: u16,
    },

    /// The instruction stream is structurally invalid.
    ///
    /// The error includes the source location where the problem was detected.
    ///
    /// # Fields
    ///
    /// * `message` - Detailed description of what was malformed
    /// * `file` - Source file where the error was detected
    /// * `line` - Source line where the error was detected
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_macros_build_expected_variants() {
        let err = invalid_argument!("parameter '{}' is blank", "a");
        assert!(matches!(err, Error::InvalidArgument(ref m) if m == "parameter 'a' is blank"));

        let err = invalid_config!("interfaces cannot be inherited");
        assert!(matches!(err, Error::InvalidConfiguration(_)));

        let err = invalid_state!("already sealed");
        assert_eq!(err.to_string(), "Invalid state - already sealed");

        let err = malformed_error!("missing {}", "ret");
        match err {
            Error::Malformed { message, file, .. } => {
                assert_eq!(message, "missing ret");
                assert!(file.ends_with("error.rs"));
            }
            _ => panic!("expected Malformed"),
        }
    }
}
