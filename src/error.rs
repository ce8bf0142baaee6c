//! Error types for the `objforge` shim.
//!
//! This module defines the error types used throughout the crate. The
//! underlying runtime reports failure as a boolean or a null handle;
//! every such boundary is surfaced here as a structured variant so
//! callers can tell *which* runtime call refused, and why the shim
//! stopped.
//!
//! Message dispatch itself has no error channel: a selector/type
//! mismatch is undefined behavior by contract, never an `Error`.

use thiserror::Error;

/// Errors that can occur while driving the runtime.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A name contained an interior NUL byte and cannot cross the C boundary.
    #[error("invalid runtime name {name:?}: interior NUL byte")]
    InvalidName {
        /// The offending name.
        name: String,
    },

    /// No class with this name is registered with the runtime.
    #[error("class not found: {name}")]
    ClassNotFound {
        /// The class name that was looked up.
        name: String,
    },

    /// The runtime refused to allocate a new class pair.
    #[error("failed to allocate class pair {name} (name in use or superclass invalid)")]
    ClassAllocationFailed {
        /// The generated name passed to the allocation call.
        name: String,
    },

    /// A configuration call arrived after the class was registered,
    /// or registration was attempted twice.
    #[error("class {name} is already registered; it can no longer be configured")]
    AlreadyRegistered {
        /// The builder's class name.
        name: String,
    },

    /// An operation that needs a registered class ran on an unregistered builder.
    #[error("class {name} is not registered yet")]
    NotRegistered {
        /// The builder's class name.
        name: String,
    },

    /// The runtime rejected an instance-variable addition.
    #[error("failed to add instance variable {name}")]
    IvarAdditionFailed {
        /// The instance-variable name.
        name: String,
    },

    /// The runtime rejected a method addition.
    #[error("failed to add method for selector {selector}")]
    MethodAdditionFailed {
        /// The selector name.
        selector: String,
    },

    /// No protocol with this name is known to the runtime.
    #[error("protocol not found: {name}")]
    ProtocolNotFound {
        /// The protocol name that was looked up.
        name: String,
    },

    /// The runtime refused to allocate a protocol under this name.
    #[error("failed to allocate protocol {name}")]
    ProtocolAllocationFailed {
        /// The protocol name.
        name: String,
    },

    /// The runtime rejected a protocol conformance addition.
    #[error("failed to add protocol {name} to class")]
    ProtocolAdditionFailed {
        /// The protocol name.
        name: String,
    },

    /// Instance creation returned a null handle.
    #[error("failed to create an instance of {class}")]
    InstanceCreationFailed {
        /// The class name.
        class: String,
    },

    /// The receiver's class has no instance variable with this name.
    #[error("instance variable not found: {name}")]
    IvarNotFound {
        /// The instance-variable name.
        name: String,
    },

    /// A typed instance-variable access did not match the slot's declared width.
    #[error("instance variable size mismatch: slot holds {expected} bytes, access was {actual} bytes")]
    IvarSizeMismatch {
        /// Byte width declared by the slot's type encoding.
        expected: usize,
        /// Byte width of the Rust type used for the access.
        actual: usize,
    },

    /// A type-encoding string is malformed or not a valid method signature.
    #[error("invalid type encoding")]
    InvalidEncoding,
}

/// Result type for objforge operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            format!(
                "{}",
                Error::ClassNotFound {
                    name: "NSFileManager".into()
                }
            ),
            "class not found: NSFileManager"
        );
        assert_eq!(
            format!(
                "{}",
                Error::IvarSizeMismatch {
                    expected: 8,
                    actual: 4
                }
            ),
            "instance variable size mismatch: slot holds 8 bytes, access was 4 bytes"
        );
        assert_eq!(format!("{}", Error::InvalidEncoding), "invalid type encoding");
    }

    #[test]
    fn test_error_equality() {
        assert_eq!(Error::InvalidEncoding, Error::InvalidEncoding);
        assert_ne!(
            Error::ClassNotFound {
                name: "A".into()
            },
            Error::ClassNotFound {
                name: "B".into()
            }
        );
    }
}
