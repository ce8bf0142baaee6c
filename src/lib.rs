//! `objforge`: a typed shim over the Objective-C runtime.
//!
//! `objforge` exposes the runtime's dynamic dispatch mechanism to Rust:
//! message sending, dynamic class construction, instance-variable and
//! protocol manipulation. It mirrors the semantics of the external
//! object model - reference-counted objects, interned selectors,
//! dynamically built classes - faithfully enough that Rust code can
//! invoke and extend the runtime's objects. It provides:
//!
//! - **Type-Encoding Generation** mapping static Rust types to the
//!   runtime's textual signature grammar
//! - **Dynamic Class Building** as an explicit lifecycle state machine
//!   (allocate, configure, register, retire)
//! - **Typed Message Dispatch** by selector name or token, including
//!   super-dispatch and deferred-return-type calls
//! - **Ownership Helpers** delegating reference counting to the runtime
//!
//! # Architecture
//!
//! The crate is two layers over one boundary:
//!
//! - [`ffi`]: the runtime's raw C entry points, and nothing else
//! - [`runtime`]: the typed surface - encodings, selectors, classes,
//!   objects, dispatch, protocols
//!
//! Dispatch trusts its caller: declared types are reinterpreted over
//! the implementation pointer without any runtime checking, exactly as
//! the underlying call protocol works. The dispatch helpers are
//! `unsafe fn` for that reason.
//!
//! The encoding generator is pure Rust and available on every
//! platform; the rest compiles on macOS, where `libobjc` lives.
//!
//! # Example
//!
//! ```
//! use objforge::runtime::encoding::{method_signature, Encode};
//!
//! assert_eq!(i32::encoding().as_str(), "i");
//! assert_eq!(<*mut f64>::encoding().as_str(), "^d");
//! assert_eq!(method_signature::<(), (f64,)>().as_str(), "v@:d");
//! ```

pub mod error;
#[cfg(target_os = "macos")]
pub mod ffi;
pub mod runtime;

// Re-export commonly used types
pub use error::{Error, Result};
pub use runtime::encoding::{Encode, EncodeArgs, EncodeTag, Encoding, Nil};

#[cfg(target_os = "macos")]
pub use runtime::{
    class::{
        Class, ClassBuilder, Delegate, NotificationDelegate, OBSERVATION_SUBCLASS_PREFIX,
    },
    dispatch::{
        DefaultReturn, Imp, Invocation, MessageArgs, Super, class_property, create_object,
        send_base_message, send_class_message, send_message, send_super_message,
    },
    object::{
        Id, OwnedObject, attach_delegate, delegate_mut, nil, release, reset, retain,
        retain_count,
    },
    protocol::Protocol,
    selector::{Sel, ToSelector},
};
