//! `objforge` runtime surface.
//!
//! The runtime layer is organized into focused modules:
//!
//! - [`encoding`]: type-encoding generation (pure Rust, every platform)
//! - [`selector`]: selector interning and the process-wide name cache
//! - [`class`]: class handles and the dynamic class builder
//! - [`object`]: instance handles, ownership helpers, ivar access
//! - [`dispatch`]: message sending, super-dispatch, deferred calls
//! - [`protocol`]: protocol lookup and registration
//!
//! Everything except [`encoding`] talks to `libobjc` and is only
//! compiled on macOS; the encoding generator is a pure function of
//! static types and stays available everywhere (useful for building
//! and testing signatures off-target).

pub mod encoding;

#[cfg(target_os = "macos")]
pub mod class;
#[cfg(target_os = "macos")]
pub mod dispatch;
#[cfg(target_os = "macos")]
pub mod object;
#[cfg(target_os = "macos")]
pub mod protocol;
#[cfg(target_os = "macos")]
pub mod selector;

pub use encoding::{Encode, EncodeArgs, EncodeTag, Encoding, Nil};

#[cfg(target_os = "macos")]
pub use class::{Class, ClassBuilder, Delegate, NotificationDelegate};
#[cfg(target_os = "macos")]
pub use dispatch::{DefaultReturn, Imp, Invocation, MessageArgs, Super};
#[cfg(target_os = "macos")]
pub use object::{Id, OwnedObject};
#[cfg(target_os = "macos")]
pub use protocol::Protocol;
#[cfg(target_os = "macos")]
pub use selector::{Sel, ToSelector};

/// Converts a runtime-facing name into a C string.
#[cfg(target_os = "macos")]
pub(crate) fn runtime_name(name: &str) -> crate::error::Result<std::ffi::CString> {
    std::ffi::CString::new(name).map_err(|_| crate::error::Error::InvalidName {
        name: name.to_string(),
    })
}
