//! Protocol lookup, allocation and registration.
//!
//! Protocols are runtime-global interface descriptions. This layer
//! only moves handles around: look one up by name, force-allocate and
//! register one that the runtime does not know yet (the builder's
//! `force` path), and attach conformance to a class under
//! construction. Conformance checking itself stays with the runtime.

use crate::error::{Error, Result};
use crate::ffi;
use crate::runtime::runtime_name;
use std::ffi::CString;
use std::fmt;
use std::ptr::NonNull;

/// A handle to a runtime protocol.
///
/// Like [`Class`](crate::runtime::class::Class), protocol handles are
/// plain pointers into runtime-owned tables: `Copy`, identity-compared,
/// and never owned by this layer.
#[repr(transparent)]
#[derive(Copy, Clone)]
pub struct Protocol(NonNull<ffi::objc_object>);

impl Protocol {
    /// Looks up a registered protocol by name.
    #[must_use]
    pub fn get(name: &str) -> Option<Protocol> {
        let cname = CString::new(name).ok()?;
        // SAFETY: cname is NUL-terminated; the runtime returns null for
        // unknown names.
        let ptr = unsafe { ffi::objc_getProtocol(cname.as_ptr()) };
        NonNull::new(ptr).map(Protocol)
    }

    /// Allocates a new, not-yet-registered protocol.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ProtocolAllocationFailed`] when the runtime
    /// refuses (typically because the name is already taken),
    /// [`Error::InvalidName`] for an interior NUL byte.
    pub fn allocate(name: &str) -> Result<Protocol> {
        let cname = runtime_name(name)?;
        // SAFETY: cname is NUL-terminated.
        let ptr = unsafe { ffi::objc_allocateProtocol(cname.as_ptr()) };
        NonNull::new(ptr).map(Protocol).ok_or_else(|| Error::ProtocolAllocationFailed {
            name: name.to_string(),
        })
    }

    /// Registers an allocated protocol, making it visible process-wide.
    pub fn register(&self) {
        // SAFETY: the handle came from objc_allocateProtocol.
        unsafe { ffi::objc_registerProtocol(self.as_ptr()) };
    }

    /// Wraps a raw protocol pointer received from the runtime.
    ///
    /// # Safety
    ///
    /// `ptr` must be a protocol handle obtained from the runtime.
    #[must_use]
    pub unsafe fn from_ptr(ptr: *mut ffi::objc_object) -> Option<Protocol> {
        NonNull::new(ptr).map(Protocol)
    }

    /// Returns the raw protocol pointer.
    #[inline]
    #[must_use]
    pub fn as_ptr(&self) -> *mut ffi::objc_object {
        self.0.as_ptr()
    }
}

// SAFETY: Protocol is a handle into runtime-global tables with
// thread-safe accessors; the wrapper holds no other state.
unsafe impl Send for Protocol {}
unsafe impl Sync for Protocol {}

impl PartialEq for Protocol {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.0.as_ptr(), other.0.as_ptr())
    }
}

impl Eq for Protocol {}

impl fmt::Debug for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Protocol").field(&self.0.as_ptr()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::class::Class;

    #[test]
    fn test_known_protocol_lookup() {
        // The NSObject protocol ships with the runtime
        let protocol = Protocol::get("NSObject").unwrap();
        let class = Class::get("NSObject").unwrap();
        assert!(class.conforms_to(protocol));
    }

    #[test]
    fn test_unknown_protocol_lookup() {
        assert!(Protocol::get("ObjforgeNoSuchProtocol").is_none());
    }

    #[test]
    fn test_allocate_taken_name_fails() {
        let result = Protocol::allocate("NSObject");
        assert!(matches!(result, Err(Error::ProtocolAllocationFailed { .. })));
    }

    #[test]
    fn test_allocate_and_register() {
        let protocol = Protocol::allocate("ObjforgeRegisteredProtocol").unwrap();
        protocol.register();

        let found = Protocol::get("ObjforgeRegisteredProtocol").unwrap();
        assert_eq!(found, protocol);
    }
}
