//! Raw bindings to the Objective-C runtime's C entry points.
//!
//! Everything in this module is exactly the surface `libobjc` exports:
//! class pair allocation/registration/disposal, ivar/method/protocol
//! addition, selector interning, instance creation, instance-variable
//! accessors, and the super-dispatch entry point. The typed layer in
//! [`crate::runtime`] is built on these and nothing else.
//!
//! The handle types are opaque: the runtime owns their layout and this
//! crate never looks inside them.

#![allow(non_camel_case_types)]

use std::os::raw::{c_char, c_long, c_schar, c_ulong, c_void};

/// Opaque runtime class structure.
pub enum objc_class {}

/// Opaque runtime object structure (also used for `Protocol` handles).
pub enum objc_object {}

/// Opaque interned selector.
pub enum objc_selector {}

/// Opaque instance-variable descriptor.
pub enum objc_ivar {}

/// Untyped method implementation pointer.
///
/// Implementations are always stored and passed around as this untyped
/// function pointer and transmuted to their statically-known signature
/// at the call site; see [`crate::runtime::dispatch`].
pub type Imp = unsafe extern "C" fn();

/// The runtime's boolean type (a signed char on the C side).
pub type BOOL = c_schar;

/// Objective-C truth value.
pub const YES: BOOL = 1;
/// Objective-C false value.
pub const NO: BOOL = 0;

/// The platform's `NSInteger`.
pub type NSInteger = c_long;
/// The platform's `NSUInteger`.
pub type NSUInteger = c_ulong;

#[link(name = "objc", kind = "dylib")]
unsafe extern "C" {
    pub fn sel_registerName(name: *const c_char) -> *const objc_selector;
    pub fn sel_getName(sel: *const objc_selector) -> *const c_char;

    pub fn objc_getClass(name: *const c_char) -> *mut objc_class;
    pub fn objc_getMetaClass(name: *const c_char) -> *mut objc_class;
    pub fn objc_allocateClassPair(
        superclass: *mut objc_class,
        name: *const c_char,
        extra_bytes: usize,
    ) -> *mut objc_class;
    pub fn objc_registerClassPair(cls: *mut objc_class);
    pub fn objc_disposeClassPair(cls: *mut objc_class);

    pub fn class_getName(cls: *mut objc_class) -> *const c_char;
    pub fn class_addIvar(
        cls: *mut objc_class,
        name: *const c_char,
        size: usize,
        alignment: u8,
        types: *const c_char,
    ) -> BOOL;
    pub fn class_addMethod(
        cls: *mut objc_class,
        name: *const objc_selector,
        imp: Imp,
        types: *const c_char,
    ) -> BOOL;
    pub fn class_addProtocol(cls: *mut objc_class, protocol: *mut objc_object) -> BOOL;
    pub fn class_conformsToProtocol(cls: *mut objc_class, protocol: *mut objc_object) -> BOOL;
    pub fn class_respondsToSelector(cls: *mut objc_class, sel: *const objc_selector) -> BOOL;
    /// Never null for a valid class: the runtime substitutes its
    /// forwarding handler when the selector has no implementation.
    pub fn class_getMethodImplementation(cls: *mut objc_class, sel: *const objc_selector) -> Imp;
    pub fn class_getInstanceVariable(cls: *mut objc_class, name: *const c_char) -> *mut objc_ivar;
    pub fn class_createInstance(cls: *mut objc_class, extra_bytes: usize) -> *mut objc_object;

    pub fn ivar_getOffset(ivar: *mut objc_ivar) -> isize;
    pub fn ivar_getTypeEncoding(ivar: *mut objc_ivar) -> *const c_char;

    pub fn object_getClass(obj: *mut objc_object) -> *mut objc_class;
    pub fn object_setInstanceVariable(
        obj: *mut objc_object,
        name: *const c_char,
        value: *mut c_void,
    ) -> *mut objc_ivar;
    pub fn object_getInstanceVariable(
        obj: *mut objc_object,
        name: *const c_char,
        value: *mut *mut c_void,
    ) -> *mut objc_ivar;
    pub fn object_getIndexedIvars(obj: *mut objc_object) -> *mut c_void;

    pub fn objc_getProtocol(name: *const c_char) -> *mut objc_object;
    pub fn objc_allocateProtocol(name: *const c_char) -> *mut objc_object;
    pub fn objc_registerProtocol(protocol: *mut objc_object);

    /// Super-dispatch entry point.
    ///
    /// Declared untyped on purpose: the real signature depends on the
    /// message being sent, so every caller transmutes this pointer to
    /// the statically-known function type first (the same trick the
    /// dispatch helpers use for ordinary implementations).
    pub fn objc_msgSendSuper();
}
