//! Instance handles, ownership helpers and instance-variable access.
//!
//! This layer never owns an instance: every [`Id`] is a borrowed,
//! reference-counted handle managed entirely by the runtime. What this
//! module adds is:
//!
//! - retain/release/reset helpers, issued as ordinary messages the way
//!   the runtime expects them,
//! - [`OwnedObject`], a scoped-release holder that sends `release` on
//!   drop,
//! - named instance-variable access: pointer slots through the
//!   runtime's accessors, and raw storage through the ivar-offset
//!   technique with a size check against the slot's declared encoding.
//!
//! # Thread Safety
//!
//! Reference counting is delegated to the runtime's own guarantees;
//! nothing here adds locks. Whether a given instance tolerates
//! cross-thread use is a property of its class, not of this module.

use crate::error::{Error, Result};
use crate::ffi;
use crate::runtime::class::Delegate;
use crate::runtime::dispatch::send_message;
use crate::runtime::runtime_name;
use std::ffi::c_void;
use std::fmt;
use std::mem;
use std::ptr::{self, NonNull};

/// An opaque, reference-counted instance handle.
pub type Id = *mut ffi::objc_object;

/// The null instance handle.
#[inline]
#[must_use]
pub fn nil() -> Id {
    ptr::null_mut()
}

/// Sends `retain` to the instance.
///
/// # Safety
///
/// `obj` must be a live instance handle.
pub unsafe fn retain(obj: Id) {
    // SAFETY: caller guarantees obj is live; retain's return value
    // (self) is deliberately ignored.
    unsafe { send_message::<(), _, _>(obj, "retain", ()) }
}

/// Returns the instance's current retain count.
///
/// # Safety
///
/// `obj` must be a live instance handle.
#[must_use]
pub unsafe fn retain_count(obj: Id) -> usize {
    // SAFETY: caller guarantees obj is live.
    let count: ffi::NSUInteger = unsafe { send_message(obj, "retainCount", ()) };
    count as usize
}

/// Sends `release` to the instance, possibly freeing it.
///
/// # Safety
///
/// `obj` must be a live instance handle, and the caller must hold one
/// reference to give up. The handle is dangling afterwards if this was
/// the last reference.
pub unsafe fn release(obj: Id) {
    // SAFETY: caller guarantees obj is live and owns a reference.
    unsafe { send_message::<(), _, _>(obj, "release", ()) }
}

/// Releases the instance and nulls the handle. A null handle is left
/// untouched.
///
/// # Safety
///
/// Same contract as [`release`] when the handle is non-null.
pub unsafe fn reset(obj: &mut Id) {
    if !obj.is_null() {
        // SAFETY: non-null handle, caller owns a reference.
        unsafe { release(*obj) };
    }
    *obj = nil();
}

/// A scoped-release holder for one reference to an instance.
///
/// Dropping the holder sends `release`. The holder is deliberately not
/// clonable; take an extra reference explicitly with
/// [`OwnedObject::retaining`] if two owners are needed.
///
/// # Example
///
/// ```no_run
/// use objforge::runtime::dispatch::create_object;
/// use objforge::runtime::object::OwnedObject;
///
/// let manager = unsafe { create_object("NSFileManager", "init", ()) }.unwrap();
/// let manager = unsafe { OwnedObject::from_raw(manager) }.unwrap();
/// // `release` is sent when `manager` goes out of scope
/// ```
pub struct OwnedObject(NonNull<ffi::objc_object>);

impl OwnedObject {
    /// Takes over one existing reference to `obj`.
    ///
    /// Returns `None` for a null handle.
    ///
    /// # Safety
    ///
    /// `obj` must be a live instance handle and the caller must own the
    /// reference being transferred (no release is sent on construction).
    #[must_use]
    pub unsafe fn from_raw(obj: Id) -> Option<OwnedObject> {
        NonNull::new(obj).map(OwnedObject)
    }

    /// Retains `obj` and holds the new reference.
    ///
    /// Returns `None` for a null handle.
    ///
    /// # Safety
    ///
    /// `obj` must be a live instance handle.
    #[must_use]
    pub unsafe fn retaining(obj: Id) -> Option<OwnedObject> {
        if obj.is_null() {
            return None;
        }
        // SAFETY: obj is live per the caller's contract.
        unsafe { retain(obj) };
        NonNull::new(obj).map(OwnedObject)
    }

    /// Returns the borrowed handle.
    #[inline]
    #[must_use]
    pub fn as_id(&self) -> Id {
        self.0.as_ptr()
    }

    /// Gives the reference back to the caller without releasing.
    #[must_use]
    pub fn into_raw(self) -> Id {
        let obj = self.0.as_ptr();
        mem::forget(self);
        obj
    }
}

impl Drop for OwnedObject {
    fn drop(&mut self) {
        // SAFETY: the holder owns exactly one reference to a live
        // instance; this gives it up.
        unsafe { release(self.0.as_ptr()) };
    }
}

impl fmt::Debug for OwnedObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("OwnedObject").field(&self.0.as_ptr()).finish()
    }
}

/// Writes a pointer-typed instance variable through the runtime's
/// accessor.
///
/// # Errors
///
/// Returns [`Error::IvarNotFound`] if the receiver's class has no slot
/// with this name, [`Error::InvalidName`] on an interior NUL byte.
///
/// # Safety
///
/// `obj` must be a live instance handle.
pub unsafe fn set_ivar_ptr(obj: Id, name: &str, value: *mut c_void) -> Result<()> {
    let cname = runtime_name(name)?;
    // SAFETY: obj is live per the caller's contract; cname is NUL-terminated.
    let ivar = unsafe { ffi::object_setInstanceVariable(obj, cname.as_ptr(), value) };
    if ivar.is_null() {
        return Err(Error::IvarNotFound {
            name: name.to_string(),
        });
    }
    Ok(())
}

/// Reads a pointer-typed instance variable through the runtime's
/// accessor. An unset slot reads back null.
///
/// # Errors
///
/// Returns [`Error::IvarNotFound`] if the receiver's class has no slot
/// with this name, [`Error::InvalidName`] on an interior NUL byte.
///
/// # Safety
///
/// `obj` must be a live instance handle.
pub unsafe fn ivar_ptr(obj: Id, name: &str) -> Result<*mut c_void> {
    let cname = runtime_name(name)?;
    let mut value: *mut c_void = ptr::null_mut();
    // SAFETY: obj is live per the caller's contract; cname is NUL-terminated.
    let ivar = unsafe { ffi::object_getInstanceVariable(obj, cname.as_ptr(), &mut value) };
    if ivar.is_null() {
        return Err(Error::IvarNotFound {
            name: name.to_string(),
        });
    }
    Ok(value)
}

/// Looks up the ivar descriptor on the receiver's class.
unsafe fn lookup_ivar(obj: Id, name: &str) -> Result<NonNull<ffi::objc_ivar>> {
    // SAFETY: obj is live per the caller's contract.
    let cls = unsafe { ffi::object_getClass(obj) };
    if cls.is_null() {
        return Err(Error::IvarNotFound {
            name: name.to_string(),
        });
    }

    let cname = runtime_name(name)?;
    // SAFETY: cls is a live class handle; cname is NUL-terminated.
    let ivar = unsafe { ffi::class_getInstanceVariable(cls, cname.as_ptr()) };
    NonNull::new(ivar).ok_or_else(|| Error::IvarNotFound {
        name: name.to_string(),
    })
}

/// Byte width declared by the slot's type encoding.
unsafe fn declared_size(ivar: NonNull<ffi::objc_ivar>) -> Result<usize> {
    // SAFETY: ivar is a live descriptor; the encoding string is immortal.
    let encoding = unsafe { ffi::ivar_getTypeEncoding(ivar.as_ptr()) };
    if encoding.is_null() {
        return Err(Error::InvalidEncoding);
    }
    // SAFETY: encoding is a NUL-terminated string owned by the runtime.
    let encoding = unsafe { std::ffi::CStr::from_ptr(encoding) };
    let encoding = encoding.to_str().map_err(|_| Error::InvalidEncoding)?;
    crate::runtime::encoding::size_of_encoded(encoding).ok_or(Error::InvalidEncoding)
}

/// Returns a raw pointer to the slot's storage inside the instance.
///
/// This is the ivar-offset technique: storage lives at the instance
/// pointer plus the slot's registered offset. No size checking - see
/// [`ivar_mut`]/[`set_ivar`] for the checked accessors.
///
/// # Errors
///
/// Returns [`Error::IvarNotFound`] if no slot with this name exists.
///
/// # Safety
///
/// `obj` must be a live instance handle.
pub unsafe fn ivar_offset_ptr(obj: Id, name: &str) -> Result<*mut u8> {
    let ivar = unsafe { lookup_ivar(obj, name) }?;
    // SAFETY: ivar belongs to obj's class, so the offset is in bounds
    // of the instance allocation.
    let offset = unsafe { ffi::ivar_getOffset(ivar.as_ptr()) };
    Ok(unsafe { obj.cast::<u8>().offset(offset) })
}

/// Copies `value` into the named slot after checking that the Rust
/// type's width matches the slot's declared encoding.
///
/// # Errors
///
/// Returns [`Error::IvarNotFound`] for a missing slot,
/// [`Error::IvarSizeMismatch`] when the widths disagree,
/// [`Error::InvalidEncoding`] when the slot's declared encoding cannot
/// be sized.
///
/// # Safety
///
/// `obj` must be a live instance handle, and `T` must match the slot's
/// actual type (the width check catches layout mistakes, not type
/// confusion between same-width types).
pub unsafe fn set_ivar<T>(obj: Id, name: &str, value: &T) -> Result<()> {
    let ivar = unsafe { lookup_ivar(obj, name) }?;
    let expected = unsafe { declared_size(ivar) }?;
    if expected != mem::size_of::<T>() {
        return Err(Error::IvarSizeMismatch {
            expected,
            actual: mem::size_of::<T>(),
        });
    }

    // SAFETY: the offset is in bounds and the width was just checked.
    let offset = unsafe { ffi::ivar_getOffset(ivar.as_ptr()) };
    unsafe {
        let dst = obj.cast::<u8>().offset(offset);
        ptr::copy_nonoverlapping(ptr::from_ref(value).cast::<u8>(), dst, expected);
    }
    Ok(())
}

/// Returns a typed pointer to the named slot's storage, after the same
/// width check as [`set_ivar`].
///
/// # Errors
///
/// Same as [`set_ivar`].
///
/// # Safety
///
/// Same as [`set_ivar`]; additionally the returned pointer is only
/// valid while the instance is alive.
pub unsafe fn ivar_mut<T>(obj: Id, name: &str) -> Result<*mut T> {
    let ivar = unsafe { lookup_ivar(obj, name) }?;
    let expected = unsafe { declared_size(ivar) }?;
    if expected != mem::size_of::<T>() {
        return Err(Error::IvarSizeMismatch {
            expected,
            actual: mem::size_of::<T>(),
        });
    }

    let offset = unsafe { ffi::ivar_getOffset(ivar.as_ptr()) };
    Ok(unsafe { obj.cast::<u8>().offset(offset) }.cast::<T>())
}

/// Returns the instance's indexed (extra-bytes) storage.
///
/// # Safety
///
/// `obj` must be a live instance handle created with extra bytes.
#[must_use]
pub unsafe fn indexed_ivars(obj: Id) -> *mut c_void {
    // SAFETY: obj is live per the caller's contract.
    unsafe { ffi::object_getIndexedIvars(obj) }
}

/// Stores a delegate pointer in the instance's delegate slot.
///
/// # Errors
///
/// Returns [`Error::IvarNotFound`] if the instance's class was not
/// built with the delegate slot.
///
/// # Safety
///
/// `obj` must be a live instance of a class built through
/// [`ClassBuilder::for_delegate`](crate::runtime::class::ClassBuilder::for_delegate),
/// and `delegate` must outlive every message delivered to `obj`.
pub unsafe fn attach_delegate<D: Delegate>(obj: Id, delegate: *mut D) -> Result<()> {
    unsafe { set_ivar_ptr(obj, D::IVAR, delegate.cast()) }
}

/// Recovers the delegate pointer from the instance's delegate slot.
///
/// Returns `None` when the slot is unset (or missing entirely); the
/// generated trampolines answer with a default value in that case
/// instead of treating it as an error.
///
/// # Safety
///
/// `obj` must be a live instance handle, and the slot (if set) must
/// hold a valid `*mut D` attached via [`attach_delegate`]. The
/// returned borrow has an unbounded lifetime; the caller must not keep
/// it past the delegate's life.
#[must_use]
pub unsafe fn delegate_mut<'a, D: Delegate>(obj: Id) -> Option<&'a mut D> {
    let ptr = unsafe { ivar_ptr(obj, D::IVAR) }.ok()?;
    // SAFETY: the slot holds either null or a pointer stored by
    // attach_delegate; as_mut handles the null case.
    unsafe { ptr.cast::<D>().as_mut() }
}
