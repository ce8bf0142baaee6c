//! Message dispatch helpers.
//!
//! Dispatch resolves the implementation registered for the receiver's
//! exact class (`object_getClass` + `class_getMethodImplementation` -
//! the runtime walks the hierarchy and substitutes its forwarding
//! handler internally) and reinterprets the untyped implementation
//! pointer as a function of the statically-declared signature. No
//! checking happens beyond what the static types provide: a mismatch
//! between the declared return/argument types and the selector's real
//! signature is undefined behavior, surfaced as a crash or silent
//! corruption, never as an error. Every helper here is `unsafe` for
//! exactly that reason.
//!
//! Arguments travel as tuples through [`MessageArgs`], which transmutes
//! the implementation pointer to the matching `extern "C" fn` type and
//! calls it. [`Invocation`] wraps a captured send whose return type is
//! fixed only at the point of use.

use crate::error::{Error, Result};
use crate::ffi;
use crate::runtime::class::{Class, Delegate};
use crate::runtime::object::Id;
use crate::runtime::selector::{Sel, ToSelector};
use std::mem;
use std::ptr;

/// Untyped method implementation pointer (re-exported from [`crate::ffi`]).
pub type Imp = ffi::Imp;

/// The two-word receiver/superclass pack handed to the super-dispatch
/// entry point.
#[repr(C)]
pub struct Super {
    /// The instance the message is for.
    pub receiver: Id,
    /// The class whose implementation should run.
    pub superclass: *mut ffi::objc_class,
}

/// A tuple of message arguments.
///
/// Implemented on tuples up to arity 8. `invoke` transmutes the
/// implementation pointer to the concrete
/// `extern "C" fn(Id, Sel, args...) -> R` type and calls it;
/// `invoke_super` does the same with the super-dispatch entry point.
pub trait MessageArgs: Sized {
    /// Calls `imp` with the receiver, selector and these arguments.
    ///
    /// # Safety
    ///
    /// `imp` must be an implementation whose real signature matches
    /// `(Id, Sel, Self...) -> R` exactly; the receiver must be valid
    /// for it.
    unsafe fn invoke<R>(self, imp: Imp, receiver: Id, sel: Sel) -> R;

    /// Calls the super-dispatch entry point with the given pack.
    ///
    /// # Safety
    ///
    /// `sup` must point to a valid [`Super`] pack, and the inherited
    /// implementation's real signature must match `Self... -> R`.
    unsafe fn invoke_super<R>(self, sup: *const Super, sel: Sel) -> R;
}

macro_rules! message_args_impl {
    ($($name:ident : $t:ident),*) => {
        impl<$($t),*> MessageArgs for ($($t,)*) {
            unsafe fn invoke<R>(self, imp: Imp, receiver: Id, sel: Sel) -> R {
                let ($($name,)*) = self;
                // SAFETY: caller guarantees the implementation's real
                // signature matches this function type.
                let imp = unsafe {
                    mem::transmute::<Imp, unsafe extern "C" fn(Id, Sel $(, $t)*) -> R>(imp)
                };
                unsafe { imp(receiver, sel $(, $name)*) }
            }

            unsafe fn invoke_super<R>(self, sup: *const Super, sel: Sel) -> R {
                let ($($name,)*) = self;
                // The super-dispatch entry point is declared untyped and
                // given its real signature per call, like any other imp.
                let entry: Imp = ffi::objc_msgSendSuper;
                // SAFETY: caller guarantees the inherited implementation's
                // real signature matches this function type.
                let entry = unsafe {
                    mem::transmute::<Imp, unsafe extern "C" fn(*const Super, Sel $(, $t)*) -> R>(entry)
                };
                unsafe { entry(sup, sel $(, $name)*) }
            }
        }
    };
}

message_args_impl!();
message_args_impl!(a: A);
message_args_impl!(a: A, b: B);
message_args_impl!(a: A, b: B, c: C);
message_args_impl!(a: A, b: B, c: C, d: D);
message_args_impl!(a: A, b: B, c: C, d: D, e: E);
message_args_impl!(a: A, b: B, c: C, d: D, e: E, f: F);
message_args_impl!(a: A, b: B, c: C, d: D, e: E, f: F, g: G);
message_args_impl!(a: A, b: B, c: C, d: D, e: E, f: F, g: G, h: H);

/// Sends a message to an instance.
///
/// # Example
///
/// ```no_run
/// use objforge::runtime::dispatch::{create_object, send_message};
/// use objforge::runtime::object::Id;
///
/// let manager = unsafe { create_object("NSFileManager", "init", ()) }.unwrap();
/// let tmp: Id = unsafe { send_message(manager, "temporaryDirectory", ()) };
/// # let _ = tmp;
/// ```
///
/// # Safety
///
/// `receiver` must be a live (non-null) instance handle, and the
/// declared `R`/argument types must match the selector's real
/// signature. Violations are undefined behavior.
///
/// # Panics
///
/// Panics if a `&str` selector contains an interior NUL byte.
pub unsafe fn send_message<R, A, S>(receiver: Id, selector: S, args: A) -> R
where
    A: MessageArgs,
    S: ToSelector,
{
    let sel = selector.to_sel();
    // SAFETY: receiver is live per the caller's contract; the lookup
    // never returns null for a valid class (the runtime substitutes
    // its forwarding handler for unknown selectors).
    let imp = unsafe {
        let cls = ffi::object_getClass(receiver);
        ffi::class_getMethodImplementation(cls, sel.as_ptr())
    };
    unsafe { args.invoke(imp, receiver, sel) }
}

/// Sends a class-side message by class name.
///
/// The implementation is resolved on the metaclass and invoked with
/// the class object as the receiver.
///
/// # Errors
///
/// Returns [`Error::ClassNotFound`] if no class (or metaclass) with
/// this name is registered.
///
/// # Safety
///
/// Same signature contract as [`send_message`].
pub unsafe fn send_class_message<R, A, S>(class_name: &str, selector: S, args: A) -> Result<R>
where
    A: MessageArgs,
    S: ToSelector,
{
    let class = Class::get(class_name).ok_or_else(|| Error::ClassNotFound {
        name: class_name.to_string(),
    })?;
    let meta = Class::metaclass(class_name).ok_or_else(|| Error::ClassNotFound {
        name: class_name.to_string(),
    })?;

    let sel = selector.to_sel();
    // SAFETY: meta is a live metaclass handle.
    let imp = unsafe { ffi::class_getMethodImplementation(meta.as_ptr(), sel.as_ptr()) };
    Ok(unsafe { args.invoke(imp, class.as_ptr().cast(), sel) })
}

/// Sends a message to the superclass implementation, bypassing the
/// dynamic override on the receiver's own class.
///
/// The receiver and the statically-known superclass are packed into a
/// two-word [`Super`] and handed to the super-dispatch entry point.
///
/// # Safety
///
/// Same signature contract as [`send_message`]; `superclass` must be
/// an ancestor of the receiver's class.
pub unsafe fn send_super_message<R, A, S>(receiver: Id, superclass: Class, selector: S, args: A) -> R
where
    A: MessageArgs,
    S: ToSelector,
{
    let sup = Super {
        receiver,
        superclass: superclass.as_ptr(),
    };
    unsafe { args.invoke_super(ptr::from_ref(&sup), selector.to_sel()) }
}

/// Sends a message to the delegate's declared base class
/// implementation - the "call inherited behavior from an override"
/// helper.
///
/// Falls back to a default-constructed return value if the base class
/// cannot be resolved.
///
/// # Safety
///
/// Same contract as [`send_super_message`].
pub unsafe fn send_base_message<D, R, A, S>(receiver: Id, selector: S, args: A) -> R
where
    D: Delegate,
    R: DefaultReturn,
    A: MessageArgs,
    S: ToSelector,
{
    match Class::get(D::BASE_CLASS) {
        Some(superclass) => unsafe { send_super_message(receiver, superclass, selector, args) },
        None => R::default_return(),
    }
}

/// A captured message send whose return type is chosen at the use site.
///
/// The deferred-call wrapper: receiver, selector and arguments are
/// captured eagerly, and [`Invocation::invoke`] fixes the concrete
/// return type wherever the result is consumed.
///
/// # Example
///
/// ```no_run
/// use objforge::runtime::dispatch::{create_object, Invocation};
/// use objforge::runtime::object::Id;
///
/// let manager = unsafe { create_object("NSFileManager", "init", ()) }.unwrap();
/// let tmp: Id = unsafe { Invocation::new(manager, "temporaryDirectory", ()).invoke() };
/// # let _ = tmp;
/// ```
pub struct Invocation<A: MessageArgs> {
    receiver: Id,
    selector: Sel,
    args: A,
}

impl<A: MessageArgs> Invocation<A> {
    /// Captures a message send.
    ///
    /// # Panics
    ///
    /// Panics if a `&str` selector contains an interior NUL byte.
    pub fn new(receiver: Id, selector: impl ToSelector, args: A) -> Self {
        Invocation {
            receiver,
            selector: selector.to_sel(),
            args,
        }
    }

    /// Performs the captured send with `R` as the declared return type.
    ///
    /// # Safety
    ///
    /// Same contract as [`send_message`].
    pub unsafe fn invoke<R>(self) -> R {
        unsafe { send_message(self.receiver, self.selector, self.args) }
    }
}

/// Instantiates a class by name and sends it an init selector.
///
/// The handle from instance creation is returned; the init selector's
/// own return value is deliberately not substituted for it.
///
/// # Errors
///
/// Returns [`Error::ClassNotFound`] for an unknown class and
/// [`Error::InstanceCreationFailed`] for a null instance.
///
/// # Safety
///
/// The init selector's real signature must match `A -> void` per the
/// [`send_message`] contract.
pub unsafe fn create_object<A: MessageArgs>(class_name: &str, init: &str, args: A) -> Result<Id> {
    let class = Class::get(class_name).ok_or_else(|| Error::ClassNotFound {
        name: class_name.to_string(),
    })?;
    let obj = class.create_instance()?;
    unsafe { send_message::<(), _, _>(obj, init, args) };
    Ok(obj)
}

/// Reads a class-side property by name: `[ClassName property]`.
///
/// # Errors
///
/// Returns [`Error::ClassNotFound`] for an unknown class.
///
/// # Safety
///
/// The property getter must really return an object handle.
pub unsafe fn class_property(class_name: &str, property: &str) -> Result<Id> {
    unsafe { send_class_message(class_name, property, ()) }
}

/// Default-constructed return values for trampoline fallbacks.
///
/// Covers the FFI-expressible return categories: unit, numerics, and
/// raw pointers (null). Used when a trampoline finds its delegate slot
/// unset, and by [`send_base_message`] when the base class is gone;
/// neither is an error signal.
pub trait DefaultReturn {
    /// The value to produce when a dispatch target is unavailable.
    fn default_return() -> Self;
}

macro_rules! default_return_impl {
    ($($t:ty),*) => {
        $(
            impl DefaultReturn for $t {
                fn default_return() -> Self {
                    <$t>::default()
                }
            }
        )*
    };
}

default_return_impl!(
    (),
    bool,
    i8,
    u8,
    i16,
    u16,
    i32,
    u32,
    i64,
    u64,
    i128,
    u128,
    isize,
    usize,
    f32,
    f64
);

impl<T> DefaultReturn for *mut T {
    fn default_return() -> Self {
        ptr::null_mut()
    }
}

impl<T> DefaultReturn for *const T {
    fn default_return() -> Self {
        ptr::null()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::object::release;

    #[test]
    fn test_super_pack_is_two_words() {
        assert_eq!(
            mem::size_of::<Super>(),
            2 * mem::size_of::<*const ()>()
        );
    }

    #[test]
    fn test_default_return_values() {
        assert_eq!(<i32 as DefaultReturn>::default_return(), 0);
        assert_eq!(<f64 as DefaultReturn>::default_return(), 0.0);
        assert!(!<bool as DefaultReturn>::default_return());
        assert!(<*mut u8 as DefaultReturn>::default_return().is_null());
        assert!(<*const u8 as DefaultReturn>::default_return().is_null());
        <() as DefaultReturn>::default_return();
    }

    #[test]
    fn test_send_message_identity() {
        let obj = unsafe { create_object("NSObject", "init", ()) }.unwrap();
        // `self` returns the receiver unchanged
        let same: Id = unsafe { send_message(obj, "self", ()) };
        assert_eq!(same, obj);
        unsafe { release(obj) };
    }

    #[test]
    fn test_send_class_message() {
        let class_obj: Id =
            unsafe { send_class_message("NSObject", "class", ()) }.unwrap();
        let expected = Class::get("NSObject").unwrap();
        assert_eq!(class_obj.cast(), expected.as_ptr());
    }

    #[test]
    fn test_send_class_message_unknown_class() {
        let result: Result<Id> =
            unsafe { send_class_message("ObjforgeNoSuchClass", "class", ()) };
        assert!(matches!(result, Err(Error::ClassNotFound { .. })));
    }

    #[test]
    fn test_invocation_defers_return_type() {
        let empty: Id = unsafe { send_class_message("NSString", "string", ()) }.unwrap();
        let len: ffi::NSUInteger = unsafe { Invocation::new(empty, "length", ()).invoke() };
        assert_eq!(len, 0);
    }

    #[test]
    fn test_create_object_unknown_class() {
        let result = unsafe { create_object("ObjforgeNoSuchClass", "init", ()) };
        assert!(matches!(result, Err(Error::ClassNotFound { .. })));
    }
}
