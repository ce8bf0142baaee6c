//! Class handles and dynamic class building.
//!
//! [`Class`] is a thin handle over a registered runtime class.
//! [`ClassBuilder`] drives the dynamic class construction sequence the
//! runtime requires: allocate a class pair, attach storage slots,
//! methods and protocol conformances, register, and eventually retire
//! the pair. The builder is an explicit state machine
//! (`Building -> Registered -> Disposed | Leaked`): configuration calls
//! are rejected once the class is registered, registration is
//! one-shot, and teardown is skipped when the runtime has silently
//! subclassed the class for key-value observation (disposing the
//! parent of a hidden subclass would corrupt the class graph, so the
//! pair is leaked on purpose instead).
//!
//! # Single ownership
//!
//! A builder exclusively owns the class pair it allocated until the
//! terminal state. It is not synchronized: concurrent configuration of
//! one unregistered class pair must be serialized by the caller.

use crate::error::{Error, Result};
use crate::ffi;
use crate::runtime::encoding::{Encode, validate_signature};
use crate::runtime::object::Id;
use crate::runtime::protocol::Protocol;
use crate::runtime::runtime_name;
use crate::runtime::selector::{Sel, ToSelector};
use rand::distributions::Alphanumeric;
use rand::Rng;
use std::ffi::{CStr, CString};
use std::fmt;
use std::mem;
use std::ptr::NonNull;

/// Untyped method implementation pointer.
pub use crate::ffi::Imp;

/// Prefix the runtime gives the hidden subclasses it creates for
/// key-value observation.
pub const OBSERVATION_SUBCLASS_PREFIX: &str = "NSKVONotifying_";

/// Length of the random alphanumeric suffix appended to generated
/// class names.
const UNIQUE_SUFFIX_LEN: usize = 10;

/// A handle to a registered runtime class.
///
/// Handles are plain pointers into the runtime's class table: `Copy`,
/// compared by identity, and valid for as long as the class stays
/// registered. Looking one up never transfers ownership.
///
/// # Example
///
/// ```no_run
/// use objforge::Class;
///
/// let class = Class::get("NSObject").unwrap();
/// assert_eq!(class.name(), "NSObject");
/// ```
#[repr(transparent)]
#[derive(Copy, Clone)]
pub struct Class(NonNull<ffi::objc_class>);

impl Class {
    /// Looks up a registered class by name.
    #[must_use]
    pub fn get(name: &str) -> Option<Class> {
        let cname = CString::new(name).ok()?;
        // SAFETY: cname is NUL-terminated; the runtime returns null for
        // unknown names.
        let ptr = unsafe { ffi::objc_getClass(cname.as_ptr()) };
        NonNull::new(ptr).map(Class)
    }

    /// Looks up a class's metaclass by name.
    #[must_use]
    pub fn metaclass(name: &str) -> Option<Class> {
        let cname = CString::new(name).ok()?;
        // SAFETY: cname is NUL-terminated.
        let ptr = unsafe { ffi::objc_getMetaClass(cname.as_ptr()) };
        NonNull::new(ptr).map(Class)
    }

    /// Wraps a raw class pointer received from the runtime.
    ///
    /// # Safety
    ///
    /// `ptr` must be a class handle obtained from the runtime.
    #[must_use]
    pub unsafe fn from_ptr(ptr: *mut ffi::objc_class) -> Option<Class> {
        NonNull::new(ptr).map(Class)
    }

    /// Returns the raw class pointer.
    #[inline]
    #[must_use]
    pub fn as_ptr(&self) -> *mut ffi::objc_class {
        self.0.as_ptr()
    }

    /// Returns the class name.
    ///
    /// # Panics
    ///
    /// Panics if the runtime hands back a name that is not valid UTF-8.
    #[must_use]
    pub fn name(&self) -> String {
        // SAFETY: the handle points at a registered class whose name is
        // an immortal NUL-terminated string.
        let cstr = unsafe { CStr::from_ptr(ffi::class_getName(self.as_ptr())) };
        cstr.to_str().expect("class name is not UTF-8").to_string()
    }

    /// Whether instances of this class respond to the selector.
    #[must_use]
    pub fn responds_to(&self, selector: Sel) -> bool {
        // SAFETY: both handles are live.
        unsafe { ffi::class_respondsToSelector(self.as_ptr(), selector.as_ptr()) != 0 }
    }

    /// Whether this class conforms to the protocol.
    #[must_use]
    pub fn conforms_to(&self, protocol: Protocol) -> bool {
        // SAFETY: both handles are live.
        unsafe { ffi::class_conformsToProtocol(self.as_ptr(), protocol.as_ptr()) != 0 }
    }

    /// Resolves the implementation registered for a selector on this
    /// exact class.
    ///
    /// The runtime handles hierarchy fallback internally and
    /// substitutes its forwarding handler for unknown selectors, so
    /// the result is never null for a live class.
    #[must_use]
    pub fn method_implementation(&self, selector: Sel) -> Imp {
        // SAFETY: both handles are live.
        unsafe { ffi::class_getMethodImplementation(self.as_ptr(), selector.as_ptr()) }
    }

    /// Creates an uninitialized instance of this class.
    ///
    /// The handle is returned with a single reference the caller owns;
    /// send it an init selector before use.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InstanceCreationFailed`] if the runtime returns
    /// a null handle.
    pub fn create_instance(&self) -> Result<Id> {
        self.create_instance_with_extra(0)
    }

    /// Creates an instance with extra indexed bytes appended to its
    /// storage (readable through
    /// [`indexed_ivars`](crate::runtime::object::indexed_ivars)).
    ///
    /// # Errors
    ///
    /// Returns [`Error::InstanceCreationFailed`] if the runtime returns
    /// a null handle.
    pub fn create_instance_with_extra(&self, extra_bytes: usize) -> Result<Id> {
        // SAFETY: the handle is live.
        let obj = unsafe { ffi::class_createInstance(self.as_ptr(), extra_bytes) };
        if obj.is_null() {
            return Err(Error::InstanceCreationFailed { class: self.name() });
        }
        Ok(obj)
    }
}

// SAFETY: Class is a handle into the runtime's class table; the table
// is process-global and the runtime's own accessors are thread-safe.
unsafe impl Send for Class {}
unsafe impl Sync for Class {}

impl PartialEq for Class {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.0.as_ptr(), other.0.as_ptr())
    }
}

impl Eq for Class {}

impl fmt::Debug for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Class").field("name", &self.name()).finish()
    }
}

/// Builder lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BuilderState {
    /// Allocated, configurable, not yet visible to the runtime.
    Building,
    /// Registered and process-wide visible; immutable per runtime contract.
    Registered,
    /// Retired; the class pair is gone. Terminal.
    Disposed,
    /// Registered but never retired because a hidden observation
    /// subclass was detected at teardown. Terminal.
    Leaked,
}

/// Builds, registers and retires one dynamically constructed class.
///
/// # Lifecycle
///
/// ```text
/// new/for_delegate -> Building -> register() -> Registered
///                        |                          |
///                     dispose()                  dispose()
///                        v                          v
///                     Disposed             Disposed | Leaked
/// ```
///
/// Configuration calls return [`Error::AlreadyRegistered`] outside the
/// `Building` state; instance creation requires `Registered`.
/// `dispose` is idempotent and runs from `Drop` as well.
///
/// # Example
///
/// ```no_run
/// use objforge::{Class, ClassBuilder};
/// use objforge::runtime::encoding::method_signature;
///
/// unsafe extern "C" fn ping(_this: objforge::Id, _cmd: objforge::Sel) -> i32 {
///     7
/// }
///
/// let superclass = Class::get("NSObject").unwrap();
/// let mut builder = ClassBuilder::new("ForgedClass", superclass).unwrap();
/// builder.add_ivar::<u64>("_counter").unwrap();
/// unsafe {
///     let imp = core::mem::transmute::<unsafe extern "C" fn(objforge::Id, objforge::Sel) -> i32, objforge::Imp>(ping);
///     builder
///         .add_method("ping", imp, method_signature::<i32, ()>().as_str())
///         .unwrap();
/// }
/// let class = builder.register().unwrap();
/// let instance = class.create_instance().unwrap();
/// # let _ = instance;
/// ```
pub struct ClassBuilder {
    class: Class,
    name: String,
    state: BuilderState,
}

impl ClassBuilder {
    /// Allocates a new class pair under `root_name` plus a random
    /// alphanumeric suffix (collision avoidance across repeated builds
    /// in one process).
    ///
    /// There is no retry: if the generated name still collides, or the
    /// superclass handle is stale, the allocation fails and the caller
    /// decides.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ClassAllocationFailed`] when the runtime
    /// returns a null pair, [`Error::InvalidName`] for an interior NUL
    /// byte in `root_name`.
    pub fn new(root_name: &str, superclass: Class) -> Result<ClassBuilder> {
        let name = unique_name(root_name);
        let cname = runtime_name(&name)?;

        // SAFETY: superclass is a live handle and cname is NUL-terminated.
        let cls = unsafe { ffi::objc_allocateClassPair(superclass.as_ptr(), cname.as_ptr(), 0) };
        let cls = NonNull::new(cls).ok_or_else(|| Error::ClassAllocationFailed { name: name.clone() })?;

        Ok(ClassBuilder {
            class: Class(cls),
            name,
            state: BuilderState::Building,
        })
    }

    /// Allocates a class pair for a delegate type: superclass
    /// [`Delegate::BASE_CLASS`], name rooted at [`Delegate::NAME`], and
    /// the delegate pointer slot [`Delegate::IVAR`] pre-added.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ClassNotFound`] when the base class is not
    /// registered, plus everything [`ClassBuilder::new`] can return.
    pub fn for_delegate<D: Delegate>() -> Result<ClassBuilder> {
        let superclass = Class::get(D::BASE_CLASS).ok_or_else(|| Error::ClassNotFound {
            name: D::BASE_CLASS.to_string(),
        })?;

        let mut builder = ClassBuilder::new(D::NAME, superclass)?;
        builder.add_pointer_ivar::<D>(D::IVAR, D::NAME)?;
        Ok(builder)
    }

    /// The generated (suffixed) class name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The class handle under construction.
    ///
    /// Valid until the builder reaches `Disposed`.
    #[must_use]
    pub fn class(&self) -> Class {
        self.class
    }

    /// Whether [`ClassBuilder::register`] has run.
    #[must_use]
    pub fn is_registered(&self) -> bool {
        self.state == BuilderState::Registered
    }

    /// Whether teardown was skipped because of a hidden observation
    /// subclass.
    #[must_use]
    pub fn is_leaked(&self) -> bool {
        self.state == BuilderState::Leaked
    }

    fn ensure_building(&self) -> Result<()> {
        if self.state == BuilderState::Building {
            Ok(())
        } else {
            Err(Error::AlreadyRegistered {
                name: self.name.clone(),
            })
        }
    }

    /// Adds an instance variable typed by its encoding.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AlreadyRegistered`] outside the building state,
    /// [`Error::IvarAdditionFailed`] when the runtime refuses the slot.
    pub fn add_ivar<T: Encode>(&mut self, name: &str) -> Result<()> {
        self.ensure_building()?;
        let encoding = T::encoding();
        self.add_raw_ivar(name, encoding.as_str(), mem::size_of::<T>(), mem::align_of::<T>())
    }

    /// Adds a pointer-typed instance slot encoded as a pointer to the
    /// named struct (`^{tag=}`), sized and aligned like `*mut T`.
    ///
    /// This is the slot shape the delegate machinery reads back through
    /// [`delegate_mut`](crate::runtime::object::delegate_mut).
    ///
    /// # Errors
    ///
    /// Same as [`ClassBuilder::add_ivar`].
    pub fn add_pointer_ivar<T>(&mut self, name: &str, tag: &str) -> Result<()> {
        self.ensure_building()?;
        let encoding = format!("^{{{tag}=}}");
        self.add_raw_ivar(name, &encoding, mem::size_of::<*mut T>(), mem::align_of::<*mut T>())
    }

    fn add_raw_ivar(&mut self, name: &str, encoding: &str, size: usize, align: usize) -> Result<()> {
        let cname = runtime_name(name)?;
        let cencoding = runtime_name(encoding)?;

        // class_addIvar wants log2 of the alignment
        let log2_align = align.trailing_zeros() as u8;

        // SAFETY: the pair is allocated and unregistered (Building state).
        let added = unsafe {
            ffi::class_addIvar(self.class.as_ptr(), cname.as_ptr(), size, log2_align, cencoding.as_ptr())
        };
        if added == 0 {
            return Err(Error::IvarAdditionFailed {
                name: name.to_string(),
            });
        }
        Ok(())
    }

    /// Binds a free-function implementation to a selector with an
    /// explicit signature string.
    ///
    /// The signature is checked for well-formedness only (it must be
    /// `ret @ : args...` in the encoding grammar); whether it matches
    /// the implementation is the caller's contract. A signature
    /// carrying the unknown `?` category is accepted but logged.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AlreadyRegistered`] outside the building state,
    /// [`Error::InvalidEncoding`] for a malformed signature,
    /// [`Error::MethodAdditionFailed`] when the runtime refuses the
    /// method.
    ///
    /// # Safety
    ///
    /// `imp` must be an `extern "C"` function whose real signature
    /// matches `signature` (receiver and selector first).
    pub unsafe fn add_method<S: ToSelector>(&mut self, selector: S, imp: Imp, signature: &str) -> Result<()> {
        self.ensure_building()?;
        validate_signature(signature)?;
        if signature.contains('?') {
            log::warn!(
                "class {}: registering method with unknown category in signature {signature:?}",
                self.name
            );
        }

        let sel = selector.to_sel();
        let csignature = runtime_name(signature)?;

        // SAFETY: the pair is allocated; imp matches signature per the
        // caller's contract.
        let added =
            unsafe { ffi::class_addMethod(self.class.as_ptr(), sel.as_ptr(), imp, csignature.as_ptr()) };
        if added == 0 {
            return Err(Error::MethodAdditionFailed {
                selector: sel.name(),
            });
        }
        Ok(())
    }

    /// Binds a notification-shaped delegate method (`v@:@`): the
    /// generated trampoline recovers the delegate from its slot and
    /// forwards the notification object, skipping silently when the
    /// slot is unset.
    ///
    /// # Errors
    ///
    /// Same as [`ClassBuilder::add_method`].
    pub fn add_notification_method<D: NotificationDelegate, S: ToSelector>(
        &mut self,
        selector: S,
    ) -> Result<()> {
        let trampoline = notification_trampoline::<D> as unsafe extern "C" fn(Id, Sel, Id);
        // SAFETY: the trampoline signature is exactly the v@:@ shape
        // registered below.
        let imp = unsafe { mem::transmute::<unsafe extern "C" fn(Id, Sel, Id), Imp>(trampoline) };
        unsafe { self.add_method(selector, imp, "v@:@") }
    }

    /// Adds protocol conformance, optionally force-allocating and
    /// registering the protocol if the runtime does not know it yet.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AlreadyRegistered`] outside the building state,
    /// [`Error::ProtocolNotFound`] when the protocol is unknown and
    /// `force` is off, [`Error::ProtocolAllocationFailed`] when forced
    /// allocation fails, [`Error::ProtocolAdditionFailed`] when the
    /// runtime refuses the conformance.
    pub fn add_protocol(&mut self, name: &str, force: bool) -> Result<()> {
        self.ensure_building()?;

        if let Some(protocol) = Protocol::get(name) {
            return self.adopt(protocol, name);
        }

        if !force {
            return Err(Error::ProtocolNotFound {
                name: name.to_string(),
            });
        }

        // Force protocol allocation
        log::debug!("class {}: force-allocating protocol {name}", self.name);
        let protocol = Protocol::allocate(name)?;
        protocol.register();
        self.adopt(protocol, name)
    }

    fn adopt(&mut self, protocol: Protocol, name: &str) -> Result<()> {
        // SAFETY: both handles are live.
        let added = unsafe { ffi::class_addProtocol(self.class.as_ptr(), protocol.as_ptr()) };
        if added == 0 {
            return Err(Error::ProtocolAdditionFailed {
                name: name.to_string(),
            });
        }
        Ok(())
    }

    /// Registers the class pair, making it process-wide visible under
    /// its generated name. One-shot: methods and ivars are immutable
    /// afterwards per the runtime contract.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AlreadyRegistered`] if registration already
    /// happened (or the builder was disposed).
    pub fn register(&mut self) -> Result<Class> {
        self.ensure_building()?;
        // SAFETY: the pair is allocated and configured.
        unsafe { ffi::objc_registerClassPair(self.class.as_ptr()) };
        self.state = BuilderState::Registered;
        Ok(self.class)
    }

    /// Creates an instance of the registered class.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotRegistered`] before registration,
    /// [`Error::InstanceCreationFailed`] on a null handle.
    pub fn create_instance(&self) -> Result<Id> {
        if self.state != BuilderState::Registered {
            return Err(Error::NotRegistered {
                name: self.name.clone(),
            });
        }
        self.class.create_instance()
    }

    /// Retires the class pair. Idempotent; also runs from `Drop`.
    ///
    /// If the runtime registry shows a hidden observation subclass
    /// (the [`OBSERVATION_SUBCLASS_PREFIX`] naming convention), the
    /// pair is deliberately leaked instead: disposing the parent would
    /// invalidate the hidden subclass's inheritance chain.
    pub fn dispose(&mut self) {
        match self.state {
            BuilderState::Building => {
                // An unregistered pair can be retired directly.
                // SAFETY: the pair is allocated and owned by this builder.
                unsafe { ffi::objc_disposeClassPair(self.class.as_ptr()) };
                self.state = BuilderState::Disposed;
            }
            BuilderState::Registered => {
                if self.has_observation_subclass() {
                    log::warn!(
                        "class {}: hidden observation subclass present, leaking instead of disposing",
                        self.name
                    );
                    self.state = BuilderState::Leaked;
                } else {
                    // SAFETY: the pair is registered and owned by this builder.
                    unsafe { ffi::objc_disposeClassPair(self.class.as_ptr()) };
                    self.state = BuilderState::Disposed;
                }
            }
            BuilderState::Disposed | BuilderState::Leaked => {}
        }
    }

    fn has_observation_subclass(&self) -> bool {
        Class::get(&format!("{OBSERVATION_SUBCLASS_PREFIX}{}", self.name)).is_some()
    }
}

impl Drop for ClassBuilder {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl fmt::Debug for ClassBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassBuilder")
            .field("name", &self.name)
            .field("state", &self.state)
            .finish()
    }
}

/// A Rust type that backs instances of a dynamically built class.
///
/// The three constants mirror what the builder needs to wire a class
/// to its Rust-side delegate: the runtime superclass, the root (and
/// struct tag) for the generated name, and the name of the pointer
/// slot that holds `*mut Self`.
///
/// # Example
///
/// ```no_run
/// use objforge::{attach_delegate, delegate_method, ClassBuilder, Delegate, Id};
///
/// struct AppDelegate {
///     clicks: u32,
/// }
///
/// impl AppDelegate {
///     fn on_click(&mut self, _sender: Id) {
///         self.clicks += 1;
///     }
/// }
///
/// impl Delegate for AppDelegate {
///     const BASE_CLASS: &'static str = "NSObject";
///     const NAME: &'static str = "AppDelegate";
///     const IVAR: &'static str = "_delegate";
/// }
///
/// let mut builder = ClassBuilder::for_delegate::<AppDelegate>().unwrap();
/// let imp = delegate_method!(AppDelegate, on_click, (sender: Id) -> ());
/// unsafe { builder.add_method("onClick:", imp, "v@:@").unwrap() };
/// let class = builder.register().unwrap();
///
/// let mut delegate = AppDelegate { clicks: 0 };
/// let instance = class.create_instance().unwrap();
/// unsafe { attach_delegate(instance, &mut delegate).unwrap() };
/// ```
pub trait Delegate: Sized {
    /// Runtime superclass of the generated class.
    const BASE_CLASS: &'static str;
    /// Root of the generated class name; doubles as the struct tag of
    /// the delegate pointer slot's encoding.
    const NAME: &'static str;
    /// Name of the pointer slot holding `*mut Self`.
    const IVAR: &'static str;
}

/// A delegate that handles notification-shaped callbacks (`v@:@`).
pub trait NotificationDelegate: Delegate {
    /// Called with the posted notification object.
    fn handle_notification(&mut self, notification: Id);
}

unsafe extern "C" fn notification_trampoline<D: NotificationDelegate>(
    this: Id,
    _cmd: Sel,
    notification: Id,
) {
    // An unset delegate slot drops the notification
    if let Some(delegate) = unsafe { crate::runtime::object::delegate_mut::<D>(this) } {
        delegate.handle_notification(notification);
    }
}

/// Generates a unique class name: root plus a random alphanumeric
/// suffix.
fn unique_name(root: &str) -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(Alphanumeric)
        .take(UNIQUE_SUFFIX_LEN)
        .map(char::from)
        .collect();
    format!("{root}{suffix}")
}

/// Builds an [`Imp`] trampoline that forwards a selector to a method
/// on the instance's attached delegate.
///
/// The trampoline recovers `*mut D` from the delegate pointer slot,
/// dispatches to the named method with the forwarded arguments, and
/// returns a default-constructed value when the slot is unset.
///
/// ```no_run
/// use objforge::{delegate_method, Delegate, Id};
///
/// struct Counter {
///     total: i64,
/// }
///
/// impl Counter {
///     fn bump(&mut self, by: i64) -> i64 {
///         self.total += by;
///         self.total
///     }
/// }
///
/// impl Delegate for Counter {
///     const BASE_CLASS: &'static str = "NSObject";
///     const NAME: &'static str = "Counter";
///     const IVAR: &'static str = "_delegate";
/// }
///
/// let imp = delegate_method!(Counter, bump, (by: i64) -> i64);
/// # let _ = imp;
/// ```
#[macro_export]
macro_rules! delegate_method {
    ($delegate:ty, $method:ident, ( $($arg:ident : $aty:ty),* ) -> $ret:ty) => {{
        unsafe extern "C" fn trampoline(
            this: $crate::runtime::object::Id,
            _cmd: $crate::runtime::selector::Sel,
            $($arg: $aty),*
        ) -> $ret {
            // An unset delegate slot produces a default value
            match unsafe { $crate::runtime::object::delegate_mut::<$delegate>(this) } {
                Some(delegate) => delegate.$method($($arg),*),
                None => <$ret as $crate::runtime::dispatch::DefaultReturn>::default_return(),
            }
        }
        // SAFETY: the trampoline is registered under a signature built
        // from the same argument and return types.
        unsafe {
            ::core::mem::transmute::<
                unsafe extern "C" fn(
                    $crate::runtime::object::Id,
                    $crate::runtime::selector::Sel,
                    $($aty),*
                ) -> $ret,
                $crate::runtime::class::Imp,
            >(trampoline)
        }
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_name_shape() {
        let name = unique_name("ForgeTest");
        assert!(name.starts_with("ForgeTest"));
        assert_eq!(name.len(), "ForgeTest".len() + UNIQUE_SUFFIX_LEN);
        assert!(name["ForgeTest".len()..].chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_unique_names_differ() {
        // OS-seeded randomness: two builds in one process must not collide
        let a = unique_name("ForgeTest");
        let b = unique_name("ForgeTest");
        assert_ne!(a, b);
    }

    #[test]
    fn test_class_lookup() {
        let class = Class::get("NSObject").unwrap();
        assert_eq!(class.name(), "NSObject");
        assert!(Class::get("ObjforgeNoSuchClass").is_none());
        assert!(Class::metaclass("NSObject").is_some());
    }

    #[test]
    fn test_builder_lifecycle() {
        let superclass = Class::get("NSObject").unwrap();
        let mut builder = ClassBuilder::new("ForgeUnitLifecycle", superclass).unwrap();
        let name = builder.name().to_string();

        builder.add_ivar::<u64>("_value").unwrap();
        assert!(Class::get(&name).is_none(), "unregistered class must be invisible");

        let class = builder.register().unwrap();
        assert!(builder.is_registered());
        assert_eq!(Class::get(&name), Some(class));

        let obj = builder.create_instance().unwrap();
        unsafe { crate::runtime::object::release(obj) };

        builder.dispose();
        assert!(Class::get(&name).is_none(), "disposed class must be gone");

        // Idempotent
        builder.dispose();
    }

    #[test]
    fn test_configuration_rejected_after_register() {
        let superclass = Class::get("NSObject").unwrap();
        let mut builder = ClassBuilder::new("ForgeUnitSealed", superclass).unwrap();
        builder.register().unwrap();

        let result = builder.add_ivar::<u32>("_late");
        assert!(matches!(result, Err(Error::AlreadyRegistered { .. })));

        let result = builder.register();
        assert!(matches!(result, Err(Error::AlreadyRegistered { .. })));
    }

    #[test]
    fn test_instance_creation_requires_registration() {
        let superclass = Class::get("NSObject").unwrap();
        let builder = ClassBuilder::new("ForgeUnitUnregistered", superclass).unwrap();
        let result = builder.create_instance();
        assert!(matches!(result, Err(Error::NotRegistered { .. })));
    }

    #[test]
    fn test_method_signature_is_validated() {
        let superclass = Class::get("NSObject").unwrap();
        let mut builder = ClassBuilder::new("ForgeUnitBadSig", superclass).unwrap();

        unsafe extern "C" fn noop(_this: Id, _cmd: Sel) {}
        let imp = unsafe { mem::transmute::<unsafe extern "C" fn(Id, Sel), Imp>(noop) };

        let result = unsafe { builder.add_method("broken", imp, "xyz") };
        assert!(matches!(result, Err(Error::InvalidEncoding)));
    }
}
