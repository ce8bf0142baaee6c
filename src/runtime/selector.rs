//! Selector interning and caching.
//!
//! Selectors are interned by the runtime itself: registering the same
//! name always yields the same token for the life of the process, and
//! comparison is pointer equality. This module wraps the raw token in
//! [`Sel`] and keeps a process-wide name cache in front of the
//! registration call so repeat lookups by string skip the C-string
//! round trip.
//!
//! # Thread Safety
//!
//! Interned selectors are immortal and immutable, so [`Sel`] is freely
//! shareable. The name cache is behind an `RwLock` and supports
//! concurrent lookups from multiple threads.

use crate::error::{Error, Result};
use crate::ffi;
use fxhash::FxHashMap;
use std::ffi::{CStr, CString};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ptr::NonNull;
use std::str::FromStr;
use std::sync::{OnceLock, RwLock};

/// Process-wide name -> token cache.
static CACHE: OnceLock<RwLock<FxHashMap<String, Sel>>> = OnceLock::new();

/// An interned method selector.
///
/// `Sel` is `#[repr(transparent)]` over the raw token pointer and can
/// cross the C boundary as-is, which is what the dispatch trampolines
/// rely on.
///
/// # Example
///
/// ```no_run
/// use objforge::Sel;
/// use std::str::FromStr;
///
/// let a = Sel::from_str("init").unwrap();
/// let b = Sel::from_str("init").unwrap();
///
/// // Same name, same token (runtime interning guarantee)
/// assert_eq!(a, b);
/// ```
#[repr(transparent)]
#[derive(Copy, Clone)]
pub struct Sel(NonNull<ffi::objc_selector>);

impl Sel {
    /// Registers (or looks up) the selector for a name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidName`] if the name contains an interior
    /// NUL byte.
    ///
    /// # Panics
    ///
    /// Panics if the runtime returns a null token, which it does not do
    /// for a valid NUL-terminated name.
    pub fn register(name: &str) -> Result<Sel> {
        let cname = CString::new(name).map_err(|_| Error::InvalidName {
            name: name.to_string(),
        })?;

        // SAFETY: cname is a valid NUL-terminated string; the runtime
        // interns the name and returns a process-immortal token.
        let ptr = unsafe { ffi::sel_registerName(cname.as_ptr()) };

        let ptr = NonNull::new(ptr.cast_mut()).expect("sel_registerName returned null");
        Ok(Sel(ptr))
    }

    /// Registers a selector through the process-wide name cache.
    ///
    /// The fast path is a read-locked map hit; a miss registers the
    /// name and stores the token. Either way the returned token is
    /// identical to what [`Sel::register`] yields.
    ///
    /// # Panics
    ///
    /// Panics if the name contains an interior NUL byte, or if the
    /// cache lock is poisoned.
    #[must_use]
    pub fn cached(name: &str) -> Sel {
        let cache = CACHE.get_or_init(|| RwLock::new(FxHashMap::default()));

        if let Some(sel) = cache.read().unwrap().get(name) {
            return *sel;
        }

        let sel = Sel::register(name).expect("selector name contains an interior NUL byte");

        // A racing thread may have inserted the same name meanwhile;
        // interning makes both tokens identical, so last-write-wins is fine.
        cache.write().unwrap().insert(name.to_string(), sel);
        sel
    }

    /// Returns the selector's name.
    ///
    /// # Panics
    ///
    /// Panics if the runtime hands back a name that is not valid UTF-8,
    /// which does not happen for names registered through this crate.
    #[must_use]
    pub fn name(&self) -> String {
        // SAFETY: the token is interned and sel_getName returns its
        // immortal NUL-terminated name.
        let cstr = unsafe { CStr::from_ptr(ffi::sel_getName(self.as_ptr())) };
        cstr.to_str().expect("selector name is not UTF-8").to_string()
    }

    /// Returns the raw token pointer.
    #[inline]
    #[must_use]
    pub fn as_ptr(&self) -> *const ffi::objc_selector {
        self.0.as_ptr()
    }

    /// Wraps a raw token received from the runtime (e.g. the `_cmd`
    /// argument of a method implementation).
    ///
    /// # Safety
    ///
    /// `ptr` must be a selector token obtained from the runtime.
    #[inline]
    #[must_use]
    pub unsafe fn from_ptr(ptr: *const ffi::objc_selector) -> Option<Sel> {
        NonNull::new(ptr.cast_mut()).map(Sel)
    }
}

impl FromStr for Sel {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self> {
        Sel::register(name)
    }
}

// SAFETY: Sel is Send + Sync because interned selector tokens are
// process-immortal and immutable; the wrapper holds no other state.
unsafe impl Send for Sel {}
unsafe impl Sync for Sel {}

impl PartialEq for Sel {
    fn eq(&self, other: &Self) -> bool {
        // Pointer equality: same name = same token (interning guarantee)
        std::ptr::eq(self.0.as_ptr(), other.0.as_ptr())
    }
}

impl Eq for Sel {}

impl Hash for Sel {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_usize(self.0.as_ptr() as usize);
    }
}

impl fmt::Debug for Sel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sel").field("name", &self.name()).finish()
    }
}

/// A selector given either as a pre-resolved token or by name.
///
/// Every dispatch helper accepts `impl ToSelector`, mirroring the two
/// call shapes the runtime supports.
pub trait ToSelector {
    /// Resolves to an interned token.
    fn to_sel(&self) -> Sel;
}

impl ToSelector for Sel {
    #[inline]
    fn to_sel(&self) -> Sel {
        *self
    }
}

impl ToSelector for &str {
    /// # Panics
    ///
    /// Panics if the name contains an interior NUL byte.
    #[inline]
    fn to_sel(&self) -> Sel {
        Sel::cached(self)
    }
}

impl ToSelector for String {
    /// # Panics
    ///
    /// Panics if the name contains an interior NUL byte.
    #[inline]
    fn to_sel(&self) -> Sel {
        Sel::cached(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selector_interning() {
        let a = Sel::register("init").unwrap();
        let b = Sel::register("init").unwrap();

        // Same name = same token
        assert!(std::ptr::eq(a.as_ptr(), b.as_ptr()));
        assert_eq!(a, b);
    }

    #[test]
    fn test_selector_cached_identity() {
        let direct = Sel::register("objforgeCachedSelector:").unwrap();
        let cached1 = Sel::cached("objforgeCachedSelector:");
        let cached2 = Sel::cached("objforgeCachedSelector:");

        assert_eq!(direct, cached1);
        assert_eq!(cached1, cached2);
    }

    #[test]
    fn test_selector_name_round_trip() {
        let sel = Sel::register("doSomething:withObject:").unwrap();
        assert_eq!(sel.name(), "doSomething:withObject:");
    }

    #[test]
    fn test_selector_different_names() {
        let a = Sel::register("objforgeSelA").unwrap();
        let b = Sel::register("objforgeSelB").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_interior_nul_rejected() {
        let result = Sel::register("bad\0name");
        assert!(matches!(result, Err(Error::InvalidName { .. })));
    }

    #[test]
    fn test_to_selector() {
        let sel = Sel::register("objforgeToSelector").unwrap();
        assert_eq!(sel.to_sel(), sel);
        assert_eq!("objforgeToSelector".to_sel(), sel);
        assert_eq!(String::from("objforgeToSelector").to_sel(), sel);
    }
}
