//! Type-encoding generation for Objective-C method signatures.
//!
//! This module maps static Rust types onto the runtime's textual
//! type-signature grammar (the `@encode()` grammar). Encodings are what
//! the runtime stores next to every method and instance variable, and
//! what [`crate::runtime::class::ClassBuilder`] hands to the method and
//! ivar registration calls.
//!
//! # Encoding Format
//!
//! Each type encodes to one short fragment; fragments concatenate left
//! to right, in argument order:
//!
//! - `v` - void
//! - `B` - boolean
//! - `c`/`C`, `s`/`S`, `i`/`I`, `q`/`Q`, `t`/`T` - signed/unsigned
//!   integers by byte width 1/2/4/8/16 (`l`/`L` when the platform
//!   `long` is the 4-byte source type)
//! - `f`, `d`, `D` - float, double, long double
//! - `^f`, `^d`, `^v` - pointer to float/double/void
//! - `*` - the null-pointer-constant marker ([`Nil`])
//! - `@` - object handle (id)
//! - `:` - selector (SEL)
//! - `#` - class handle
//! - `^Name` - pointer to a named struct
//! - `{Name=...}` - aggregate with member encodings
//! - `?` - unknown category
//!
//! A method signature is return type first, then `@` (self), `:`
//! (_cmd), then the declared arguments: `"v@:"`, `"i@:if"`, ...
//!
//! # Unknown categories
//!
//! The generator never degrades silently: the set of [`Encode`] impls
//! is closed, and the `?` category only exists as the explicit
//! [`Encoding::unknown`] value, which keeps its unknown-ness through
//! concatenation so callers can check [`Encoding::is_known`] before
//! registering anything.

use crate::error::{Error, Result};
use std::ffi::c_void;
use std::fmt;
use std::mem;
use std::os::raw::c_long;

/// Type encoding constant definitions.
pub mod types {
    /// Void type encoding
    pub const VOID: &str = "v";

    /// Boolean type encoding
    pub const BOOL: &str = "B";

    /// Signed 1-byte integer type encoding
    pub const CHAR: &str = "c";

    /// Unsigned 1-byte integer type encoding
    pub const UCHAR: &str = "C";

    /// Signed 2-byte integer type encoding
    pub const SHORT: &str = "s";

    /// Unsigned 2-byte integer type encoding
    pub const USHORT: &str = "S";

    /// Signed 4-byte integer type encoding
    pub const INT: &str = "i";

    /// Unsigned 4-byte integer type encoding
    pub const UINT: &str = "I";

    /// Platform `long` type encoding (4-byte `long` targets only)
    pub const LONG: &str = "l";

    /// Platform `unsigned long` type encoding (4-byte `long` targets only)
    pub const ULONG: &str = "L";

    /// Signed 8-byte integer type encoding
    pub const LONG_LONG: &str = "q";

    /// Unsigned 8-byte integer type encoding
    pub const ULONG_LONG: &str = "Q";

    /// Signed 16-byte integer type encoding
    pub const INT128: &str = "t";

    /// Unsigned 16-byte integer type encoding
    pub const UINT128: &str = "T";

    /// Float (f32) type encoding
    pub const FLOAT: &str = "f";

    /// Double (f64) type encoding
    pub const DOUBLE: &str = "d";

    /// Long double type encoding (no distinct Rust type exists)
    pub const LONG_DOUBLE: &str = "D";

    /// C string / null-pointer-constant type encoding
    pub const C_STRING: &str = "*";

    /// Pointer prefix
    pub const POINTER: &str = "^";

    /// Object (id) type encoding
    pub const OBJECT: &str = "@";

    /// Selector (SEL) type encoding
    pub const SELECTOR: &str = ":";

    /// Class type encoding
    pub const CLASS: &str = "#";

    /// Unknown-category type encoding
    pub const UNKNOWN: &str = "?";
}

/// An encoding fragment: one or more concatenated type codes.
///
/// Carries an explicit "known" bit so the degraded `?` category is
/// visible to callers instead of disappearing into the string.
/// Concatenation via [`Encoding::append`] preserves both the textual
/// order and the unknown-ness of every part.
///
/// # Example
///
/// ```
/// use objforge::runtime::encoding::Encoding;
///
/// let enc = Encoding::new("i").append(&Encoding::new("f"));
/// assert_eq!(enc.as_str(), "if");
/// assert!(enc.is_known());
///
/// let degraded = enc.append(&Encoding::unknown());
/// assert_eq!(degraded.as_str(), "if?");
/// assert!(!degraded.is_known());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Encoding {
    code: String,
    known: bool,
}

impl Encoding {
    /// Creates a known encoding from a raw code fragment.
    pub fn new(code: impl Into<String>) -> Self {
        Encoding {
            code: code.into(),
            known: true,
        }
    }

    /// The explicit unknown-category encoding (`?`).
    #[must_use]
    pub fn unknown() -> Self {
        Encoding {
            code: types::UNKNOWN.to_string(),
            known: false,
        }
    }

    /// Returns the encoding text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.code
    }

    /// Consumes the encoding, returning the owned text.
    #[must_use]
    pub fn into_string(self) -> String {
        self.code
    }

    /// Returns `false` if any concatenated part was the unknown category.
    #[must_use]
    pub fn is_known(&self) -> bool {
        self.known
    }

    /// Concatenates another fragment onto this one, left to right.
    #[must_use]
    pub fn append(mut self, other: &Encoding) -> Self {
        self.code.push_str(&other.code);
        self.known &= other.known;
        self
    }

    /// Pointer to a named struct with no compile-time tag: `^Name`.
    ///
    /// # Example
    ///
    /// ```
    /// use objforge::runtime::encoding::Encoding;
    ///
    /// assert_eq!(Encoding::pointer_to("Foo").as_str(), "^Foo");
    /// ```
    #[must_use]
    pub fn pointer_to(name: &str) -> Self {
        Encoding::new(format!("{}{name}", types::POINTER))
    }

    /// Aggregate of the given members: `{Name=members}`.
    ///
    /// # Example
    ///
    /// ```
    /// use objforge::runtime::encoding::{Encode, Encoding};
    ///
    /// let members = i32::encoding().append(&f32::encoding());
    /// assert_eq!(Encoding::aggregate("Point", &members).as_str(), "{Point=if}");
    /// ```
    #[must_use]
    pub fn aggregate(name: &str, members: &Encoding) -> Self {
        Encoding {
            code: format!("{{{name}={}}}", members.code),
            known: members.known,
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.code)
    }
}

/// Marker for the null-pointer-constant argument category.
///
/// Encodes as `*`, the fragment the call protocol assigns to a null
/// pointer constant. This is an encoding-only marker; the value to
/// pass as an actual null argument is
/// [`nil`](crate::runtime::object::nil).
pub struct Nil;

/// Compile-time mapping from a static type to its encoding fragment.
///
/// The impl set is closed over the categories the runtime's grammar
/// can express from Rust types; anything outside it simply does not
/// implement `Encode`, so nothing degrades to `?` silently.
///
/// # Example
///
/// ```
/// use objforge::runtime::encoding::Encode;
///
/// assert_eq!(i32::encoding().as_str(), "i");
/// assert_eq!(<*mut f64>::encoding().as_str(), "^d");
/// assert_eq!(<()>::encoding().as_str(), "v");
/// ```
pub trait Encode {
    /// Returns the encoding fragment for this type.
    fn encoding() -> Encoding;
}

macro_rules! encode_simple {
    ($($t:ty => $code:expr,)*) => {
        $(
            impl Encode for $t {
                fn encoding() -> Encoding {
                    Encoding::new($code)
                }
            }
        )*
    };
}

encode_simple! {
    () => types::VOID,
    bool => types::BOOL,
    i8 => types::CHAR,
    u8 => types::UCHAR,
    i16 => types::SHORT,
    u16 => types::USHORT,
    i32 => types::INT,
    u32 => types::UINT,
    i64 => types::LONG_LONG,
    u64 => types::ULONG_LONG,
    i128 => types::INT128,
    u128 => types::UINT128,
    f32 => types::FLOAT,
    f64 => types::DOUBLE,
    Nil => types::C_STRING,
    *const f32 => "^f",
    *mut f32 => "^f",
    *const f64 => "^d",
    *mut f64 => "^d",
    *const c_void => "^v",
    *mut c_void => "^v",
}

impl Encode for isize {
    fn encoding() -> Encoding {
        int_encoding(mem::size_of::<isize>(), true)
    }
}

impl Encode for usize {
    fn encoding() -> Encoding {
        int_encoding(mem::size_of::<usize>(), false)
    }
}

#[cfg(target_os = "macos")]
impl Encode for *mut crate::ffi::objc_object {
    fn encoding() -> Encoding {
        Encoding::new(types::OBJECT)
    }
}

#[cfg(target_os = "macos")]
impl Encode for *const crate::ffi::objc_object {
    fn encoding() -> Encoding {
        Encoding::new(types::OBJECT)
    }
}

#[cfg(target_os = "macos")]
impl Encode for crate::runtime::selector::Sel {
    fn encoding() -> Encoding {
        Encoding::new(types::SELECTOR)
    }
}

#[cfg(target_os = "macos")]
impl Encode for crate::runtime::class::Class {
    fn encoding() -> Encoding {
        Encoding::new(types::CLASS)
    }
}

/// Integer encoding by byte width.
fn int_encoding(size: usize, signed: bool) -> Encoding {
    let code = match (size, signed) {
        (1, true) => types::CHAR,
        (1, false) => types::UCHAR,
        (2, true) => types::SHORT,
        (2, false) => types::USHORT,
        (4, true) => types::INT,
        (4, false) => types::UINT,
        (8, true) => types::LONG_LONG,
        (8, false) => types::ULONG_LONG,
        (16, true) => types::INT128,
        (16, false) => types::UINT128,
        _ => return Encoding::unknown(),
    };
    Encoding::new(code)
}

/// Encoding of the platform `long` type.
///
/// `l` is only ever emitted where `long` is 4 bytes; on LP64 targets
/// the platform `long` falls into the 8-byte width row and encodes as
/// `q`, matching the call protocol's convention.
#[must_use]
pub fn long_encoding() -> Encoding {
    if mem::size_of::<c_long>() == 4 {
        Encoding::new(types::LONG)
    } else {
        int_encoding(mem::size_of::<c_long>(), true)
    }
}

/// Encoding of the platform `unsigned long` type.
#[must_use]
pub fn ulong_encoding() -> Encoding {
    if mem::size_of::<c_long>() == 4 {
        Encoding::new(types::ULONG)
    } else {
        int_encoding(mem::size_of::<c_long>(), false)
    }
}

/// A named struct tag registered at compile time.
///
/// The counterpart of [`Encoding::pointer_to`]/[`Encoding::aggregate`]
/// for types that carry their runtime name themselves.
///
/// # Example
///
/// ```
/// use objforge::runtime::encoding::{tagged_aggregate, tagged_pointer, EncodeTag};
///
/// struct Point {
///     x: i32,
///     y: f32,
/// }
///
/// impl EncodeTag for Point {
///     const TAG: &'static str = "Point";
/// }
///
/// assert_eq!(tagged_pointer::<Point>().as_str(), "^Point");
/// assert_eq!(tagged_aggregate::<Point, (i32, f32)>().as_str(), "{Point=if}");
/// ```
pub trait EncodeTag {
    /// The struct's registered runtime name.
    const TAG: &'static str;
}

/// Pointer to a tagged struct: `^TAG`.
#[must_use]
pub fn tagged_pointer<T: EncodeTag>() -> Encoding {
    Encoding::pointer_to(T::TAG)
}

/// Tagged aggregate with the given member list: `{TAG=members}`.
#[must_use]
pub fn tagged_aggregate<T: EncodeTag, M: EncodeArgs>() -> Encoding {
    Encoding::aggregate(T::TAG, &M::encodings())
}

/// An ordered list of encodable types, concatenated left to right.
///
/// Implemented on tuples up to arity 8. The empty tuple is the empty
/// argument list (not `v` - that is `()` through [`Encode`]).
pub trait EncodeArgs {
    /// Concatenated encodings of every element, in order.
    fn encodings() -> Encoding;
}

macro_rules! encode_args_impl {
    ($($t:ident),*) => {
        impl<$($t: Encode),*> EncodeArgs for ($($t,)*) {
            fn encodings() -> Encoding {
                let enc = Encoding::new("");
                $(let enc = enc.append(&$t::encoding());)*
                enc
            }
        }
    };
}

encode_args_impl!();
encode_args_impl!(A);
encode_args_impl!(A, B);
encode_args_impl!(A, B, C);
encode_args_impl!(A, B, C, D);
encode_args_impl!(A, B, C, D, E);
encode_args_impl!(A, B, C, D, E, F);
encode_args_impl!(A, B, C, D, E, F, G);
encode_args_impl!(A, B, C, D, E, F, G, H);

/// Builds a full method signature: return type, `@` (self), `:` (_cmd),
/// then the declared arguments.
///
/// # Example
///
/// ```
/// use objforge::runtime::encoding::method_signature;
///
/// assert_eq!(method_signature::<(), ()>().as_str(), "v@:");
/// assert_eq!(method_signature::<i32, (i32, f32)>().as_str(), "i@:if");
/// ```
#[must_use]
pub fn method_signature<R: Encode, A: EncodeArgs>() -> Encoding {
    R::encoding()
        .append(&Encoding::new(types::OBJECT))
        .append(&Encoding::new(types::SELECTOR))
        .append(&A::encodings())
}

/// Validates a type encoding string for a method signature.
///
/// Method signatures must carry at least a return type, the `@` self
/// slot and the `:` _cmd slot - the calling convention every method
/// receives. Only well-formedness is checked; whether the types match
/// what a selector actually expects is out of this layer's reach.
///
/// # Example
///
/// ```
/// use objforge::runtime::encoding::validate_signature;
///
/// assert!(validate_signature("v@:").is_ok());
/// assert!(validate_signature("i@:{Point=if}").is_ok());
/// assert!(validate_signature("@").is_err()); // Missing self and _cmd
/// assert!(validate_signature("xyz").is_err());
/// ```
///
/// # Errors
///
/// Returns [`Error::InvalidEncoding`] if the string is empty, contains
/// a malformed fragment, or lacks the `@`/`:` convention slots.
pub fn validate_signature(encoding: &str) -> Result<()> {
    parse_signature(encoding).map(|_| ())
}

/// Parses a method signature into return encoding and argument encodings.
///
/// The argument list includes the `@` and `:` convention slots, in the
/// order they appear.
///
/// # Example
///
/// ```
/// use objforge::runtime::encoding::parse_signature;
///
/// let (ret, args) = parse_signature("i@:i^v").unwrap();
/// assert_eq!(ret, "i");
/// assert_eq!(args, vec!["@", ":", "i", "^v"]);
/// ```
///
/// # Errors
///
/// Returns [`Error::InvalidEncoding`] under the same conditions as
/// [`validate_signature`].
pub fn parse_signature(encoding: &str) -> Result<(String, Vec<String>)> {
    let mut tokens = Vec::new();
    let mut rest = encoding;
    while !rest.is_empty() {
        let (token, tail) = split_token(rest)?;
        tokens.push(token.to_string());
        rest = tail;
    }

    // ret + self (@) + _cmd (:) at minimum
    if tokens.len() < 3 || tokens[1] != types::OBJECT || tokens[2] != types::SELECTOR {
        return Err(Error::InvalidEncoding);
    }

    let ret = tokens.remove(0);
    Ok((ret, tokens))
}

/// Returns the byte width of a single encoded type.
///
/// Pointer categories use the target pointer width; aggregates sum
/// their member widths (packed, no padding model). Returns `None` for
/// the unknown category and malformed fragments.
///
/// # Example
///
/// ```
/// use objforge::runtime::encoding::size_of_encoded;
///
/// assert_eq!(size_of_encoded("i"), Some(4));
/// assert_eq!(size_of_encoded("{Point=if}"), Some(8));
/// assert_eq!(size_of_encoded("^{Foo=}"), Some(std::mem::size_of::<usize>()));
/// assert_eq!(size_of_encoded("?"), None);
/// ```
#[must_use]
pub fn size_of_encoded(encoding: &str) -> Option<usize> {
    let first = *encoding.as_bytes().first()?;
    match first {
        b'v' => Some(0),
        b'B' | b'c' | b'C' => Some(1),
        b's' | b'S' => Some(2),
        b'i' | b'I' | b'l' | b'L' | b'f' => Some(4),
        b'q' | b'Q' | b'd' => Some(8),
        b't' | b'T' | b'D' => Some(16),
        b'*' | b'@' | b':' | b'#' | b'^' => Some(mem::size_of::<*const ()>()),
        b'{' => {
            let close = find_matching_brace(encoding).ok()?;
            let eq = encoding[..close].find('=')?;
            let mut members = &encoding[eq + 1..close];
            let mut total = 0;
            while !members.is_empty() {
                let (token, tail) = split_token(members).ok()?;
                total += size_of_encoded(token)?;
                members = tail;
            }
            Some(total)
        }
        _ => None,
    }
}

/// Splits one encoded type off the front of a signature string.
fn split_token(s: &str) -> Result<(&str, &str)> {
    let first = *s.as_bytes().first().ok_or(Error::InvalidEncoding)?;
    match first {
        b'^' => {
            let (pointee, _) = split_pointee(&s[1..])?;
            let len = 1 + pointee.len();
            Ok((&s[..len], &s[len..]))
        }
        b'{' => {
            let close = find_matching_brace(s)?;
            Ok((&s[..=close], &s[close + 1..]))
        }
        c if is_simple_type(c) => Ok((&s[..1], &s[1..])),
        _ => Err(Error::InvalidEncoding),
    }
}

/// Splits the pointee of a `^` fragment: another fragment, or a bare
/// struct name (the `^Name` form).
fn split_pointee(s: &str) -> Result<(&str, &str)> {
    let first = *s.as_bytes().first().ok_or(Error::InvalidEncoding)?;
    match first {
        b'^' | b'{' => split_token(s),
        c if is_simple_type(c) => Ok((&s[..1], &s[1..])),
        c if c.is_ascii_alphabetic() || c == b'_' => {
            let end = s
                .bytes()
                .position(|b| !(b.is_ascii_alphanumeric() || b == b'_'))
                .unwrap_or(s.len());
            Ok((&s[..end], &s[end..]))
        }
        _ => Err(Error::InvalidEncoding),
    }
}

/// Returns the byte index of the `}` matching the `{` at index 0.
fn find_matching_brace(s: &str) -> Result<usize> {
    let mut depth = 0usize;
    for (i, b) in s.bytes().enumerate() {
        match b {
            b'{' => depth += 1,
            b'}' => {
                depth = depth.checked_sub(1).ok_or(Error::InvalidEncoding)?;
                if depth == 0 {
                    return Ok(i);
                }
            }
            _ => {}
        }
    }
    Err(Error::InvalidEncoding)
}

const fn is_simple_type(c: u8) -> bool {
    matches!(
        c,
        b'v' | b'B'
            | b'c'
            | b'C'
            | b's'
            | b'S'
            | b'i'
            | b'I'
            | b'l'
            | b'L'
            | b'q'
            | b'Q'
            | b't'
            | b'T'
            | b'f'
            | b'd'
            | b'D'
            | b'*'
            | b'@'
            | b':'
            | b'#'
            | b'?'
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_encodings() {
        assert_eq!(<()>::encoding().as_str(), "v");
        assert_eq!(bool::encoding().as_str(), "B");
        assert_eq!(i8::encoding().as_str(), "c");
        assert_eq!(u8::encoding().as_str(), "C");
        assert_eq!(i16::encoding().as_str(), "s");
        assert_eq!(u16::encoding().as_str(), "S");
        assert_eq!(i32::encoding().as_str(), "i");
        assert_eq!(u32::encoding().as_str(), "I");
        assert_eq!(i64::encoding().as_str(), "q");
        assert_eq!(u64::encoding().as_str(), "Q");
        assert_eq!(i128::encoding().as_str(), "t");
        assert_eq!(u128::encoding().as_str(), "T");
        assert_eq!(f32::encoding().as_str(), "f");
        assert_eq!(f64::encoding().as_str(), "d");
    }

    #[test]
    fn test_pointer_encodings() {
        assert_eq!(<*const f32>::encoding().as_str(), "^f");
        assert_eq!(<*mut f32>::encoding().as_str(), "^f");
        assert_eq!(<*const f64>::encoding().as_str(), "^d");
        assert_eq!(<*mut f64>::encoding().as_str(), "^d");
        assert_eq!(<*mut c_void>::encoding().as_str(), "^v");
        assert_eq!(Nil::encoding().as_str(), "*");
        assert_eq!(Encoding::pointer_to("Foo").as_str(), "^Foo");
    }

    #[test]
    fn test_pointer_width_encodings() {
        // isize/usize follow the target pointer width
        let expected = if mem::size_of::<usize>() == 8 {
            ("q", "Q")
        } else {
            ("i", "I")
        };
        assert_eq!(isize::encoding().as_str(), expected.0);
        assert_eq!(usize::encoding().as_str(), expected.1);
    }

    #[test]
    fn test_long_encoding_by_width() {
        let enc = long_encoding();
        if mem::size_of::<c_long>() == 4 {
            assert_eq!(enc.as_str(), "l");
            assert_eq!(ulong_encoding().as_str(), "L");
        } else {
            assert_eq!(enc.as_str(), "q");
            assert_eq!(ulong_encoding().as_str(), "Q");
        }
    }

    #[test]
    fn test_concatenation_preserves_order() {
        let enc = <(i32, f32, bool)>::encodings();
        assert_eq!(enc.as_str(), "ifB");

        let individual = i32::encoding()
            .append(&f32::encoding())
            .append(&bool::encoding());
        assert_eq!(enc, individual);
    }

    #[test]
    fn test_aggregate_encoding() {
        let members = <(i32, f32)>::encodings();
        let enc = Encoding::aggregate("Point", &members);
        assert_eq!(enc.as_str(), "{Point=if}");
        assert!(enc.is_known());
    }

    struct Point;

    impl EncodeTag for Point {
        const TAG: &'static str = "Point";
    }

    #[test]
    fn test_tagged_encodings() {
        assert_eq!(tagged_pointer::<Point>().as_str(), "^Point");
        assert_eq!(tagged_aggregate::<Point, (i32, f32)>().as_str(), "{Point=if}");
    }

    #[test]
    fn test_unknown_is_explicit() {
        let enc = Encoding::unknown();
        assert_eq!(enc.as_str(), "?");
        assert!(!enc.is_known());

        // unknown-ness survives concatenation
        let combined = i32::encoding().append(&Encoding::unknown());
        assert_eq!(combined.as_str(), "i?");
        assert!(!combined.is_known());
    }

    #[test]
    fn test_method_signature() {
        assert_eq!(method_signature::<(), ()>().as_str(), "v@:");
        assert_eq!(method_signature::<i32, (i32,)>().as_str(), "i@:i");
        assert_eq!(method_signature::<bool, (f64, u64)>().as_str(), "B@:dQ");
    }

    #[test]
    fn test_validate_signature_valid() {
        assert!(validate_signature("v@:").is_ok());
        assert!(validate_signature("i@:i").is_ok());
        assert!(validate_signature("@@:@").is_ok());
        assert!(validate_signature("v@:{Point=if}^v").is_ok());
        assert!(validate_signature("B@:^{Foo=}").is_ok());
    }

    #[test]
    fn test_validate_signature_invalid() {
        assert!(validate_signature("").is_err());
        assert!(validate_signature("xyz").is_err());
        assert!(validate_signature("@").is_err()); // Missing self and _cmd
        assert!(validate_signature("v:@").is_err()); // Convention slots swapped
        assert!(validate_signature("v@:{Point=if").is_err()); // Unbalanced brace
    }

    #[test]
    fn test_parse_signature() {
        let (ret, args) = parse_signature("i@:if").unwrap();
        assert_eq!(ret, "i");
        assert_eq!(args, vec!["@", ":", "i", "f"]);

        let (ret, args) = parse_signature("v@:{Point=if}^Foo").unwrap();
        assert_eq!(ret, "v");
        assert_eq!(args, vec!["@", ":", "{Point=if}", "^Foo"]);
    }

    #[test]
    fn test_size_of_encoded() {
        assert_eq!(size_of_encoded("v"), Some(0));
        assert_eq!(size_of_encoded("c"), Some(1));
        assert_eq!(size_of_encoded("s"), Some(2));
        assert_eq!(size_of_encoded("i"), Some(4));
        assert_eq!(size_of_encoded("l"), Some(4));
        assert_eq!(size_of_encoded("q"), Some(8));
        assert_eq!(size_of_encoded("t"), Some(16));
        assert_eq!(size_of_encoded("f"), Some(4));
        assert_eq!(size_of_encoded("d"), Some(8));

        let ptr = mem::size_of::<*const ()>();
        assert_eq!(size_of_encoded("@"), Some(ptr));
        assert_eq!(size_of_encoded(":"), Some(ptr));
        assert_eq!(size_of_encoded("#"), Some(ptr));
        assert_eq!(size_of_encoded("^v"), Some(ptr));
        assert_eq!(size_of_encoded("^{Foo=}"), Some(ptr));

        assert_eq!(size_of_encoded("{Point=if}"), Some(8));
        assert_eq!(size_of_encoded("{Pair={Point=if}d}"), Some(16));

        assert_eq!(size_of_encoded("?"), None);
        assert_eq!(size_of_encoded(""), None);
        assert_eq!(size_of_encoded("{Broken"), None);
    }
}
