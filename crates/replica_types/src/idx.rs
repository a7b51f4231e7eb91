//! Type index handle.
//!
//! `Idx` is the only way to name a type. Every type lives in a `TypePool`
//! and is referenced by its 32-bit index.
//!
//! # Design
//!
//! - Primitive types have fixed indices so they can be named without a pool
//! - Type identity is index equality (O(1))
//! - `Copy`, cheap to pass and to use as a hash key

use std::fmt;

/// A 32-bit index into a type pool.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct Idx(u32);

impl Idx {
    // === Pre-interned types (indices 0-16) ===

    /// The universal top type. Every value is assignable to it.
    pub const ANY: Self = Self(0);
    /// `bool`
    pub const BOOL: Self = Self(1);
    /// `char` (Unicode scalar value)
    pub const CHAR: Self = Self(2);
    /// `sbyte`
    pub const I8: Self = Self(3);
    /// `short`
    pub const I16: Self = Self(4);
    /// `int`
    pub const I32: Self = Self(5);
    /// `long`
    pub const I64: Self = Self(6);
    /// `byte`
    pub const U8: Self = Self(7);
    /// `ushort`
    pub const U16: Self = Self(8);
    /// `uint`
    pub const U32: Self = Self(9);
    /// `ulong`
    pub const U64: Self = Self(10);
    /// `float`
    pub const F32: Self = Self(11);
    /// `double`
    pub const F64: Self = Self(12);
    /// High-precision decimal.
    pub const DECIMAL: Self = Self(13);
    /// Point in time (UTC).
    pub const DATE_TIME: Self = Self(14);
    /// Globally unique identifier.
    pub const GUID: Self = Self(15);
    /// Immutable UTF-8 string (a reference type).
    pub const STR: Self = Self(16);

    // === Reserved Range (17-63) ===

    /// First index handed out to user-defined and structural types.
    pub const FIRST_DYNAMIC: u32 = 64;

    /// Number of pre-interned types.
    pub const BUILTIN_COUNT: u32 = 17;

    /// Sentinel meaning "no type".
    pub const NONE: Self = Self(u32::MAX);

    /// Create an index from a raw value.
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Get the raw value.
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Check if this is one of the pre-interned types.
    #[inline]
    pub const fn is_builtin(self) -> bool {
        self.0 < Self::BUILTIN_COUNT
    }

    /// Check if this is the `NONE` sentinel.
    #[inline]
    pub const fn is_none(self) -> bool {
        self.0 == u32::MAX
    }

    /// Human-readable name of a pre-interned type.
    ///
    /// Returns `None` for dynamic types, which need a pool to be rendered.
    pub const fn builtin_name(self) -> Option<&'static str> {
        match self.0 {
            0 => Some("object"),
            1 => Some("bool"),
            2 => Some("char"),
            3 => Some("sbyte"),
            4 => Some("short"),
            5 => Some("int"),
            6 => Some("long"),
            7 => Some("byte"),
            8 => Some("ushort"),
            9 => Some("uint"),
            10 => Some("ulong"),
            11 => Some("float"),
            12 => Some("double"),
            13 => Some("decimal"),
            14 => Some("DateTime"),
            15 => Some("Guid"),
            16 => Some("string"),
            _ => None,
        }
    }
}

impl fmt::Debug for Idx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_none() {
            return write!(f, "Idx::NONE");
        }
        match self.builtin_name() {
            Some(name) => write!(f, "Idx({name})"),
            None => write!(f, "Idx({})", self.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtins_are_below_first_dynamic() {
        assert!(Idx::STR.raw() < Idx::FIRST_DYNAMIC);
        assert!(Idx::STR.is_builtin());
        assert!(!Idx::from_raw(Idx::FIRST_DYNAMIC).is_builtin());
    }

    #[test]
    fn builtin_names() {
        assert_eq!(Idx::ANY.builtin_name(), Some("object"));
        assert_eq!(Idx::I32.builtin_name(), Some("int"));
        assert_eq!(Idx::STR.builtin_name(), Some("string"));
        assert_eq!(Idx::from_raw(Idx::FIRST_DYNAMIC).builtin_name(), None);
    }

    #[test]
    fn debug_format() {
        assert_eq!(format!("{:?}", Idx::BOOL), "Idx(bool)");
        assert_eq!(format!("{:?}", Idx::from_raw(70)), "Idx(70)");
        assert_eq!(format!("{:?}", Idx::NONE), "Idx::NONE");
    }
}
