//! Pre-computed type metadata flags.
//!
//! `TypeFlags` are computed once when a type is defined and cached in its
//! pool entry, so the clone engine can answer "is this simple?" or "can
//! this be subtyped?" without walking the type again.

use bitflags::bitflags;

bitflags! {
    /// Pre-computed type properties for O(1) queries.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct TypeFlags: u32 {
        // === Category Flags (bits 0-7) ===

        /// Built-in scalar (`bool`, `int`, `decimal`, `Guid`, ...).
        const IS_PRIMITIVE = 1 << 0;
        /// Copied by value (primitive, enum, struct, nullable).
        const IS_VALUE_TYPE = 1 << 1;
        /// Generic container (array, list, set, map, tuple).
        const IS_CONTAINER = 1 << 2;
        /// Declared by name (class, struct, enum, interface).
        const IS_NOMINAL = 1 << 3;
        /// Interface type.
        const IS_INTERFACE = 1 << 4;

        // === Layout Flags (bits 8-15) ===

        /// Value type whose fields are all, recursively, simple.
        ///
        /// Simple values are copied raw and never enter the identity map.
        const IS_SIMPLE = 1 << 8;
        /// Class that cannot be derived from.
        const IS_SEALED = 1 << 9;
        /// Class that cannot be instantiated directly.
        const IS_ABSTRACT = 1 << 10;
        /// Has a parameterless constructor.
        const HAS_DEFAULT_CTOR = 1 << 11;

        // === State Flags (bits 16-23) ===

        /// Definition is complete (not just a forward declaration).
        const IS_DEFINED = 1 << 16;
    }
}

impl TypeFlags {
    /// Flags every simple built-in scalar carries.
    pub const SCALAR: Self = Self::from_bits_truncate(
        Self::IS_PRIMITIVE.bits()
            | Self::IS_VALUE_TYPE.bits()
            | Self::IS_SIMPLE.bits()
            | Self::IS_DEFINED.bits(),
    );

    /// Check if values of this type are copied by value.
    #[inline]
    pub const fn is_value_type(self) -> bool {
        self.contains(Self::IS_VALUE_TYPE)
    }

    /// Check if values of this type bypass recursion and the identity map.
    #[inline]
    pub const fn is_simple(self) -> bool {
        self.contains(Self::IS_SIMPLE)
    }

    /// Check if a value declared as this type can have a different runtime type.
    ///
    /// Sealed classes and every non-class type have an exact runtime type.
    #[inline]
    pub const fn is_open(self) -> bool {
        self.contains(Self::IS_NOMINAL)
            && !self.contains(Self::IS_VALUE_TYPE)
            && !self.contains(Self::IS_SEALED)
    }

    /// Check if the definition is complete.
    #[inline]
    pub const fn is_defined(self) -> bool {
        self.contains(Self::IS_DEFINED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_flags_are_simple_values() {
        assert!(TypeFlags::SCALAR.is_value_type());
        assert!(TypeFlags::SCALAR.is_simple());
        assert!(TypeFlags::SCALAR.is_defined());
        assert!(!TypeFlags::SCALAR.is_open());
    }

    #[test]
    fn open_requires_unsealed_nominal_reference() {
        let class = TypeFlags::IS_NOMINAL | TypeFlags::IS_DEFINED;
        assert!(class.is_open());
        assert!(!(class | TypeFlags::IS_SEALED).is_open());
        assert!(!(class | TypeFlags::IS_VALUE_TYPE).is_open());
        assert!(!TypeFlags::IS_CONTAINER.is_open());
    }
}
