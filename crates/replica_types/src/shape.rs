//! Shape classifier.
//!
//! Every type is classified into exactly one [`Shape`], which selects the
//! cloning algorithm for its values. Classification runs once, when the
//! type is defined or interned, and the result is stored in the pool entry.
//!
//! A struct is `Scalar` only if every field is, recursively, a simple value.
//! The pool decides that when the struct is defined (its field types are
//! already defined by then) and passes it in as `TypeFlags::IS_SIMPLE`.

use crate::data::TypeData;
use crate::flags::TypeFlags;

/// Structural category of a type.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Shape {
    /// Copied by raw value: primitives, enums, simple structs.
    Scalar,
    /// The string type.
    String,
    /// Array of rank 1.
    Array1D,
    /// Array of rank 2 or more.
    ArrayND,
    /// List- or set-like collection.
    ListOrSet,
    /// Key/value collection.
    Map,
    /// Fixed-arity tuple.
    Tuple,
    /// Any class or non-simple struct.
    Object,
    /// Abstract class, interface or the top type; always redirected.
    AbstractOrInterface,
}

impl Shape {
    /// Check if clones of this shape go through the identity map.
    pub const fn is_reference(self) -> bool {
        !matches!(self, Shape::Scalar | Shape::String)
    }

    /// Check if plans of this shape compare runtime type with declared type.
    pub const fn needs_redirect(self) -> bool {
        matches!(self, Shape::Object | Shape::AbstractOrInterface)
    }
}

/// Classify a type from its data and already-computed flags.
pub(crate) fn classify(data: &TypeData, flags: TypeFlags) -> Shape {
    match data {
        TypeData::Primitive(_) | TypeData::Enum(_) => Shape::Scalar,
        TypeData::Str => Shape::String,
        TypeData::Array { rank, .. } => {
            if *rank == 1 {
                Shape::Array1D
            } else {
                Shape::ArrayND
            }
        }
        TypeData::List(_) | TypeData::Set(_) => Shape::ListOrSet,
        TypeData::Map { .. } => Shape::Map,
        TypeData::Tuple(_) => Shape::Tuple,
        TypeData::Struct(_) | TypeData::Nullable(_) => {
            if flags.is_simple() {
                Shape::Scalar
            } else {
                Shape::Object
            }
        }
        TypeData::Any | TypeData::Interface { .. } => Shape::AbstractOrInterface,
        TypeData::Class(def) => {
            if def.is_abstract {
                Shape::AbstractOrInterface
            } else {
                Shape::Object
            }
        }
        // A declaration has no layout yet; it behaves like an open class
        // until defined, and is never cached in that state.
        TypeData::Declared { .. } => Shape::Object,
    }
}

#[cfg(test)]
mod tests;
