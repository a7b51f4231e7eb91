//! Reflective type pool for the replica clone engine.
//!
//! Every value on a replica heap is described by a type in a [`TypePool`]:
//! built-in scalars and `string` at fixed [`Idx`] constants, user classes,
//! structs, enums and interfaces defined through builders, and interned
//! structural types (arrays, lists, sets, maps, tuples, nullables).
//!
//! Each type carries pre-computed [`TypeFlags`] and a [`Shape`], which the
//! engine uses to choose a cloning algorithm without walking the type again.

mod data;
mod error;
mod flags;
mod idx;
mod pool;
mod shape;

pub use data::{
    slot_of, ClassDef, Construction, DeclaredKind, EnumDef, FieldAccess, FieldDef, FieldSlot,
    Layout, Primitive, StaticDef, StructDef, TupleElems, TypeData,
};
pub use error::TypeDefError;
pub use flags::TypeFlags;
pub use idx::Idx;
pub use pool::{ClassBuilder, StructBuilder, TypeEntry, TypePool, MAX_ARRAY_RANK, MAX_TUPLE_ARITY};
pub use shape::Shape;
