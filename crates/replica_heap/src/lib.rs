//! Managed heap for the replica clone engine.
//!
//! Values with reference identity (class instances, arrays, lists, sets,
//! maps, tuples) live in a [`Heap`] arena and are named by [`ObjRef`]
//! handles; scalars, strings and structs are stored inline in a [`Value`].
//! Handles make cyclic graphs ordinary data: no reference counting, no
//! interior mutability.

mod compare;
mod error;
mod heap;
mod object;
mod value;

pub use error::HeapError;
pub use heap::{Heap, HeapResult};
pub use object::{element_count, flat_index, Dims, HeapObject, MapStorage, ObjectKind, SetStorage};
pub use value::{Decimal, ObjRef, Str, StructValue, Value};
