//! Heap construction and access errors.

use replica_types::TypeDefError;
use thiserror::Error;

use crate::value::ObjRef;

/// Error raised by heap construction or access.
///
/// Type names are rendered with the pool's display names.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HeapError {
    #[error(transparent)]
    Type(#[from] TypeDefError),

    #[error("`{ty}` has no field `{field}`")]
    UnknownField { ty: String, field: String },

    #[error("`{ty}` has no static `{name}`")]
    UnknownStatic { ty: String, name: String },

    #[error("field `{ty}.{field}` is read-only after construction")]
    ReadOnlyField { ty: String, field: String },

    #[error("expected a value of type `{expected}`, found `{found}`")]
    TypeMismatch { expected: String, found: String },

    #[error("null cannot be stored in value type `{ty}`")]
    NullIntoValueType { ty: String },

    #[error("`{ty}` cannot be instantiated")]
    NotInstantiable { ty: String },

    #[error("`{ty}` is not {expected}")]
    WrongTypeKind { ty: String, expected: &'static str },

    #[error("expected {expected}, found {found}")]
    WrongObjectKind {
        expected: &'static str,
        found: &'static str,
    },

    #[error("index {index} is out of bounds for length {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("rank mismatch: expected {expected} indices, found {found}")]
    RankMismatch { expected: usize, found: usize },

    #[error("expected {expected} values, found {found}")]
    LengthMismatch { expected: usize, found: usize },

    #[error("duplicate key in `{ty}`")]
    DuplicateKey { ty: String },

    #[error("dangling reference {obj:?}")]
    DanglingRef { obj: ObjRef },

    #[error("static `{ty}.{name}` is read-only and already initialised")]
    StaticAlreadyInitialised { ty: String, name: String },

    #[error("heap is full")]
    HeapFull,
}
