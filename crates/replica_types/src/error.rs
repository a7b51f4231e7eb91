//! Type definition errors.

use thiserror::Error;

use crate::data::DeclaredKind;
use crate::Idx;

/// Error raised while declaring or defining a type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeDefError {
    #[error("type `{name}` is already defined")]
    DuplicateName { name: String },

    #[error("unknown type index {idx:?}")]
    UnknownType { idx: Idx },

    #[error("`{name}` was declared as {expected}, not defined as {found}")]
    KindMismatch {
        name: String,
        expected: DeclaredKind,
        found: DeclaredKind,
    },

    #[error("`{name}` is already defined and cannot be redefined")]
    AlreadyDefined { name: String },

    #[error("`{name}` cannot derive from `{base}`: not a class")]
    BaseNotClass { name: String, base: String },

    #[error("`{name}` cannot derive from sealed class `{base}`")]
    SealedBase { name: String, base: String },

    #[error("`{name}` refers to `{dependency}`, which is declared but not yet defined")]
    UndefinedDependency { name: String, dependency: String },

    #[error("`{name}` cannot implement `{iface}`: not an interface")]
    NotAnInterface { name: String, iface: String },

    #[error("`{name}` cannot be both abstract and sealed")]
    AbstractSealed { name: String },

    #[error("`{name}` declares field `{field}` twice")]
    DuplicateField { name: String, field: String },

    #[error("value type `{name}` contains itself through field `{field}`")]
    RecursiveValueType { name: String, field: String },

    #[error("nullable requires a value type, got `{inner}`")]
    NullableOfReference { inner: String },

    #[error("tuple arity must be between 1 and 8, got {arity}")]
    TupleArity { arity: usize },

    #[error("array rank must be between 1 and {max}, got {rank}")]
    ArrayRank { rank: usize, max: u8 },

    #[error("enum `{name}` needs an integral underlying type")]
    EnumUnderlying { name: String },
}
