//! Clone errors.
//!
//! Every failure is fatal for the call that hit it: the error propagates to
//! the caller of `copy` and no partial graph is returned.

use replica_heap::HeapError;
use replica_types::TypeDefError;
use thiserror::Error;

pub type CloneResult<T> = Result<T, CloneError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CloneError {
    /// A non-null value was required.
    #[error("value to clone must not be null")]
    NullInput,

    /// No way to obtain a destination instance of the type.
    #[error("`{ty}` has neither a parameterless constructor nor a member-wise copy")]
    UnsupportedType { ty: String },

    /// A runtime type does not fit where it was found.
    #[error("cannot redirect from `{declared}` to runtime type `{actual}`")]
    RedirectResolution { declared: String, actual: String },

    /// A plan received a value of the wrong shape.
    #[error("plan for `{ty}` received a {found}")]
    ShapeMismatch { ty: String, found: &'static str },

    /// Two distinct source keys cloned to keys the destination treats as equal.
    #[error("cloned keys of `{ty}` collide")]
    KeyCollision { ty: String },

    /// The heap is bound to a different type pool than the replicator.
    #[error("heap belongs to a different type pool")]
    ForeignHeap,

    #[error(transparent)]
    Type(#[from] TypeDefError),

    #[error(transparent)]
    Heap(#[from] HeapError),
}
