//! Heap objects.

use indexmap::{IndexMap, IndexSet};
use replica_types::Idx;
use rustc_hash::FxBuildHasher;
use smallvec::SmallVec;

use crate::value::Value;

/// Ordered set storage; iteration follows insertion order.
pub type SetStorage = IndexSet<Value, FxBuildHasher>;

/// Ordered map storage; iteration follows insertion order.
pub type MapStorage = IndexMap<Value, Value, FxBuildHasher>;

/// Per-dimension lengths of an array.
pub type Dims = SmallVec<[usize; 4]>;

/// Payload of a heap object.
#[derive(Clone, Debug)]
pub enum ObjectKind {
    /// Class instance in layout order. Plain top-type objects have no slots.
    Instance(Vec<Value>),
    /// Array of any rank, stored row-major (last dimension fastest).
    Array { dims: Dims, items: Vec<Value> },
    List(Vec<Value>),
    Set(SetStorage),
    Map(MapStorage),
    Tuple(Vec<Value>),
}

impl ObjectKind {
    pub fn name(&self) -> &'static str {
        match self {
            ObjectKind::Instance(_) => "instance",
            ObjectKind::Array { .. } => "array",
            ObjectKind::List(_) => "list",
            ObjectKind::Set(_) => "set",
            ObjectKind::Map(_) => "map",
            ObjectKind::Tuple(_) => "tuple",
        }
    }
}

/// An object with reference identity.
#[derive(Clone, Debug)]
pub struct HeapObject {
    ty: Idx,
    kind: ObjectKind,
}

impl HeapObject {
    pub(crate) fn new(ty: Idx, kind: ObjectKind) -> Self {
        Self { ty, kind }
    }

    /// Exact runtime type.
    #[inline]
    pub fn ty(&self) -> Idx {
        self.ty
    }

    #[inline]
    pub fn kind(&self) -> &ObjectKind {
        &self.kind
    }

    #[inline]
    pub(crate) fn kind_mut(&mut self) -> &mut ObjectKind {
        &mut self.kind
    }

    /// Number of directly contained values (slots, elements or entries).
    pub fn len(&self) -> usize {
        match &self.kind {
            ObjectKind::Instance(v) | ObjectKind::List(v) | ObjectKind::Tuple(v) => v.len(),
            ObjectKind::Array { items, .. } => items.len(),
            ObjectKind::Set(s) => s.len(),
            ObjectKind::Map(m) => m.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Row-major flat index of `index` within `dims`.
///
/// `None` if the rank differs or any coordinate is out of range.
pub fn flat_index(dims: &[usize], index: &[usize]) -> Option<usize> {
    if dims.len() != index.len() {
        return None;
    }
    let mut flat = 0usize;
    for (&len, &i) in dims.iter().zip(index) {
        if i >= len {
            return None;
        }
        flat = flat * len + i;
    }
    Some(flat)
}

/// Total element count of an array with the given dimensions.
pub fn element_count(dims: &[usize]) -> Option<usize> {
    dims.iter().try_fold(1usize, |acc, &d| acc.checked_mul(d))
}
