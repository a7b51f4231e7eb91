//! State of one copy call.

use replica_heap::{Heap, ObjRef, Str, Value};
use replica_types::{Idx, TypePool};

use crate::engine::Replicator;
use crate::error::CloneError;
use crate::identity::IdentityMap;
use crate::options::CloneOptions;

/// Everything a plan needs while cloning: the heap, the call's options and
/// identity map, and the replicator for resolving further plans.
///
/// One `CloneCx` exists per top-level copy and is never shared.
pub struct CloneCx<'a> {
    replicator: &'a Replicator,
    pub(crate) heap: &'a mut Heap,
    options: &'a CloneOptions,
    pub(crate) identity: IdentityMap,
}

/// Outcome of entering a reference-typed source value.
pub(crate) enum Visit {
    /// Nothing to clone: null, or already cloned in this call.
    Done(Value),
    /// First visit of this object.
    Fresh(ObjRef),
}

impl<'a> CloneCx<'a> {
    pub(crate) fn new(
        replicator: &'a Replicator,
        heap: &'a mut Heap,
        options: &'a CloneOptions,
    ) -> Self {
        Self {
            replicator,
            heap,
            options,
            identity: IdentityMap::seeded(options.unclonable_objects()),
        }
    }

    #[inline]
    pub fn replicator(&self) -> &'a Replicator {
        self.replicator
    }

    #[inline]
    pub fn pool(&self) -> &'a TypePool {
        self.replicator.pool()
    }

    #[inline]
    pub fn heap(&self) -> &Heap {
        &*self.heap
    }

    #[inline]
    pub fn options(&self) -> &'a CloneOptions {
        self.options
    }

    /// Apply the string policy.
    pub(crate) fn string(&self, s: &Str) -> Str {
        if self.options.clones_strings() {
            s.deep_copy()
        } else {
            s.clone()
        }
    }

    /// Null and identity checks shared by every reference-type plan.
    pub(crate) fn visit(&self, ty: Idx, src: &Value) -> Result<Visit, CloneError> {
        match src {
            Value::Null => Ok(Visit::Done(Value::Null)),
            Value::Ref(obj) => Ok(match self.identity.try_get(*obj) {
                Some(dst) => Visit::Done(Value::Ref(dst)),
                None => Visit::Fresh(*obj),
            }),
            other => Err(self.shape_mismatch(ty, other)),
        }
    }

    pub(crate) fn shape_mismatch(&self, ty: Idx, found: &Value) -> CloneError {
        CloneError::ShapeMismatch {
            ty: self.pool().display(ty),
            found: found.kind_name(),
        }
    }
}
