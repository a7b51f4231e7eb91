//! Compiled clone plans.
//!
//! A plan is a closure bound to one type. It is built once from the pool's
//! reflective data and shared by every call and thread. Plans for types
//! with children hold one [`Step`] per field, element type or tuple
//! component, decided at build time from the child's declared type.

use std::sync::{Arc, OnceLock};

use replica_heap::Value;
use replica_types::{Idx, TypePool};

use crate::context::CloneCx;
use crate::error::CloneResult;
use crate::stack::ensure_sufficient_stack;

/// A compiled clone routine.
pub type Plan = Arc<dyn Fn(&Value, &mut CloneCx<'_>) -> CloneResult<Value> + Send + Sync>;

/// Wrap a closure as a [`Plan`].
pub(crate) fn plan<F>(f: F) -> Plan
where
    F: Fn(&Value, &mut CloneCx<'_>) -> CloneResult<Value> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// How one child slot is cloned.
pub(crate) enum Step {
    /// Simple value: copied as is.
    Copy,
    /// String: the call's string policy applies.
    Str,
    /// Anything else: cloned through the plan of the declared type.
    Nested(NestedPlan),
}

/// Plan of a child's declared type, resolved on first use.
///
/// Resolving lazily lets a type's plan refer to itself (a `Node` field on
/// `Node`) without building anything recursively.
pub(crate) struct NestedPlan {
    ty: Idx,
    plan: OnceLock<Plan>,
}

impl NestedPlan {
    fn resolve(&self, cx: &CloneCx<'_>) -> CloneResult<&Plan> {
        if let Some(plan) = self.plan.get() {
            return Ok(plan);
        }
        let plan = cx.replicator().plan(self.ty)?;
        Ok(self.plan.get_or_init(|| plan))
    }
}

impl Step {
    pub(crate) fn for_type(pool: &TypePool, ty: Idx) -> Self {
        if ty == Idx::STR {
            Step::Str
        } else if pool.flags(ty).is_simple() {
            Step::Copy
        } else {
            Step::Nested(NestedPlan {
                ty,
                plan: OnceLock::new(),
            })
        }
    }

    /// Clone one child value.
    ///
    /// `None` means the source was null and the destination slot must be
    /// left alone.
    pub(crate) fn apply(&self, value: &Value, cx: &mut CloneCx<'_>) -> CloneResult<Option<Value>> {
        match self {
            Step::Copy => Ok(Some(value.clone())),
            Step::Str => Ok(match value {
                Value::Null => None,
                Value::Str(s) => Some(Value::Str(cx.string(s))),
                other => Some(other.clone()),
            }),
            Step::Nested(nested) => {
                if value.is_null() {
                    return Ok(None);
                }
                let plan = nested.resolve(cx)?;
                ensure_sufficient_stack(|| plan(value, cx)).map(Some)
            }
        }
    }
}

/// Steps for a list of child types, in order.
pub(crate) fn steps(pool: &TypePool, types: impl IntoIterator<Item = Idx>) -> Box<[Step]> {
    types.into_iter().map(|ty| Step::for_type(pool, ty)).collect()
}
