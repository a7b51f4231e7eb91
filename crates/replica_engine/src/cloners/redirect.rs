//! Redirects from a declared type to a value's runtime type.
//!
//! Abstract classes, interfaces and the top type have no layout of their
//! own, so their plan always redirects. Open classes redirect when the
//! runtime type is more derived. Redirect entries are cached per runtime
//! type, next to primary plans.

use replica_heap::Value;
use replica_types::{Idx, Shape};

use crate::cloners::scalar;
use crate::context::CloneCx;
use crate::engine::Replicator;
use crate::error::{CloneError, CloneResult};
use crate::plan::{plan, Plan};

/// Primary plan of an abstract class, interface or the top type.
pub(crate) fn always(ty: Idx) -> Plan {
    plan(move |src, cx| match src {
        Value::Null => Ok(Value::Null),
        Value::Ref(obj) => {
            if let Some(dst) = cx.identity.try_get(*obj) {
                return Ok(Value::Ref(dst));
            }
            let actual = cx.heap.type_of(*obj)?;
            if actual == Idx::ANY && ty == Idx::ANY {
                // A plain top-type object has no fields to clone.
                let dst = cx.heap.new_object()?;
                cx.identity.register(*obj, dst);
                return Ok(Value::Ref(dst));
            }
            dispatch(ty, actual, src, cx)
        }
        // Boxed value types and strings reached through the top type.
        inline => match inline.inline_type() {
            Some(actual) => dispatch(ty, actual, src, cx),
            None => Err(cx.shape_mismatch(ty, inline)),
        },
    })
}

/// Clone `src`, reached as `declared`, with the redirect entry of `actual`.
pub(crate) fn dispatch(
    declared: Idx,
    actual: Idx,
    src: &Value,
    cx: &mut CloneCx<'_>,
) -> CloneResult<Value> {
    let pool = cx.pool();
    if actual == declared || !pool.is_assignable(actual, declared) {
        return Err(resolution_error(cx, declared, actual));
    }
    tracing::trace!(
        declared = %pool.display(declared),
        actual = %pool.display(actual),
        "redirect"
    );
    let redirect = cx.replicator().redirect(actual)?;
    redirect(src, cx)
}

fn resolution_error(cx: &CloneCx<'_>, declared: Idx, actual: Idx) -> CloneError {
    let pool = cx.pool();
    CloneError::RedirectResolution {
        declared: pool.display(declared),
        actual: pool.display(actual),
    }
}

/// Build the redirect entry for a runtime type.
pub(crate) fn compile_redirect(replicator: &Replicator, actual: Idx) -> CloneResult<Plan> {
    let pool = replicator.pool();
    let entry = pool.entry(actual)?;

    let redirect = if actual == Idx::STR {
        scalar::string(actual)
    } else if entry.flags.is_simple() {
        scalar::identity()
    } else if entry.shape == Shape::AbstractOrInterface {
        // No value can have an abstract runtime type.
        return Err(CloneError::RedirectResolution {
            declared: pool.display(actual),
            actual: pool.display(actual),
        });
    } else if entry.flags.is_value_type() {
        // Boxed struct: cloned by value through its own plan.
        replicator.plan(actual)?
    } else {
        let primary = replicator.plan(actual)?;
        plan(move |src, cx| {
            if let Some(dst) = src.as_obj().and_then(|obj| cx.identity.try_get(obj)) {
                return Ok(Value::Ref(dst));
            }
            primary(src, cx)
        })
    };

    tracing::debug!(actual = %pool.display(actual), shape = ?entry.shape, "compiled redirect");
    Ok(redirect)
}
