//! Tuple plan.
//!
//! Components are cloned and written back strictly by position: two
//! components of the same type must never trade places.

use replica_heap::Value;
use replica_types::{Idx, TypePool};

use crate::context::Visit;
use crate::plan::{plan, steps, Plan};

pub(crate) fn tuple(pool: &TypePool, ty: Idx, elems: &[Idx]) -> Plan {
    let steps = steps(pool, elems.iter().copied());
    plan(move |src, cx| {
        let obj = match cx.visit(ty, src)? {
            Visit::Done(value) => return Ok(value),
            Visit::Fresh(obj) => obj,
        };
        let dst = cx.heap.alloc_tuple_shell(ty)?;
        cx.identity.register(obj, dst);

        for (pos, step) in steps.iter().enumerate() {
            let value = cx.heap.instance_slot(obj, pos)?.clone();
            if let Some(cloned) = step.apply(&value, cx)? {
                cx.heap.write_slot(dst, pos, cloned)?;
            }
        }
        Ok(Value::Ref(dst))
    })
}
