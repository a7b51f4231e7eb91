//! Array plans.
//!
//! Both plans allocate a destination with the source's exact dimensions,
//! register it, and only then clone elements into it. An empty array
//! clones to an empty array of the same rank and lengths.

use replica_heap::{Dims, ObjRef, Value};
use replica_types::{Idx, TypePool};
use smallvec::{smallvec, SmallVec};

use crate::context::{CloneCx, Visit};
use crate::error::CloneResult;
use crate::plan::{plan, Plan, Step};

pub(crate) fn one_dimensional(pool: &TypePool, ty: Idx, elem: Idx) -> Plan {
    let step = Step::for_type(pool, elem);
    plan(move |src, cx| {
        let obj = match cx.visit(ty, src)? {
            Visit::Done(value) => return Ok(value),
            Visit::Fresh(obj) => obj,
        };
        let len = cx.heap.array_dims(obj)?.first().copied().unwrap_or(0);
        let dst = cx.heap.alloc_array_shell(ty, &[len])?;
        cx.identity.register(obj, dst);

        for i in 0..len {
            let value = cx.heap.instance_slot(obj, i)?.clone();
            if let Some(cloned) = step.apply(&value, cx)? {
                cx.heap.write_slot(dst, i, cloned)?;
            }
        }
        Ok(Value::Ref(dst))
    })
}

pub(crate) fn multi_dimensional(pool: &TypePool, ty: Idx, elem: Idx, rank: usize) -> Plan {
    let step = Step::for_type(pool, elem);
    plan(move |src, cx| {
        let obj = match cx.visit(ty, src)? {
            Visit::Done(value) => return Ok(value),
            Visit::Fresh(obj) => obj,
        };
        let dims: Dims = SmallVec::from_slice(cx.heap.array_dims(obj)?);
        debug_assert_eq!(dims.len(), rank);
        let dst = cx.heap.alloc_array_shell(ty, &dims)?;
        cx.identity.register(obj, dst);

        if dims.contains(&0) {
            return Ok(Value::Ref(dst));
        }
        copy_elements(obj, dst, &dims, &step, cx)?;
        Ok(Value::Ref(dst))
    })
}

/// Walk every multi-index, outer dimension slowest, writing each clone to
/// the matching row-major slot of `dst`.
fn copy_elements(
    src: ObjRef,
    dst: ObjRef,
    dims: &[usize],
    step: &Step,
    cx: &mut CloneCx<'_>,
) -> CloneResult<()> {
    let mut index: SmallVec<[usize; 4]> = smallvec![0; dims.len()];
    let mut flat = 0;
    loop {
        let value = cx.heap.array_get(src, &index)?.clone();
        if let Some(cloned) = step.apply(&value, cx)? {
            cx.heap.write_slot(dst, flat, cloned)?;
        }
        flat += 1;

        // Odometer: bump the innermost index, carrying outwards.
        let mut axis = dims.len();
        loop {
            if axis == 0 {
                return Ok(());
            }
            axis -= 1;
            index[axis] += 1;
            if index[axis] < dims[axis] {
                break;
            }
            index[axis] = 0;
        }
    }
}
