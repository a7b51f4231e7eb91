//! List, set and map plans.
//!
//! Destinations are pre-sized to the source's length and registered before
//! any element is cloned, so a collection that contains itself clones to a
//! collection that contains its clone. Sources are read by position and
//! destinations are insertion-ordered, so clones enumerate in source order.

use replica_heap::{ObjRef, Value};
use replica_types::{Idx, TypePool};

use crate::context::{CloneCx, Visit};
use crate::error::{CloneError, CloneResult};
use crate::plan::{plan, Plan, Step};

/// Enter a collection value: `Err(done)` when there is nothing to clone.
fn enter(ty: Idx, src: &Value, cx: &CloneCx<'_>) -> CloneResult<Result<ObjRef, Value>> {
    Ok(match cx.visit(ty, src)? {
        Visit::Done(value) => Err(value),
        Visit::Fresh(obj) => Ok(obj),
    })
}

fn collision(ty: Idx, cx: &CloneCx<'_>) -> CloneError {
    CloneError::KeyCollision {
        ty: cx.pool().display(ty),
    }
}

pub(crate) fn list(pool: &TypePool, ty: Idx, elem: Idx) -> Plan {
    let step = Step::for_type(pool, elem);
    plan(move |src, cx| {
        let obj = match enter(ty, src, cx)? {
            Ok(obj) => obj,
            Err(done) => return Ok(done),
        };
        let len = cx.heap.list_items(obj)?.len();
        let dst = cx.heap.alloc_list_shell(ty, len)?;
        cx.identity.register(obj, dst);

        for i in 0..len {
            let Some(value) = cx.heap.list_items(obj)?.get(i).cloned() else {
                break;
            };
            let cloned = step.apply(&value, cx)?.unwrap_or(Value::Null);
            cx.heap.append_raw(dst, cloned)?;
        }
        Ok(Value::Ref(dst))
    })
}

pub(crate) fn set(pool: &TypePool, ty: Idx, elem: Idx) -> Plan {
    let step = Step::for_type(pool, elem);
    plan(move |src, cx| {
        let obj = match enter(ty, src, cx)? {
            Ok(obj) => obj,
            Err(done) => return Ok(done),
        };
        let len = cx.heap.set_items(obj)?.len();
        let dst = cx.heap.alloc_set_shell(ty, len)?;
        cx.identity.register(obj, dst);

        for i in 0..len {
            let Some(value) = cx.heap.set_items(obj)?.get_index(i).cloned() else {
                break;
            };
            let cloned = step.apply(&value, cx)?.unwrap_or(Value::Null);
            if !cx.heap.set_insert_raw(dst, cloned)? {
                return Err(collision(ty, cx));
            }
        }
        Ok(Value::Ref(dst))
    })
}

pub(crate) fn map(pool: &TypePool, ty: Idx, key: Idx, value: Idx) -> Plan {
    let key_step = Step::for_type(pool, key);
    let value_step = Step::for_type(pool, value);
    plan(move |src, cx| {
        let obj = match enter(ty, src, cx)? {
            Ok(obj) => obj,
            Err(done) => return Ok(done),
        };
        let len = cx.heap.map_entries(obj)?.len();
        let dst = cx.heap.alloc_map_shell(ty, len)?;
        cx.identity.register(obj, dst);

        for i in 0..len {
            let Some((k, v)) = cx
                .heap
                .map_entries(obj)?
                .get_index(i)
                .map(|(k, v)| (k.clone(), v.clone()))
            else {
                break;
            };
            // Keys first: a key clone can register objects the value refers to.
            let k = key_step.apply(&k, cx)?.unwrap_or(Value::Null);
            let v = value_step.apply(&v, cx)?.unwrap_or(Value::Null);
            if !cx.heap.map_insert_raw(dst, k, v)? {
                return Err(collision(ty, cx));
            }
        }
        Ok(Value::Ref(dst))
    })
}
