//! Class, struct and nullable plans.
//!
//! # Classes
//!
//! 1. Null and already-visited sources return immediately.
//! 2. An open class whose source has a more derived runtime type hands
//!    over to that type's redirect entry.
//! 3. A source that is one of the class's own read-only static instances
//!    is returned as is, unless the call deep-clones singletons.
//! 4. The destination shell comes from the parameterless constructor, or
//!    from a member-wise copy of the source when there is none.
//! 5. The shell is registered, then every slot of the flattened layout is
//!    cloned and assigned directly, read-only and init-only slots included.
//!
//! Structs have no identity: the shell is the zero value of the struct,
//! filled slot by slot, and nothing is registered.

use replica_heap::Value;
use replica_types::{ClassDef, Construction, Idx, StructDef, TypeFlags, TypePool};

use crate::cloners::redirect;
use crate::context::Visit;
use crate::error::{CloneError, CloneResult};
use crate::plan::{plan, steps, Plan, Step};

pub(crate) fn class(pool: &TypePool, ty: Idx, def: &ClassDef, flags: TypeFlags) -> CloneResult<Plan> {
    let construction = def.construction;
    if construction == Construction::Opaque {
        return Err(CloneError::UnsupportedType {
            ty: pool.display(ty),
        });
    }
    let open = flags.is_open();
    let singletons = def.singleton_slots(ty);
    let steps = steps(pool, def.layout.iter().map(|slot| slot.ty));

    Ok(plan(move |src, cx| {
        let obj = match cx.visit(ty, src)? {
            Visit::Done(value) => return Ok(value),
            Visit::Fresh(obj) => obj,
        };

        if open {
            let actual = cx.heap.type_of(obj)?;
            if actual != ty {
                return redirect::dispatch(ty, actual, src, cx);
            }
        }

        if !cx.options().clones_singletons()
            && singletons
                .iter()
                .any(|&slot| cx.heap.static_slot(ty, slot) == Some(src))
        {
            return Ok(src.clone());
        }

        let dst = match construction {
            Construction::Parameterless => cx.heap.alloc_instance_shell(ty)?,
            Construction::MemberwiseOnly | Construction::Opaque => cx.heap.shallow_copy(obj)?,
        };
        cx.identity.register(obj, dst);

        for (slot, step) in steps.iter().enumerate() {
            let value = cx.heap.instance_slot(obj, slot)?.clone();
            if let Some(cloned) = step.apply(&value, cx)? {
                cx.heap.write_slot(dst, slot, cloned)?;
            }
        }
        Ok(Value::Ref(dst))
    }))
}

/// Plan for a struct with at least one non-simple field.
pub(crate) fn structure(pool: &TypePool, ty: Idx, def: &StructDef) -> Plan {
    let steps = steps(pool, def.layout.iter().map(|slot| slot.ty));
    plan(move |src, cx| {
        let Value::Struct(source) = src else {
            return Err(cx.shape_mismatch(ty, src));
        };
        let Value::Struct(mut out) = cx.heap().default_value(ty) else {
            return Err(cx.shape_mismatch(ty, src));
        };

        for (slot, step) in steps.iter().enumerate() {
            let Some(value) = source.slot(slot) else {
                break;
            };
            if let Some(cloned) = step.apply(value, cx)? {
                out.write_slot(slot, cloned);
            }
        }
        Ok(Value::Struct(out))
    })
}

/// Plan for `T?` where `T` is not simple.
pub(crate) fn nullable(pool: &TypePool, inner: Idx) -> Plan {
    let step = Step::for_type(pool, inner);
    plan(move |src, cx| Ok(step.apply(src, cx)?.unwrap_or(Value::Null)))
}
