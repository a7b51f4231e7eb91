//! Scalar and string plans.

use replica_heap::Value;
use replica_types::Idx;

use crate::plan::{plan, Plan};

/// Simple values are copied as they are.
pub(crate) fn identity() -> Plan {
    plan(|src, _cx| Ok(src.clone()))
}

/// Strings are shared, or copied when the call asks for deep strings.
/// They never enter the identity map.
pub(crate) fn string(ty: Idx) -> Plan {
    plan(move |src, cx| match src {
        Value::Null => Ok(Value::Null),
        Value::Str(s) => Ok(Value::Str(cx.string(s))),
        other => Err(cx.shape_mismatch(ty, other)),
    })
}
