//! Deep clone for typed object graphs.
//!
//! Types are described in a [`TypePool`], values live on a [`Heap`], and
//! [`copy`] produces a fully independent copy of any value: cycles and
//! shared references keep their shape, runtime types survive base-class
//! and interface slots, and no type has to opt in.
//!
//! The free functions here run on the process-wide [`Replicator`] and its
//! pool. Create heaps for it with [`new_heap`]; use a [`Replicator`] of
//! your own for an isolated pool.
//!
//! ```text
//! let pool = replica::global_pool();
//! let node = pool.class("Node")?;
//! let idx = node.idx();
//! node.field("next", idx).define()?;
//!
//! let mut heap = replica::new_heap();
//! let x = heap.new_instance(idx, &[])?;
//! heap.set_field(x, "next", Value::Ref(x))?;
//! let y = replica::copy(&mut heap, &Value::Ref(x))?;
//! ```

use std::sync::Once;

pub use replica_engine::{
    CloneCx, CloneError, CloneOptions, CloneResult, IdentityMap, Plan, Replicator,
};
pub use replica_heap::{
    Decimal, Dims, Heap, HeapError, HeapObject, HeapResult, ObjRef, ObjectKind, Str,
    StructValue, Value,
};
pub use replica_types::{
    ClassBuilder, Construction, FieldAccess, Idx, Primitive, Shape, StructBuilder, TypeDefError,
    TypeFlags, TypePool,
};

/// The pool of the process-wide replicator.
pub fn global_pool() -> &'static TypePool {
    Replicator::global().pool()
}

/// An empty heap bound to the global pool.
pub fn new_heap() -> Heap {
    Replicator::global().new_heap()
}

/// Deep-clone `value` with default options. Null clones to null.
pub fn copy(heap: &mut Heap, value: &Value) -> CloneResult<Value> {
    Replicator::global().copy(heap, value, None)
}

/// Deep-clone `value`; `None` options mean the defaults.
pub fn copy_with(
    heap: &mut Heap,
    value: &Value,
    options: Option<&CloneOptions>,
) -> CloneResult<Value> {
    Replicator::global().copy(heap, value, options)
}

/// Deep-clone `value` as reached through the static type `declared`.
pub fn copy_as(
    heap: &mut Heap,
    value: &Value,
    declared: Idx,
    options: Option<&CloneOptions>,
) -> CloneResult<Value> {
    Replicator::global().copy_as(heap, value, declared, options)
}

/// Like [`copy`], but null is an error.
pub fn deep_clone(heap: &mut Heap, value: &Value) -> CloneResult<Value> {
    deep_clone_with(heap, value, CloneOptions::none())
}

/// Like [`copy_with`], but null is an error.
pub fn deep_clone_with(
    heap: &mut Heap,
    value: &Value,
    options: &CloneOptions,
) -> CloneResult<Value> {
    if value.is_null() {
        return Err(CloneError::NullInput);
    }
    Replicator::global().copy(heap, value, Some(options))
}

/// Display names of every type the global replicator has compiled a plan
/// for, sorted. Informational only.
pub fn compiled_types() -> Vec<String> {
    Replicator::global().compiled_types()
}

/// Method-call form of [`deep_clone`] and [`deep_clone_with`].
pub trait DeepClone: Sized {
    fn deep_clone(&self, heap: &mut Heap) -> CloneResult<Self>;

    fn deep_clone_with(&self, heap: &mut Heap, options: &CloneOptions) -> CloneResult<Self>;
}

impl DeepClone for Value {
    fn deep_clone(&self, heap: &mut Heap) -> CloneResult<Self> {
        deep_clone(heap, self)
    }

    fn deep_clone_with(&self, heap: &mut Heap, options: &CloneOptions) -> CloneResult<Self> {
        deep_clone_with(heap, self, options)
    }
}

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output.
///
/// Safe to call multiple times. Does nothing unless `RUST_LOG` is set,
/// e.g. `RUST_LOG=replica_engine=debug` or `RUST_LOG=replica_engine=trace`.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}
