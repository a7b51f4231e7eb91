//! Structural comparison of object graphs.
//!
//! Two graphs are equivalent when there is a bijection between the objects
//! reachable from each side that preserves types, scalar contents and edges.
//! The bijection is built while walking both graphs in lock step, so cycles
//! and shared sub-graphs must line up exactly: a graph where two fields
//! share one object is not equivalent to one where they point at two equal
//! objects.

use rustc_hash::FxHashMap;

use crate::heap::Heap;
use crate::object::ObjectKind;
use crate::value::{ObjRef, Value};

impl Heap {
    /// Check if two values are structurally equivalent graphs.
    pub fn graph_eq(&self, a: &Value, b: &Value) -> bool {
        let mut walk = GraphEq {
            heap: self,
            forward: FxHashMap::default(),
            backward: FxHashMap::default(),
            pending: Vec::new(),
        };
        walk.run(a, b)
    }
}

struct GraphEq<'h> {
    heap: &'h Heap,
    forward: FxHashMap<ObjRef, ObjRef>,
    backward: FxHashMap<ObjRef, ObjRef>,
    /// Matched object pairs whose contents are not compared yet.
    pending: Vec<(ObjRef, ObjRef)>,
}

impl GraphEq<'_> {
    fn run(&mut self, a: &Value, b: &Value) -> bool {
        if !self.values(a, b) {
            return false;
        }
        while let Some((x, y)) = self.pending.pop() {
            if !self.objects(x, y) {
                return false;
            }
        }
        true
    }

    fn values(&mut self, a: &Value, b: &Value) -> bool {
        match (a, b) {
            (Value::Ref(x), Value::Ref(y)) => self.pair(*x, *y),
            (Value::Struct(x), Value::Struct(y)) => {
                x.ty() == y.ty() && self.seq(x.fields().iter(), y.fields().iter())
            }
            _ => a == b,
        }
    }

    fn pair(&mut self, x: ObjRef, y: ObjRef) -> bool {
        match (self.forward.get(&x), self.backward.get(&y)) {
            (Some(&fy), Some(&bx)) => fy == y && bx == x,
            (None, None) => {
                self.forward.insert(x, y);
                self.backward.insert(y, x);
                self.pending.push((x, y));
                true
            }
            _ => false,
        }
    }

    fn seq<'v>(
        &mut self,
        a: impl ExactSizeIterator<Item = &'v Value>,
        b: impl ExactSizeIterator<Item = &'v Value>,
    ) -> bool {
        a.len() == b.len() && a.zip(b).all(|(x, y)| self.values(x, y))
    }

    fn objects(&mut self, x: ObjRef, y: ObjRef) -> bool {
        let heap = self.heap;
        let (Ok(ox), Ok(oy)) = (heap.get(x), heap.get(y)) else {
            return false;
        };
        if ox.ty() != oy.ty() {
            return false;
        }
        match (ox.kind(), oy.kind()) {
            (ObjectKind::Instance(a), ObjectKind::Instance(b))
            | (ObjectKind::List(a), ObjectKind::List(b))
            | (ObjectKind::Tuple(a), ObjectKind::Tuple(b)) => self.seq(a.iter(), b.iter()),
            (
                ObjectKind::Array {
                    dims: da,
                    items: ia,
                },
                ObjectKind::Array {
                    dims: db,
                    items: ib,
                },
            ) => da == db && self.seq(ia.iter(), ib.iter()),
            (ObjectKind::Set(a), ObjectKind::Set(b)) => self.seq(a.iter(), b.iter()),
            (ObjectKind::Map(a), ObjectKind::Map(b)) => {
                a.len() == b.len()
                    && a
                        .iter()
                        .zip(b.iter())
                        .all(|((ka, va), (kb, vb))| self.values(ka, kb) && self.values(va, vb))
            }
            _ => false,
        }
    }
}
