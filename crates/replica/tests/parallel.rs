//! Concurrent use of the global plan cache.
//!
//! Types are defined once up front. Many threads then copy graphs on heaps
//! of their own, racing to compile the same plans.

#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]

use pretty_assertions::assert_eq;
use rayon::prelude::*;
use replica::{copy, copy_as, global_pool, new_heap, Idx, Value};

#[test]
fn concurrent_copies_share_plans() {
    let pool = global_pool();
    let shape = pool.interface("ParShape").unwrap();
    let builder = pool.class("ParTree").unwrap();
    let tree = builder.idx();
    let children = pool.list(tree).unwrap();
    builder
        .implements(shape)
        .field("children", children)
        .field("parent", tree)
        .field("depth", Idx::U16)
        .define()
        .unwrap();
    let table = pool.map(Idx::STR, shape).unwrap();

    let results: Vec<(usize, bool)> = (0..256_usize)
        .into_par_iter()
        .map(|i| {
            let mut heap = new_heap();
            let root = heap.new_instance(tree, &[]).unwrap();
            let kids: Vec<Value> = (0..i % 7)
                .map(|d| {
                    let depth = Value::U16(u16::try_from(d).unwrap());
                    let kid = heap
                        .new_instance(tree, &[("parent", Value::Ref(root)), ("depth", depth)])
                        .unwrap();
                    Value::Ref(kid)
                })
                .collect();
            let count = kids.len();
            let list = heap.new_list(children, kids).unwrap();
            heap.set_field(root, "children", Value::Ref(list)).unwrap();
            let map = heap
                .new_map(table, vec![(Value::string("root"), Value::Ref(root))])
                .unwrap();

            let cloned = if i % 2 == 0 {
                copy(&mut heap, &Value::Ref(map)).unwrap()
            } else {
                copy_as(&mut heap, &Value::Ref(root), shape, None).unwrap()
            };
            let source = if i % 2 == 0 { map } else { root };
            (count, heap.graph_eq(&Value::Ref(source), &cloned))
        })
        .collect();

    for (i, (count, equal)) in results.into_iter().enumerate() {
        assert_eq!(count, i % 7);
        assert!(equal, "copy {i} differs from its source");
    }

    let compiled = replica::compiled_types();
    for name in ["ParTree", "List<ParTree>", "Dictionary<string,ParShape>", "ParShape"] {
        assert!(compiled.contains(&name.to_owned()), "{name} not compiled");
    }
}
