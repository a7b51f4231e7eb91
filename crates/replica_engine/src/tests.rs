use std::sync::Arc;

use pretty_assertions::assert_eq;
use rayon::prelude::*;
use replica_heap::{Heap, ObjRef, Value};
use replica_types::{Construction, Idx, TypePool};

use super::*;

fn replicator() -> Replicator {
    Replicator::new(Arc::new(TypePool::new()))
}

fn obj(value: &Value) -> ObjRef {
    value.as_obj().unwrap()
}

/// `Node { next: Node, label: string }`
fn node_type(pool: &TypePool) -> Idx {
    let builder = pool.class("Node").unwrap();
    let node = builder.idx();
    builder
        .field("next", node)
        .field("label", Idx::STR)
        .define()
        .unwrap()
}

#[test]
fn scalars_copy_through() {
    let r = replicator();
    let mut heap = r.new_heap();
    for value in [Value::I32(7), Value::Bool(true), Value::F64(1.5), Value::Null] {
        assert_eq!(r.copy(&mut heap, &value, None).unwrap(), value);
    }
    assert!(heap.is_empty());
}

#[test]
fn string_policy() {
    let r = replicator();
    let mut heap = r.new_heap();
    let s = Value::string("abc");

    let shared = r.copy(&mut heap, &s, None).unwrap();
    assert_eq!(shared, s);
    assert!(Heap::same_ref(&shared, &s));

    let options = CloneOptions::new().deep_clone_strings(true);
    let deep = r.copy(&mut heap, &s, Some(&options)).unwrap();
    assert_eq!(deep, s);
    assert!(!Heap::same_ref(&deep, &s));
}

#[test]
fn self_cycle_points_at_clone() {
    let r = replicator();
    let node = node_type(r.pool());
    let mut heap = r.new_heap();
    let x = heap.new_instance(node, &[("label", Value::string("x"))]).unwrap();
    heap.set_field(x, "next", Value::Ref(x)).unwrap();

    let y = obj(&r.copy(&mut heap, &Value::Ref(x), None).unwrap());
    assert_ne!(x, y);
    assert_eq!(heap.field(y, "next").unwrap(), &Value::Ref(y));
    assert!(heap.graph_eq(&Value::Ref(x), &Value::Ref(y)));
}

#[test]
fn shared_children_stay_shared() {
    let r = replicator();
    let pool = r.pool();
    let node = node_type(pool);
    let pair = pool
        .class("Pair")
        .unwrap()
        .field("left", node)
        .field("right", node)
        .define()
        .unwrap();
    let mut heap = r.new_heap();
    let shared = heap.new_instance(node, &[]).unwrap();
    let p = heap
        .new_instance(
            pair,
            &[("left", Value::Ref(shared)), ("right", Value::Ref(shared))],
        )
        .unwrap();

    let q = obj(&r.copy(&mut heap, &Value::Ref(p), None).unwrap());
    let left = heap.field(q, "left").unwrap().clone();
    let right = heap.field(q, "right").unwrap().clone();
    assert!(Heap::same_ref(&left, &right));
    assert_ne!(obj(&left), shared);
}

#[test]
fn two_dimensional_array() {
    let r = replicator();
    let grid = r.pool().array(Idx::I32, 2).unwrap();
    let mut heap = r.new_heap();
    let items = (0..8).map(Value::I32).collect();
    let src = heap.new_array(grid, &[4, 2], items).unwrap();

    let dst = obj(&r.copy(&mut heap, &Value::Ref(src), None).unwrap());
    assert_ne!(src, dst);
    assert_eq!(heap.array_dims(dst).unwrap(), &[4, 2]);
    for i in 0..4 {
        for j in 0..2 {
            assert_eq!(
                heap.array_get(dst, &[i, j]).unwrap(),
                heap.array_get(src, &[i, j]).unwrap()
            );
        }
    }
}

#[test]
fn empty_arrays_keep_their_shape() {
    let r = replicator();
    let cube = r.pool().array(Idx::STR, 3).unwrap();
    let mut heap = r.new_heap();
    let src = heap.new_array(cube, &[2, 0, 5], Vec::new()).unwrap();

    let dst = r.copy(&mut heap, &Value::Ref(src), None).unwrap();
    assert!(!dst.is_null());
    assert_eq!(heap.array_dims(obj(&dst)).unwrap(), &[2, 0, 5]);
}

#[test]
fn array_of_objects_clones_elements() {
    let r = replicator();
    let node = node_type(r.pool());
    let nodes = r.pool().array(node, 1).unwrap();
    let mut heap = r.new_heap();
    let a = heap.new_instance(node, &[]).unwrap();
    let src = heap
        .new_array(nodes, &[3], vec![Value::Ref(a), Value::Null, Value::Ref(a)])
        .unwrap();

    let dst = obj(&r.copy(&mut heap, &Value::Ref(src), None).unwrap());
    let first = heap.array_get(dst, &[0]).unwrap().clone();
    assert_ne!(obj(&first), a);
    assert_eq!(heap.array_get(dst, &[1]).unwrap(), &Value::Null);
    assert_eq!(heap.array_get(dst, &[2]).unwrap(), &first);
}

#[test]
fn list_keeps_order_and_nulls() {
    let r = replicator();
    let node = node_type(r.pool());
    let list = r.pool().list(node).unwrap();
    let mut heap = r.new_heap();
    let a = heap.new_instance(node, &[("label", Value::string("a"))]).unwrap();
    let b = heap.new_instance(node, &[("label", Value::string("b"))]).unwrap();
    let src = heap
        .new_list(list, vec![Value::Ref(a), Value::Null, Value::Ref(b)])
        .unwrap();

    let dst = obj(&r.copy(&mut heap, &Value::Ref(src), None).unwrap());
    let items = heap.list_items(dst).unwrap().to_vec();
    assert_eq!(items.len(), 3);
    assert_eq!(items[1], Value::Null);
    assert_eq!(
        heap.field(obj(&items[2]), "label").unwrap(),
        &Value::string("b")
    );
    assert!(heap.graph_eq(&Value::Ref(src), &Value::Ref(dst)));
}

#[test]
fn self_containing_list() {
    let r = replicator();
    let list = r.pool().list(Idx::ANY).unwrap();
    let mut heap = r.new_heap();
    let src = heap.new_list(list, Vec::new()).unwrap();
    heap.list_push(src, Value::Ref(src)).unwrap();

    let dst = obj(&r.copy(&mut heap, &Value::Ref(src), None).unwrap());
    assert_eq!(heap.list_items(dst).unwrap(), &[Value::Ref(dst)]);
}

#[test]
fn set_and_map_enumerate_in_source_order() {
    let r = replicator();
    let pool = r.pool();
    let set = pool.set(Idx::STR).unwrap();
    let map = pool.map(Idx::I32, Idx::STR).unwrap();
    let mut heap = r.new_heap();
    let words: Vec<Value> = ["pear", "fig", "apple"].map(Value::string).to_vec();
    let s = heap.new_set(set, words.clone()).unwrap();
    let m = heap
        .new_map(
            map,
            vec![
                (Value::I32(3), Value::string("c")),
                (Value::I32(1), Value::string("a")),
            ],
        )
        .unwrap();

    let s2 = obj(&r.copy(&mut heap, &Value::Ref(s), None).unwrap());
    let cloned: Vec<Value> = heap.set_items(s2).unwrap().iter().cloned().collect();
    assert_eq!(cloned, words);

    let m2 = obj(&r.copy(&mut heap, &Value::Ref(m), None).unwrap());
    let keys: Vec<Value> = heap.map_entries(m2).unwrap().keys().cloned().collect();
    assert_eq!(keys, vec![Value::I32(3), Value::I32(1)]);
    assert_eq!(
        heap.map_get(m2, &Value::I32(1)).unwrap(),
        Some(&Value::string("a"))
    );
}

#[test]
fn tuple_components_stay_in_place() {
    let r = replicator();
    let node = node_type(r.pool());
    let tuple = r.pool().tuple(&[node, node, Idx::STR]).unwrap();
    let mut heap = r.new_heap();
    let a = heap.new_instance(node, &[("label", Value::string("a"))]).unwrap();
    let b = heap.new_instance(node, &[("label", Value::string("b"))]).unwrap();
    let src = heap
        .new_tuple(
            tuple,
            vec![Value::Ref(a), Value::Ref(b), Value::string("c")],
        )
        .unwrap();

    let dst = obj(&r.copy(&mut heap, &Value::Ref(src), None).unwrap());
    let items = heap.tuple_items(dst).unwrap().to_vec();
    assert_eq!(
        heap.field(obj(&items[0]), "label").unwrap(),
        &Value::string("a")
    );
    assert_eq!(
        heap.field(obj(&items[1]), "label").unwrap(),
        &Value::string("b")
    );
    assert_eq!(items[2], Value::string("c"));
}

#[test]
fn derived_instance_through_base_field() {
    let r = replicator();
    let pool = r.pool();
    let animal = pool.class("Animal").unwrap().field("name", Idx::STR).define().unwrap();
    let dog = pool
        .class("Dog")
        .unwrap()
        .base(animal)
        .field("good", Idx::BOOL)
        .define()
        .unwrap();
    let owner = pool.class("Owner").unwrap().field("pet", animal).define().unwrap();
    let mut heap = r.new_heap();
    let rex = heap
        .new_instance(dog, &[("name", Value::string("Rex")), ("good", Value::Bool(true))])
        .unwrap();
    let o = heap.new_instance(owner, &[("pet", Value::Ref(rex))]).unwrap();

    let o2 = obj(&r.copy(&mut heap, &Value::Ref(o), None).unwrap());
    let pet = obj(heap.field(o2, "pet").unwrap());
    assert_ne!(pet, rex);
    assert_eq!(heap.type_of(pet).unwrap(), dog);
    assert_eq!(heap.field(pet, "name").unwrap(), &Value::string("Rex"));
    assert_eq!(heap.field(pet, "good").unwrap(), &Value::Bool(true));
}

#[test]
fn interface_and_top_type_redirect() {
    let r = replicator();
    let pool = r.pool();
    let shape = pool.interface("IShape").unwrap();
    let circle = pool
        .class("Circle")
        .unwrap()
        .implements(shape)
        .field("radius", Idx::F64)
        .define()
        .unwrap();
    let mut heap = r.new_heap();
    let c = heap.new_instance(circle, &[("radius", Value::F64(2.0))]).unwrap();

    for declared in [shape, Idx::ANY] {
        let copy = obj(&r.copy_as(&mut heap, &Value::Ref(c), declared, None).unwrap());
        assert_ne!(copy, c);
        assert_eq!(heap.type_of(copy).unwrap(), circle);
        assert_eq!(heap.field(copy, "radius").unwrap(), &Value::F64(2.0));
    }
}

#[test]
fn unrelated_declared_type_is_rejected() {
    let r = replicator();
    let node = node_type(r.pool());
    let other = r.pool().class("Other").unwrap().define().unwrap();
    let mut heap = r.new_heap();
    let n = heap.new_instance(node, &[]).unwrap();
    assert!(matches!(
        r.copy_as(&mut heap, &Value::Ref(n), other, None),
        Err(CloneError::RedirectResolution { .. })
    ));
}

#[test]
fn boxed_values_through_top_type() {
    let r = replicator();
    let pool = r.pool();
    let node = node_type(pool);
    let holder = pool
        .structure("Holder")
        .unwrap()
        .field("node", node)
        .field("n", Idx::I32)
        .define()
        .unwrap();
    let mut heap = r.new_heap();

    let boxed = r.copy_as(&mut heap, &Value::I64(9), Idx::ANY, None).unwrap();
    assert_eq!(boxed, Value::I64(9));

    let n = heap.new_instance(node, &[]).unwrap();
    let value = heap
        .new_struct(holder, &[("node", Value::Ref(n)), ("n", Value::I32(4))])
        .unwrap();
    let copy = r.copy_as(&mut heap, &value, Idx::ANY, None).unwrap();
    let inner = heap.struct_field(&copy, "node").unwrap().clone();
    assert_ne!(obj(&inner), n);
    assert_eq!(heap.struct_field(&copy, "n").unwrap(), &Value::I32(4));
}

#[test]
fn plain_top_type_object() {
    let r = replicator();
    let mut heap = r.new_heap();
    let o = heap.new_object().unwrap();
    let copy = obj(&r.copy(&mut heap, &Value::Ref(o), None).unwrap());
    assert_ne!(copy, o);
    assert_eq!(heap.type_of(copy).unwrap(), Idx::ANY);
}

#[test]
fn nullable_struct_fields() {
    let r = replicator();
    let pool = r.pool();
    let node = node_type(pool);
    let wrapper = pool.structure("Wrapper").unwrap().field("node", node).define().unwrap();
    let maybe = pool.nullable(wrapper).unwrap();
    let host = pool
        .class("Host")
        .unwrap()
        .field("a", maybe)
        .field("b", maybe)
        .define()
        .unwrap();
    let mut heap = r.new_heap();
    let n = heap.new_instance(node, &[]).unwrap();
    let w = heap.new_struct(wrapper, &[("node", Value::Ref(n))]).unwrap();
    let h = heap.new_instance(host, &[("a", w)]).unwrap();

    let h2 = obj(&r.copy(&mut heap, &Value::Ref(h), None).unwrap());
    assert_eq!(heap.field(h2, "b").unwrap(), &Value::Null);
    let a = heap.field(h2, "a").unwrap().clone();
    let inner = obj(heap.struct_field(&a, "node").unwrap());
    assert_ne!(inner, n);
}

#[test]
fn singletons_are_shared_by_default() {
    let r = replicator();
    let pool = r.pool();
    let builder = pool.class("Color").unwrap();
    let color = builder.idx();
    builder
        .field("rgb", Idx::U32)
        .readonly_static("Red", color)
        .define()
        .unwrap();
    let mut heap = r.new_heap();
    let red = heap.new_instance(color, &[("rgb", Value::U32(0xff0000))]).unwrap();
    heap.init_static(color, "Red", Value::Ref(red)).unwrap();

    let shared = r.copy(&mut heap, &Value::Ref(red), None).unwrap();
    assert_eq!(shared, Value::Ref(red));

    let options = CloneOptions::new().deep_clone_singletons(true);
    let deep = r.copy(&mut heap, &Value::Ref(red), Some(&options)).unwrap();
    assert_ne!(deep, Value::Ref(red));
    assert!(heap.graph_eq(&deep, &Value::Ref(red)));
}

#[test]
fn readonly_fields_are_assigned_directly() {
    let r = replicator();
    let pool = r.pool();
    let money = pool
        .class("Money")
        .unwrap()
        .readonly_field("amount", Idx::DECIMAL)
        .init_field("currency", Idx::STR)
        .construction(Construction::MemberwiseOnly)
        .define()
        .unwrap();
    let mut heap = r.new_heap();
    let amount = Value::Decimal(replica_heap::Decimal::new(1999, 2));
    let m = heap
        .new_instance(
            money,
            &[("amount", amount.clone()), ("currency", Value::string("EUR"))],
        )
        .unwrap();

    let m2 = obj(&r.copy(&mut heap, &Value::Ref(m), None).unwrap());
    assert_ne!(m, m2);
    assert_eq!(heap.field(m2, "amount").unwrap(), &amount);
    assert_eq!(heap.field(m2, "currency").unwrap(), &Value::string("EUR"));
}

#[test]
fn unclonable_objects_resolve_to_themselves() {
    let r = replicator();
    let node = node_type(r.pool());
    let mut heap = r.new_heap();
    let logger = heap.new_instance(node, &[]).unwrap();
    let a = heap.new_instance(node, &[("next", Value::Ref(logger))]).unwrap();

    let options = CloneOptions::new().unclonable(logger);
    let b = obj(&r.copy(&mut heap, &Value::Ref(a), Some(&options)).unwrap());
    assert_eq!(heap.field(b, "next").unwrap(), &Value::Ref(logger));
    let itself = r.copy(&mut heap, &Value::Ref(logger), Some(&options)).unwrap();
    assert_eq!(itself, Value::Ref(logger));
}

#[test]
fn opaque_type_fails_without_partial_graph() {
    let r = replicator();
    let pool = r.pool();
    let handle = pool
        .class("Handle")
        .unwrap()
        .construction(Construction::Opaque)
        .define()
        .unwrap();
    let handles = pool.list(handle).unwrap();
    let mut heap = r.new_heap();
    let h = heap.new_instance(handle, &[]).unwrap();
    let list = heap.new_list(handles, vec![Value::Ref(h)]).unwrap();
    let before = heap.len();

    let err = r.copy(&mut heap, &Value::Ref(list), None).unwrap_err();
    assert_eq!(
        err,
        CloneError::UnsupportedType {
            ty: "Handle".to_owned()
        }
    );
    assert_eq!(heap.len(), before);

    // An empty list never needs the element plan.
    let empty = heap.new_list(handles, Vec::new()).unwrap();
    assert!(r.copy(&mut heap, &Value::Ref(empty), None).is_ok());
}

#[test]
fn foreign_heap_is_rejected() {
    let r = replicator();
    let mut heap = Heap::new(Arc::new(TypePool::new()));
    let o = heap.new_object().unwrap();
    assert_eq!(
        r.copy(&mut heap, &Value::Ref(o), None),
        Err(CloneError::ForeignHeap)
    );
}

#[test]
fn compiled_types_lists_plans() {
    let r = replicator();
    let node = node_type(r.pool());
    let mut heap = r.new_heap();
    let n = heap.new_instance(node, &[("label", Value::string("n"))]).unwrap();
    heap.set_field(n, "next", Value::Ref(n)).unwrap();
    r.copy(&mut heap, &Value::Ref(n), None).unwrap();
    assert_eq!(r.compiled_types(), vec!["Node".to_owned()]);
    assert_eq!(r.compiled_count(), 1);
}

#[test]
fn long_chains_do_not_overflow() {
    let r = replicator();
    let node = node_type(r.pool());
    let mut heap = r.new_heap();
    let mut head = Value::Null;
    for _ in 0..50_000 {
        head = Value::Ref(heap.new_instance(node, &[("next", head)]).unwrap());
    }
    let copy = r.copy(&mut heap, &head, None).unwrap();
    assert_ne!(copy, head);
    assert_eq!(heap.len(), 100_000);
}

#[test]
fn threads_share_plans() {
    let r = replicator();
    let node = node_type(r.pool());
    let list = r.pool().list(node).unwrap();

    let lens: Vec<usize> = (0..32_usize)
        .into_par_iter()
        .map(|i| {
            let mut heap = r.new_heap();
            let items = (0..=i)
                .map(|_| Value::Ref(heap.new_instance(node, &[]).unwrap()))
                .collect();
            let src = heap.new_list(list, items).unwrap();
            let dst = r.copy(&mut heap, &Value::Ref(src), None).unwrap();
            assert!(heap.graph_eq(&Value::Ref(src), &dst));
            heap.list_items(obj(&dst)).unwrap().len()
        })
        .collect();

    assert_eq!(lens, (1..=32).collect::<Vec<_>>());
    let names = r.compiled_types();
    assert_eq!(names, vec!["List<Node>".to_owned(), "Node".to_owned()]);
}
