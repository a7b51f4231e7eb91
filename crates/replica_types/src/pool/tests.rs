use pretty_assertions::assert_eq;

use super::*;
use crate::data::{Construction, FieldAccess};

#[test]
fn pool_starts_with_builtins() {
    let pool = TypePool::new();
    assert_eq!(pool.len(), Idx::BUILTIN_COUNT as usize);
    assert_eq!(pool.shape(Idx::I32), Some(Shape::Scalar));
    assert_eq!(pool.shape(Idx::GUID), Some(Shape::Scalar));
    assert_eq!(pool.shape(Idx::STR), Some(Shape::String));
    assert_eq!(pool.shape(Idx::ANY), Some(Shape::AbstractOrInterface));
    assert!(pool.flags(Idx::DECIMAL).is_simple());
    assert!(!pool.flags(Idx::STR).is_value_type());
}

#[test]
fn structural_types_are_interned() {
    let pool = TypePool::new();
    let a = pool.list(Idx::STR).unwrap();
    let b = pool.list(Idx::STR).unwrap();
    assert_eq!(a, b);
    assert_ne!(a, pool.set(Idx::STR).unwrap());

    let grid = pool.array(Idx::I32, 2).unwrap();
    assert_eq!(grid, pool.array(Idx::I32, 2).unwrap());
    assert_ne!(grid, pool.array(Idx::I32, 1).unwrap());
    assert_eq!(pool.shape(grid), Some(Shape::ArrayND));
}

#[test]
fn structural_validation() {
    let pool = TypePool::new();
    assert_eq!(
        pool.array(Idx::I32, 0),
        Err(TypeDefError::ArrayRank {
            rank: 0,
            max: MAX_ARRAY_RANK
        })
    );
    assert!(pool.array(Idx::I32, 33).is_err());
    assert_eq!(pool.tuple(&[]), Err(TypeDefError::TupleArity { arity: 0 }));
    assert_eq!(
        pool.tuple(&[Idx::I32; 9]),
        Err(TypeDefError::TupleArity { arity: 9 })
    );
    assert!(matches!(
        pool.nullable(Idx::STR),
        Err(TypeDefError::NullableOfReference { .. })
    ));
    let missing = Idx::from_raw(9000);
    assert_eq!(
        pool.list(missing),
        Err(TypeDefError::UnknownType { idx: missing })
    );
}

#[test]
fn display_names() {
    let pool = TypePool::new();
    let node = pool.class("Node").unwrap().define().unwrap();
    assert_eq!(pool.display(Idx::I32), "int");
    assert_eq!(pool.display(node), "Node");
    assert_eq!(pool.display(pool.array(Idx::I32, 2).unwrap()), "int[,]");
    assert_eq!(pool.display(pool.array(Idx::I32, 1).unwrap()), "int[]");
    assert_eq!(pool.display(pool.list(Idx::STR).unwrap()), "List<string>");
    assert_eq!(
        pool.display(pool.map(Idx::I32, node).unwrap()),
        "Dictionary<int,Node>"
    );
    assert_eq!(
        pool.display(pool.tuple(&[Idx::I32, Idx::STR]).unwrap()),
        "Tuple<int,string>"
    );
    assert_eq!(pool.display(pool.nullable(Idx::I32).unwrap()), "int?");
}

#[test]
fn class_layout_puts_base_fields_first() {
    let pool = TypePool::new();
    let base = pool
        .class("Animal")
        .unwrap()
        .field("name", Idx::STR)
        .field("legs", Idx::I32)
        .define()
        .unwrap();
    let derived = pool
        .class("Dog")
        .unwrap()
        .base(base)
        .readonly_field("breed", Idx::STR)
        .define()
        .unwrap();

    let entry = pool.entry(derived).unwrap();
    let layout = entry.data.layout().unwrap();
    let names: Vec<&str> = layout.iter().map(|s| &*s.name).collect();
    assert_eq!(names, vec!["name", "legs", "breed"]);
    assert_eq!(layout[0].owner, base);
    assert_eq!(layout[2].owner, derived);
    assert_eq!(layout[2].access, FieldAccess::ReadOnly);
    assert_eq!(entry.shape, Shape::Object);
    assert!(entry.flags.is_open());
}

#[test]
fn self_referential_class() {
    let pool = TypePool::new();
    let builder = pool.class("Node").unwrap();
    let node = builder.idx();
    let defined = builder.field("next", node).define().unwrap();
    assert_eq!(defined, node);
    assert_eq!(pool.lookup("Node"), Some(node));
}

#[test]
fn mutually_recursive_classes() {
    let pool = TypePool::new();
    let parent = pool.declare_class("Parent").unwrap();
    let child = pool
        .class("Child")
        .unwrap()
        .field("parent", parent)
        .define()
        .unwrap();
    let children = pool.list(child).unwrap();
    pool.class_for(parent)
        .unwrap()
        .field("children", children)
        .define()
        .unwrap();

    assert!(pool.flags(parent).is_defined());
    assert!(matches!(
        pool.class_for(parent),
        Err(TypeDefError::AlreadyDefined { .. })
    ));
}

#[test]
fn class_validation() {
    let pool = TypePool::new();
    let sealed = pool.class("Leaf").unwrap().sealed().define().unwrap();
    let iface = pool.interface("IShape").unwrap();

    assert!(matches!(
        pool.class("Leaf"),
        Err(TypeDefError::DuplicateName { .. })
    ));
    assert!(matches!(
        pool.class("Twig").unwrap().base(sealed).define(),
        Err(TypeDefError::SealedBase { .. })
    ));
    assert!(matches!(
        pool.class("Odd").unwrap().base(Idx::I32).define(),
        Err(TypeDefError::BaseNotClass { .. })
    ));
    assert!(matches!(
        pool.class("Odd2").unwrap().implements(sealed).define(),
        Err(TypeDefError::NotAnInterface { .. })
    ));
    assert!(matches!(
        pool.class("Both")
            .unwrap()
            .make_abstract()
            .sealed()
            .define(),
        Err(TypeDefError::AbstractSealed { .. })
    ));
    assert!(matches!(
        pool.class("Twice")
            .unwrap()
            .field("a", Idx::I32)
            .field("a", Idx::I64)
            .define(),
        Err(TypeDefError::DuplicateField { .. })
    ));
    let pending = pool.declare_class("Pending").unwrap();
    assert!(matches!(
        pool.class("Early").unwrap().base(pending).define(),
        Err(TypeDefError::UndefinedDependency { .. })
    ));

    let ok = pool
        .class("Square")
        .unwrap()
        .implements(iface)
        .define()
        .unwrap();
    assert!(pool.is_assignable(ok, iface));
}

#[test]
fn struct_simplicity_is_recursive() {
    let pool = TypePool::new();
    let point = pool
        .structure("Point")
        .unwrap()
        .field("x", Idx::F64)
        .field("y", Idx::F64)
        .define()
        .unwrap();
    let segment = pool
        .structure("Segment")
        .unwrap()
        .field("from", point)
        .field("to", point)
        .define()
        .unwrap();
    let label = pool
        .structure("Label")
        .unwrap()
        .field("at", point)
        .init_field("text", Idx::STR)
        .define()
        .unwrap();

    assert_eq!(pool.shape(point), Some(Shape::Scalar));
    assert_eq!(pool.shape(segment), Some(Shape::Scalar));
    assert_eq!(pool.shape(label), Some(Shape::Object));
    assert_eq!(pool.shape(pool.nullable(point).unwrap()), Some(Shape::Scalar));
    assert_eq!(pool.shape(pool.nullable(label).unwrap()), Some(Shape::Object));
    assert!(!pool.flags(label).is_open());
}

#[test]
fn struct_cannot_contain_itself() {
    let pool = TypePool::new();
    let builder = pool.structure("Loop").unwrap();
    let this = builder.idx();
    assert_eq!(
        builder.field("inner", this).define(),
        Err(TypeDefError::RecursiveValueType {
            name: "Loop".into(),
            field: "inner".into()
        })
    );
}

#[test]
fn enum_needs_integral_underlying() {
    let pool = TypePool::new();
    let color = pool.enumeration("Color", Primitive::U8).unwrap();
    assert_eq!(pool.shape(color), Some(Shape::Scalar));
    assert!(matches!(
        pool.enumeration("Bad", Primitive::F64),
        Err(TypeDefError::EnumUnderlying { .. })
    ));
}

#[test]
fn abstract_and_interface_shapes() {
    let pool = TypePool::new();
    let shape = pool.class("Shape").unwrap().make_abstract().define().unwrap();
    let iface = pool.interface("IDrawable").unwrap();
    let opaque = pool
        .class("Handle")
        .unwrap()
        .construction(Construction::Opaque)
        .define()
        .unwrap();

    assert_eq!(pool.shape(shape), Some(Shape::AbstractOrInterface));
    assert_eq!(pool.shape(iface), Some(Shape::AbstractOrInterface));
    assert_eq!(pool.shape(opaque), Some(Shape::Object));
    assert!(!pool.flags(opaque).contains(TypeFlags::HAS_DEFAULT_CTOR));
}

#[test]
fn assignability() {
    let pool = TypePool::new();
    let drawable = pool.interface("IDrawable").unwrap();
    let base = pool
        .class("Widget")
        .unwrap()
        .implements(drawable)
        .define()
        .unwrap();
    let derived = pool.class("Button").unwrap().base(base).define().unwrap();
    let other = pool.class("Other").unwrap().define().unwrap();
    let maybe_int = pool.nullable(Idx::I32).unwrap();

    assert!(pool.is_assignable(derived, base));
    assert!(pool.is_assignable(derived, drawable));
    assert!(pool.is_assignable(derived, Idx::ANY));
    assert!(pool.is_assignable(Idx::I32, Idx::ANY));
    assert!(pool.is_assignable(Idx::I32, maybe_int));
    assert!(!pool.is_assignable(base, derived));
    assert!(!pool.is_assignable(other, drawable));
    assert!(!pool.is_assignable(Idx::I64, Idx::I32));

    let chain: Vec<Idx> = pool.ancestors(derived).collect();
    assert_eq!(chain, vec![derived, base]);
}

#[test]
fn pool_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<TypePool>();
}
