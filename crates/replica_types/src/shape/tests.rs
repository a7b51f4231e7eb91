use std::sync::Arc;

use smallvec::smallvec;

use super::*;
use crate::data::{ClassDef, Construction, DeclaredKind, Primitive};
use crate::Idx;

fn class(is_abstract: bool) -> TypeData {
    TypeData::Class(ClassDef {
        name: Arc::from("C"),
        base: None,
        interfaces: Vec::new(),
        fields: Vec::new(),
        statics: Vec::new(),
        construction: Construction::Parameterless,
        is_abstract,
        is_sealed: false,
        layout: Arc::from(Vec::new()),
    })
}

#[test]
fn scalars_and_strings() {
    let prim = TypeData::Primitive(Primitive::I32);
    assert_eq!(classify(&prim, TypeFlags::SCALAR), Shape::Scalar);
    assert_eq!(classify(&TypeData::Str, TypeFlags::IS_DEFINED), Shape::String);
    assert!(!Shape::Scalar.is_reference());
    assert!(!Shape::String.is_reference());
}

#[test]
fn arrays_split_by_rank() {
    let one = TypeData::Array {
        elem: Idx::I32,
        rank: 1,
    };
    let two = TypeData::Array {
        elem: Idx::I32,
        rank: 2,
    };
    assert_eq!(classify(&one, TypeFlags::IS_CONTAINER), Shape::Array1D);
    assert_eq!(classify(&two, TypeFlags::IS_CONTAINER), Shape::ArrayND);
}

#[test]
fn containers() {
    let flags = TypeFlags::IS_CONTAINER;
    assert_eq!(classify(&TypeData::List(Idx::STR), flags), Shape::ListOrSet);
    assert_eq!(classify(&TypeData::Set(Idx::STR), flags), Shape::ListOrSet);
    let map = TypeData::Map {
        key: Idx::I32,
        value: Idx::STR,
    };
    assert_eq!(classify(&map, flags), Shape::Map);
    let tuple = TypeData::Tuple(smallvec![Idx::I32, Idx::STR]);
    assert_eq!(classify(&tuple, flags), Shape::Tuple);
}

#[test]
fn value_types_follow_simplicity() {
    let nullable = TypeData::Nullable(Idx::I32);
    assert_eq!(
        classify(&nullable, TypeFlags::IS_VALUE_TYPE | TypeFlags::IS_SIMPLE),
        Shape::Scalar
    );
    assert_eq!(classify(&nullable, TypeFlags::IS_VALUE_TYPE), Shape::Object);
}

#[test]
fn classes_interfaces_and_top() {
    assert_eq!(classify(&class(false), TypeFlags::IS_NOMINAL), Shape::Object);
    assert_eq!(
        classify(&class(true), TypeFlags::IS_NOMINAL),
        Shape::AbstractOrInterface
    );
    let iface = TypeData::Interface {
        name: Arc::from("I"),
    };
    assert_eq!(classify(&iface, TypeFlags::IS_INTERFACE), Shape::AbstractOrInterface);
    assert_eq!(classify(&TypeData::Any, TypeFlags::empty()), Shape::AbstractOrInterface);
    let declared = TypeData::Declared {
        name: Arc::from("D"),
        kind: DeclaredKind::Class,
    };
    assert_eq!(classify(&declared, TypeFlags::IS_NOMINAL), Shape::Object);
}

#[test]
fn only_object_shapes_redirect() {
    assert!(Shape::Object.needs_redirect());
    assert!(Shape::AbstractOrInterface.needs_redirect());
    assert!(!Shape::Array1D.needs_redirect());
    assert!(!Shape::Tuple.needs_redirect());
    assert!(Shape::Tuple.is_reference());
}
