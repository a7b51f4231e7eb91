//! The object arena.
//!
//! A `Heap` owns every object with reference identity and the values of
//! class statics. It is bound to one [`TypePool`]; every object's runtime
//! type is an index into that pool.
//!
//! # Two access levels
//!
//! - The checked API (`new_*`, `set_field`, `array_set`, `list_push`, ...)
//!   validates types through the pool and refuses writes to read-only and
//!   init-only fields after construction.
//! - The raw API (`alloc_*_shell`, `write_slot`, `append_raw`, ...) is used
//!   by the clone engine to populate fresh shells. It assigns slots directly
//!   and never runs accessor checks, which is what makes cloning immutable
//!   objects possible.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use replica_types::{slot_of, Idx, Layout, Primitive, StaticDef, TypeData, TypeEntry, TypePool};
use rustc_hash::{FxBuildHasher, FxHashMap};
use smallvec::SmallVec;
use uuid::Uuid;

use crate::error::HeapError;
use crate::object::{element_count, flat_index, HeapObject, MapStorage, ObjectKind, SetStorage};
use crate::value::{Decimal, ObjRef, StructValue, Value};

pub type HeapResult<T> = Result<T, HeapError>;

/// Arena of heap objects plus static storage.
pub struct Heap {
    pool: Arc<TypePool>,
    objects: Vec<HeapObject>,
    /// Static values keyed by (declaring class, static slot).
    statics: FxHashMap<(Idx, usize), Value>,
}

impl Heap {
    pub fn new(pool: Arc<TypePool>) -> Self {
        Self {
            pool,
            objects: Vec::new(),
            statics: FxHashMap::default(),
        }
    }

    /// The pool describing this heap's objects.
    #[inline]
    pub fn pool(&self) -> &Arc<TypePool> {
        &self.pool
    }

    /// Number of live objects.
    #[inline]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Drop every object allocated after the heap had `len` objects.
    ///
    /// References to dropped objects held elsewhere become dangling.
    pub fn truncate(&mut self, len: usize) {
        self.objects.truncate(len);
    }

    pub fn get(&self, obj: ObjRef) -> HeapResult<&HeapObject> {
        self.objects
            .get(obj.slot())
            .ok_or(HeapError::DanglingRef { obj })
    }

    fn get_mut(&mut self, obj: ObjRef) -> HeapResult<&mut HeapObject> {
        self.objects
            .get_mut(obj.slot())
            .ok_or(HeapError::DanglingRef { obj })
    }

    /// Exact runtime type of an object.
    pub fn type_of(&self, obj: ObjRef) -> HeapResult<Idx> {
        Ok(self.get(obj)?.ty())
    }

    /// Exact runtime type of any value; `None` for null.
    pub fn type_of_value(&self, value: &Value) -> HeapResult<Option<Idx>> {
        match value {
            Value::Ref(obj) => self.type_of(*obj).map(Some),
            other => Ok(other.inline_type()),
        }
    }

    /// Check if two values are the same reference.
    ///
    /// Objects compare by handle, strings by allocation. Everything else,
    /// null included, has no identity.
    pub fn same_ref(a: &Value, b: &Value) -> bool {
        match (a, b) {
            (Value::Ref(x), Value::Ref(y)) => x == y,
            (Value::Str(x), Value::Str(y)) => crate::Str::ptr_eq(x, y),
            _ => false,
        }
    }

    fn alloc(&mut self, ty: Idx, kind: ObjectKind) -> HeapResult<ObjRef> {
        if self.objects.len() >= u32::MAX as usize {
            return Err(HeapError::HeapFull);
        }
        let obj = ObjRef::from_slot(self.objects.len());
        self.objects.push(HeapObject::new(ty, kind));
        Ok(obj)
    }

    fn entry(&self, ty: Idx) -> HeapResult<Arc<TypeEntry>> {
        Ok(self.pool.entry(ty)?)
    }

    fn name(&self, ty: Idx) -> String {
        self.pool.display(ty)
    }

    // === Type checks ===

    /// Check that `value` may be stored in a slot declared as `declared`.
    pub fn check_value(&self, declared: Idx, value: &Value) -> HeapResult<()> {
        let Some(actual) = self.type_of_value(value)? else {
            let entry = self.entry(declared)?;
            if entry.flags.is_value_type() && !matches!(entry.data, TypeData::Nullable(_)) {
                return Err(HeapError::NullIntoValueType {
                    ty: self.name(declared),
                });
            }
            return Ok(());
        };
        if self.pool.is_assignable(actual, declared) {
            Ok(())
        } else {
            Err(HeapError::TypeMismatch {
                expected: self.name(declared),
                found: self.name(actual),
            })
        }
    }

    /// Zero value of a type: zeroed scalars and structs, null otherwise.
    pub fn default_value(&self, ty: Idx) -> Value {
        let Some(entry) = self.pool.get(ty) else {
            return Value::Null;
        };
        match &entry.data {
            TypeData::Primitive(p) => default_primitive(*p),
            TypeData::Enum(_) => Value::Enum { ty, raw: 0 },
            TypeData::Struct(def) => Value::Struct(StructValue::from_slots(
                ty,
                def.layout.iter().map(|s| self.default_value(s.ty)).collect(),
            )),
            _ => Value::Null,
        }
    }

    fn defaults(&self, layout: &Layout) -> Vec<Value> {
        layout.iter().map(|s| self.default_value(s.ty)).collect()
    }

    /// Layout of an instantiable class.
    fn class_layout(&self, ty: Idx) -> HeapResult<Layout> {
        let entry = self.entry(ty)?;
        match &entry.data {
            TypeData::Class(def) if !def.is_abstract => Ok(Arc::clone(&def.layout)),
            _ => Err(HeapError::NotInstantiable { ty: self.name(ty) }),
        }
    }

    /// Layout of the type of an existing instance.
    fn instance_layout(&self, obj: ObjRef) -> HeapResult<(Idx, Layout)> {
        let ty = self.type_of(obj)?;
        let entry = self.entry(ty)?;
        match &entry.data {
            TypeData::Class(def) => Ok((ty, Arc::clone(&def.layout))),
            TypeData::Any => Ok((ty, Arc::from(Vec::new()))),
            _ => Err(HeapError::WrongObjectKind {
                expected: "instance",
                found: self.get(obj)?.kind().name(),
            }),
        }
    }

    // === Instances ===

    /// Allocate a plain object of the top type.
    pub fn new_object(&mut self) -> HeapResult<ObjRef> {
        self.alloc(Idx::ANY, ObjectKind::Instance(Vec::new()))
    }

    /// Construct a class instance.
    ///
    /// Fields not listed get their type's default. Read-only and init-only
    /// fields may be set here, as a constructor or object initializer would.
    pub fn new_instance(&mut self, ty: Idx, fields: &[(&str, Value)]) -> HeapResult<ObjRef> {
        if ty == Idx::ANY && fields.is_empty() {
            return self.new_object();
        }
        let layout = self.class_layout(ty)?;
        let mut slots = self.defaults(&layout);
        for (name, value) in fields {
            let slot = slot_of(&layout, name).ok_or_else(|| HeapError::UnknownField {
                ty: self.name(ty),
                field: (*name).to_owned(),
            })?;
            self.check_value(layout[slot].ty, value)?;
            slots[slot] = value.clone();
        }
        self.alloc(ty, ObjectKind::Instance(slots))
    }

    /// Read a field of a class instance.
    pub fn field(&self, obj: ObjRef, name: &str) -> HeapResult<&Value> {
        let (ty, layout) = self.instance_layout(obj)?;
        let slot = slot_of(&layout, name).ok_or_else(|| HeapError::UnknownField {
            ty: self.name(ty),
            field: name.to_owned(),
        })?;
        self.instance_slot(obj, slot)
    }

    /// Assign a read-write field of a class instance.
    pub fn set_field(&mut self, obj: ObjRef, name: &str, value: Value) -> HeapResult<()> {
        let (ty, layout) = self.instance_layout(obj)?;
        let slot = slot_of(&layout, name).ok_or_else(|| HeapError::UnknownField {
            ty: self.name(ty),
            field: name.to_owned(),
        })?;
        if !layout[slot].access.is_writable() {
            return Err(HeapError::ReadOnlyField {
                ty: self.name(ty),
                field: name.to_owned(),
            });
        }
        self.check_value(layout[slot].ty, &value)?;
        self.write_slot(obj, slot, value)
    }

    // === Structs ===

    /// Construct a struct value. Unlisted fields are zeroed.
    pub fn new_struct(&self, ty: Idx, fields: &[(&str, Value)]) -> HeapResult<Value> {
        let entry = self.entry(ty)?;
        let TypeData::Struct(def) = &entry.data else {
            return Err(HeapError::WrongTypeKind {
                ty: self.name(ty),
                expected: "a struct",
            });
        };
        let mut slots = self.defaults(&def.layout);
        for (name, value) in fields {
            let slot = slot_of(&def.layout, name).ok_or_else(|| HeapError::UnknownField {
                ty: self.name(ty),
                field: (*name).to_owned(),
            })?;
            self.check_value(def.layout[slot].ty, value)?;
            slots[slot] = value.clone();
        }
        Ok(Value::Struct(StructValue::from_slots(ty, slots)))
    }

    /// Read a field of a struct value.
    pub fn struct_field<'v>(&self, value: &'v Value, name: &str) -> HeapResult<&'v Value> {
        let Value::Struct(sv) = value else {
            return Err(HeapError::WrongObjectKind {
                expected: "struct",
                found: value.kind_name(),
            });
        };
        let entry = self.entry(sv.ty())?;
        let slot = entry
            .data
            .layout()
            .and_then(|layout| slot_of(layout, name))
            .ok_or_else(|| HeapError::UnknownField {
                ty: self.name(sv.ty()),
                field: name.to_owned(),
            })?;
        sv.slot(slot).ok_or(HeapError::IndexOutOfBounds {
            index: slot,
            len: sv.fields().len(),
        })
    }

    // === Arrays ===

    fn array_elem(&self, ty: Idx) -> HeapResult<(Idx, usize)> {
        match &self.entry(ty)?.data {
            TypeData::Array { elem, rank } => Ok((*elem, usize::from(*rank))),
            _ => Err(HeapError::WrongTypeKind {
                ty: self.name(ty),
                expected: "an array type",
            }),
        }
    }

    /// Construct an array from row-major items.
    pub fn new_array(&mut self, ty: Idx, dims: &[usize], items: Vec<Value>) -> HeapResult<ObjRef> {
        let (elem, rank) = self.array_elem(ty)?;
        if dims.len() != rank {
            return Err(HeapError::RankMismatch {
                expected: rank,
                found: dims.len(),
            });
        }
        let count = element_count(dims).ok_or(HeapError::HeapFull)?;
        if items.len() != count {
            return Err(HeapError::LengthMismatch {
                expected: count,
                found: items.len(),
            });
        }
        for item in &items {
            self.check_value(elem, item)?;
        }
        self.alloc(
            ty,
            ObjectKind::Array {
                dims: SmallVec::from_slice(dims),
                items,
            },
        )
    }

    /// Per-dimension lengths of an array.
    pub fn array_dims(&self, obj: ObjRef) -> HeapResult<&[usize]> {
        match self.get(obj)?.kind() {
            ObjectKind::Array { dims, .. } => Ok(dims),
            other => Err(HeapError::WrongObjectKind {
                expected: "array",
                found: other.name(),
            }),
        }
    }

    fn locate(&self, obj: ObjRef, index: &[usize]) -> HeapResult<usize> {
        let dims = self.array_dims(obj)?;
        if dims.len() != index.len() {
            return Err(HeapError::RankMismatch {
                expected: dims.len(),
                found: index.len(),
            });
        }
        if let Some((&i, &len)) = index.iter().zip(dims).find(|&(&i, &len)| i >= len) {
            return Err(HeapError::IndexOutOfBounds { index: i, len });
        }
        flat_index(dims, index).ok_or(HeapError::RankMismatch {
            expected: dims.len(),
            found: index.len(),
        })
    }

    pub fn array_get(&self, obj: ObjRef, index: &[usize]) -> HeapResult<&Value> {
        let flat = self.locate(obj, index)?;
        self.instance_slot(obj, flat)
    }

    pub fn array_set(&mut self, obj: ObjRef, index: &[usize], value: Value) -> HeapResult<()> {
        let flat = self.locate(obj, index)?;
        let (elem, _) = self.array_elem(self.type_of(obj)?)?;
        self.check_value(elem, &value)?;
        self.write_slot(obj, flat, value)
    }

    // === Lists ===

    fn list_elem(&self, ty: Idx) -> HeapResult<Idx> {
        match &self.entry(ty)?.data {
            TypeData::List(elem) => Ok(*elem),
            _ => Err(HeapError::WrongTypeKind {
                ty: self.name(ty),
                expected: "a list type",
            }),
        }
    }

    pub fn new_list(&mut self, ty: Idx, items: Vec<Value>) -> HeapResult<ObjRef> {
        let elem = self.list_elem(ty)?;
        for item in &items {
            self.check_value(elem, item)?;
        }
        self.alloc(ty, ObjectKind::List(items))
    }

    pub fn list_push(&mut self, obj: ObjRef, value: Value) -> HeapResult<()> {
        let elem = self.list_elem(self.type_of(obj)?)?;
        self.check_value(elem, &value)?;
        self.append_raw(obj, value)
    }

    pub fn list_items(&self, obj: ObjRef) -> HeapResult<&[Value]> {
        match self.get(obj)?.kind() {
            ObjectKind::List(items) => Ok(items),
            other => Err(HeapError::WrongObjectKind {
                expected: "list",
                found: other.name(),
            }),
        }
    }

    // === Sets ===

    fn set_elem(&self, ty: Idx) -> HeapResult<Idx> {
        match &self.entry(ty)?.data {
            TypeData::Set(elem) => Ok(*elem),
            _ => Err(HeapError::WrongTypeKind {
                ty: self.name(ty),
                expected: "a set type",
            }),
        }
    }

    /// Construct a set. Duplicate items are an error.
    pub fn new_set(&mut self, ty: Idx, items: Vec<Value>) -> HeapResult<ObjRef> {
        let elem = self.set_elem(ty)?;
        let mut set = SetStorage::with_capacity_and_hasher(items.len(), FxBuildHasher);
        for item in items {
            self.check_value(elem, &item)?;
            if !set.insert(item) {
                return Err(HeapError::DuplicateKey { ty: self.name(ty) });
            }
        }
        self.alloc(ty, ObjectKind::Set(set))
    }

    /// Add an item; `false` if an equal item is already present.
    pub fn set_insert(&mut self, obj: ObjRef, value: Value) -> HeapResult<bool> {
        let elem = self.set_elem(self.type_of(obj)?)?;
        self.check_value(elem, &value)?;
        self.set_insert_raw(obj, value)
    }

    pub fn set_contains(&self, obj: ObjRef, value: &Value) -> HeapResult<bool> {
        Ok(self.set_items(obj)?.contains(value))
    }

    pub fn set_items(&self, obj: ObjRef) -> HeapResult<&SetStorage> {
        match self.get(obj)?.kind() {
            ObjectKind::Set(set) => Ok(set),
            other => Err(HeapError::WrongObjectKind {
                expected: "set",
                found: other.name(),
            }),
        }
    }

    // === Maps ===

    fn map_types(&self, ty: Idx) -> HeapResult<(Idx, Idx)> {
        match &self.entry(ty)?.data {
            TypeData::Map { key, value } => Ok((*key, *value)),
            _ => Err(HeapError::WrongTypeKind {
                ty: self.name(ty),
                expected: "a map type",
            }),
        }
    }

    /// Construct a map. Duplicate keys are an error.
    pub fn new_map(&mut self, ty: Idx, entries: Vec<(Value, Value)>) -> HeapResult<ObjRef> {
        let (key_ty, value_ty) = self.map_types(ty)?;
        let mut map = MapStorage::with_capacity_and_hasher(entries.len(), FxBuildHasher);
        for (key, value) in entries {
            if key.is_null() {
                return Err(HeapError::NullIntoValueType {
                    ty: format!("{} key", self.name(ty)),
                });
            }
            self.check_value(key_ty, &key)?;
            self.check_value(value_ty, &value)?;
            if map.insert(key, value).is_some() {
                return Err(HeapError::DuplicateKey { ty: self.name(ty) });
            }
        }
        self.alloc(ty, ObjectKind::Map(map))
    }

    /// Insert or overwrite an entry, returning the previous value.
    pub fn map_insert(&mut self, obj: ObjRef, key: Value, value: Value) -> HeapResult<Option<Value>> {
        let ty = self.type_of(obj)?;
        let (key_ty, value_ty) = self.map_types(ty)?;
        if key.is_null() {
            return Err(HeapError::NullIntoValueType {
                ty: format!("{} key", self.name(ty)),
            });
        }
        self.check_value(key_ty, &key)?;
        self.check_value(value_ty, &value)?;
        match self.get_mut(obj)?.kind_mut() {
            ObjectKind::Map(map) => Ok(map.insert(key, value)),
            other => Err(HeapError::WrongObjectKind {
                expected: "map",
                found: other.name(),
            }),
        }
    }

    pub fn map_get(&self, obj: ObjRef, key: &Value) -> HeapResult<Option<&Value>> {
        Ok(self.map_entries(obj)?.get(key))
    }

    pub fn map_entries(&self, obj: ObjRef) -> HeapResult<&MapStorage> {
        match self.get(obj)?.kind() {
            ObjectKind::Map(map) => Ok(map),
            other => Err(HeapError::WrongObjectKind {
                expected: "map",
                found: other.name(),
            }),
        }
    }

    // === Tuples ===

    fn tuple_elems(&self, ty: Idx) -> HeapResult<SmallVec<[Idx; 4]>> {
        match &self.entry(ty)?.data {
            TypeData::Tuple(elems) => Ok(elems.clone()),
            _ => Err(HeapError::WrongTypeKind {
                ty: self.name(ty),
                expected: "a tuple type",
            }),
        }
    }

    pub fn new_tuple(&mut self, ty: Idx, items: Vec<Value>) -> HeapResult<ObjRef> {
        let elems = self.tuple_elems(ty)?;
        if items.len() != elems.len() {
            return Err(HeapError::LengthMismatch {
                expected: elems.len(),
                found: items.len(),
            });
        }
        for (&elem, item) in elems.iter().zip(&items) {
            self.check_value(elem, item)?;
        }
        self.alloc(ty, ObjectKind::Tuple(items))
    }

    pub fn tuple_items(&self, obj: ObjRef) -> HeapResult<&[Value]> {
        match self.get(obj)?.kind() {
            ObjectKind::Tuple(items) => Ok(items),
            other => Err(HeapError::WrongObjectKind {
                expected: "tuple",
                found: other.name(),
            }),
        }
    }

    // === Statics ===

    fn static_def(&self, ty: Idx, name: &str) -> HeapResult<(usize, StaticDef)> {
        let entry = self.entry(ty)?;
        let found = match &entry.data {
            TypeData::Class(def) => def
                .statics
                .iter()
                .position(|s| &*s.name == name)
                .map(|slot| (slot, def.statics[slot].clone())),
            _ => None,
        };
        found.ok_or_else(|| HeapError::UnknownStatic {
            ty: self.name(ty),
            name: name.to_owned(),
        })
    }

    /// Initialise a static. Read-only statics can be written once.
    pub fn init_static(&mut self, ty: Idx, name: &str, value: Value) -> HeapResult<()> {
        let (slot, def) = self.static_def(ty, name)?;
        if def.readonly && self.statics.contains_key(&(ty, slot)) {
            return Err(HeapError::StaticAlreadyInitialised {
                ty: self.name(ty),
                name: name.to_owned(),
            });
        }
        self.check_value(def.ty, &value)?;
        tracing::trace!(ty = %self.name(ty), name, "initialised static");
        self.statics.insert((ty, slot), value);
        Ok(())
    }

    /// Current value of a static; its type's default if never initialised.
    pub fn static_value(&self, ty: Idx, name: &str) -> HeapResult<Value> {
        let (slot, def) = self.static_def(ty, name)?;
        Ok(self
            .statics
            .get(&(ty, slot))
            .cloned()
            .unwrap_or_else(|| self.default_value(def.ty)))
    }

    /// Value of a static by slot, if initialised.
    pub fn static_slot(&self, ty: Idx, slot: usize) -> Option<&Value> {
        self.statics.get(&(ty, slot))
    }

    // === Raw access ===

    /// Read an instance field, tuple component or row-major array element by slot.
    pub fn instance_slot(&self, obj: ObjRef, slot: usize) -> HeapResult<&Value> {
        let values = match self.get(obj)?.kind() {
            ObjectKind::Instance(v) | ObjectKind::Tuple(v) => v,
            ObjectKind::Array { items, .. } => items,
            other => {
                return Err(HeapError::WrongObjectKind {
                    expected: "instance, tuple or array",
                    found: other.name(),
                })
            }
        };
        values.get(slot).ok_or(HeapError::IndexOutOfBounds {
            index: slot,
            len: values.len(),
        })
    }

    /// Assign a slot directly, without type or access checks.
    pub fn write_slot(&mut self, obj: ObjRef, slot: usize, value: Value) -> HeapResult<()> {
        let values = match self.get_mut(obj)?.kind_mut() {
            ObjectKind::Instance(v) | ObjectKind::Tuple(v) => v,
            ObjectKind::Array { items, .. } => items,
            other => {
                return Err(HeapError::WrongObjectKind {
                    expected: "instance, tuple or array",
                    found: other.name(),
                })
            }
        };
        let len = values.len();
        let dst = values
            .get_mut(slot)
            .ok_or(HeapError::IndexOutOfBounds { index: slot, len })?;
        *dst = value;
        Ok(())
    }

    /// Duplicate an object member-wise: same type, every slot copied as is.
    pub fn shallow_copy(&mut self, obj: ObjRef) -> HeapResult<ObjRef> {
        let copy = self.get(obj)?.clone();
        let ty = copy.ty();
        self.alloc(ty, copy.kind().clone())
    }

    /// Allocate an instance as its parameterless constructor would: every
    /// field at its default.
    pub fn alloc_instance_shell(&mut self, ty: Idx) -> HeapResult<ObjRef> {
        if ty == Idx::ANY {
            return self.new_object();
        }
        let layout = self.class_layout(ty)?;
        let slots = self.defaults(&layout);
        self.alloc(ty, ObjectKind::Instance(slots))
    }

    /// Allocate an array with the given dimensions, every element at its default.
    pub fn alloc_array_shell(&mut self, ty: Idx, dims: &[usize]) -> HeapResult<ObjRef> {
        let (elem, rank) = self.array_elem(ty)?;
        if dims.len() != rank {
            return Err(HeapError::RankMismatch {
                expected: rank,
                found: dims.len(),
            });
        }
        let count = element_count(dims).ok_or(HeapError::HeapFull)?;
        let items = vec![self.default_value(elem); count];
        self.alloc(
            ty,
            ObjectKind::Array {
                dims: SmallVec::from_slice(dims),
                items,
            },
        )
    }

    pub fn alloc_list_shell(&mut self, ty: Idx, capacity: usize) -> HeapResult<ObjRef> {
        self.list_elem(ty)?;
        self.alloc(ty, ObjectKind::List(Vec::with_capacity(capacity)))
    }

    pub fn alloc_set_shell(&mut self, ty: Idx, capacity: usize) -> HeapResult<ObjRef> {
        self.set_elem(ty)?;
        let set = SetStorage::with_capacity_and_hasher(capacity, FxBuildHasher);
        self.alloc(ty, ObjectKind::Set(set))
    }

    pub fn alloc_map_shell(&mut self, ty: Idx, capacity: usize) -> HeapResult<ObjRef> {
        self.map_types(ty)?;
        let map = MapStorage::with_capacity_and_hasher(capacity, FxBuildHasher);
        self.alloc(ty, ObjectKind::Map(map))
    }

    /// Allocate a tuple with every component at its default.
    pub fn alloc_tuple_shell(&mut self, ty: Idx) -> HeapResult<ObjRef> {
        let elems = self.tuple_elems(ty)?;
        let items = elems.iter().map(|&e| self.default_value(e)).collect();
        self.alloc(ty, ObjectKind::Tuple(items))
    }

    /// Append to a list without type checks.
    pub fn append_raw(&mut self, obj: ObjRef, value: Value) -> HeapResult<()> {
        match self.get_mut(obj)?.kind_mut() {
            ObjectKind::List(items) => {
                items.push(value);
                Ok(())
            }
            other => Err(HeapError::WrongObjectKind {
                expected: "list",
                found: other.name(),
            }),
        }
    }

    /// Add to a set without type checks; `false` if an equal item exists.
    pub fn set_insert_raw(&mut self, obj: ObjRef, value: Value) -> HeapResult<bool> {
        match self.get_mut(obj)?.kind_mut() {
            ObjectKind::Set(set) => Ok(set.insert(value)),
            other => Err(HeapError::WrongObjectKind {
                expected: "set",
                found: other.name(),
            }),
        }
    }

    /// Add a map entry without type checks. An existing equal key is kept
    /// and `false` is returned.
    pub fn map_insert_raw(&mut self, obj: ObjRef, key: Value, value: Value) -> HeapResult<bool> {
        match self.get_mut(obj)?.kind_mut() {
            ObjectKind::Map(map) => match map.entry(key) {
                indexmap::map::Entry::Occupied(_) => Ok(false),
                indexmap::map::Entry::Vacant(slot) => {
                    slot.insert(value);
                    Ok(true)
                }
            },
            other => Err(HeapError::WrongObjectKind {
                expected: "map",
                found: other.name(),
            }),
        }
    }
}

fn default_primitive(p: Primitive) -> Value {
    match p {
        Primitive::Bool => Value::Bool(false),
        Primitive::Char => Value::Char('\0'),
        Primitive::I8 => Value::I8(0),
        Primitive::I16 => Value::I16(0),
        Primitive::I32 => Value::I32(0),
        Primitive::I64 => Value::I64(0),
        Primitive::U8 => Value::U8(0),
        Primitive::U16 => Value::U16(0),
        Primitive::U32 => Value::U32(0),
        Primitive::U64 => Value::U64(0),
        Primitive::F32 => Value::F32(0.0),
        Primitive::F64 => Value::F64(0.0),
        Primitive::Decimal => Value::Decimal(Decimal::default()),
        Primitive::DateTime => Value::DateTime(DateTime::<Utc>::default()),
        Primitive::Guid => Value::Guid(Uuid::nil()),
    }
}

impl fmt::Debug for Heap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Heap")
            .field("objects", &self.objects.len())
            .field("statics", &self.statics.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap for concise assertions"
)]
