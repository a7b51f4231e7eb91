//! Type pool: the reflective registry every value is described by.
//!
//! Built-in types live at fixed indices below [`Idx::FIRST_DYNAMIC`] and are
//! never locked. Dynamic types (user classes, structs, enums, interfaces and
//! interned structural types) live behind a `parking_lot::RwLock`.
//!
//! # Entries
//!
//! A [`TypeEntry`] is immutable once published. Defining a declared type
//! replaces its entry with a fresh `Arc`, so readers holding the old entry
//! keep a consistent (declared) view.

mod builder;
mod format;

use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::data::{DeclaredKind, EnumDef, Primitive, StructuralKey, TupleElems, TypeData};
use crate::error::TypeDefError;
use crate::flags::TypeFlags;
use crate::shape::{classify, Shape};
use crate::Idx;

pub use builder::{ClassBuilder, StructBuilder};

/// Highest array rank the pool accepts.
pub const MAX_ARRAY_RANK: u8 = 32;

/// Highest tuple arity the pool accepts.
pub const MAX_TUPLE_ARITY: usize = 8;

/// A published type.
#[derive(Debug)]
pub struct TypeEntry {
    pub idx: Idx,
    pub data: TypeData,
    pub flags: TypeFlags,
    pub shape: Shape,
}

impl TypeEntry {
    fn new(idx: Idx, data: TypeData, flags: TypeFlags) -> Self {
        let shape = classify(&data, flags);
        Self {
            idx,
            data,
            flags,
            shape,
        }
    }
}

struct PoolInner {
    /// Dynamic entries; `entries[i]` has index `FIRST_DYNAMIC + i`.
    entries: Vec<Arc<TypeEntry>>,
    by_name: FxHashMap<Arc<str>, Idx>,
    structural: FxHashMap<StructuralKey, Idx>,
}

impl PoolInner {
    fn get(&self, idx: Idx) -> Option<&Arc<TypeEntry>> {
        let local = idx.raw().checked_sub(Idx::FIRST_DYNAMIC)?;
        self.entries.get(local as usize)
    }

    fn next_idx(&self) -> Idx {
        #[expect(
            clippy::cast_possible_truncation,
            reason = "pool sizes are far below u32::MAX"
        )]
        let local = self.entries.len() as u32;
        Idx::from_raw(Idx::FIRST_DYNAMIC + local)
    }

    fn push(&mut self, data: TypeData, flags: TypeFlags) -> Idx {
        let idx = self.next_idx();
        self.entries.push(Arc::new(TypeEntry::new(idx, data, flags)));
        idx
    }

    fn replace(&mut self, idx: Idx, data: TypeData, flags: TypeFlags) {
        let local = (idx.raw() - Idx::FIRST_DYNAMIC) as usize;
        self.entries[local] = Arc::new(TypeEntry::new(idx, data, flags));
    }
}

/// Registry of all types known to one clone engine.
///
/// # Thread Safety
/// `TypePool` is `Send + Sync`. Lookups take a read lock on the dynamic
/// table; definitions take the write lock once, after validation data has
/// been gathered.
pub struct TypePool {
    builtins: Vec<Arc<TypeEntry>>,
    inner: RwLock<PoolInner>,
}

impl TypePool {
    /// Create a pool holding only the built-in types.
    pub fn new() -> Self {
        let mut builtins = Vec::with_capacity(Idx::BUILTIN_COUNT as usize);
        builtins.push(Arc::new(TypeEntry::new(
            Idx::ANY,
            TypeData::Any,
            TypeFlags::IS_DEFINED | TypeFlags::HAS_DEFAULT_CTOR,
        )));
        for prim in Primitive::ALL {
            builtins.push(Arc::new(TypeEntry::new(
                prim.idx(),
                TypeData::Primitive(prim),
                TypeFlags::SCALAR | TypeFlags::IS_SEALED,
            )));
        }
        builtins.push(Arc::new(TypeEntry::new(
            Idx::STR,
            TypeData::Str,
            TypeFlags::IS_DEFINED | TypeFlags::IS_SEALED,
        )));
        debug_assert_eq!(builtins.len(), Idx::BUILTIN_COUNT as usize);

        Self {
            builtins,
            inner: RwLock::new(PoolInner {
                entries: Vec::new(),
                by_name: FxHashMap::default(),
                structural: FxHashMap::default(),
            }),
        }
    }

    // === Lookup ===

    /// Get the entry for a type, if it exists.
    pub fn get(&self, idx: Idx) -> Option<Arc<TypeEntry>> {
        if idx.is_builtin() {
            return self.builtins.get(idx.raw() as usize).cloned();
        }
        self.inner.read().get(idx).cloned()
    }

    /// Get the entry for a type.
    pub fn entry(&self, idx: Idx) -> Result<Arc<TypeEntry>, TypeDefError> {
        self.get(idx).ok_or(TypeDefError::UnknownType { idx })
    }

    /// Check if the index names a type in this pool.
    pub fn contains(&self, idx: Idx) -> bool {
        self.get(idx).is_some()
    }

    /// Flags of a type; empty for unknown indices.
    pub fn flags(&self, idx: Idx) -> TypeFlags {
        self.get(idx).map_or(TypeFlags::empty(), |e| e.flags)
    }

    /// Shape of a type.
    pub fn shape(&self, idx: Idx) -> Option<Shape> {
        self.get(idx).map(|e| e.shape)
    }

    /// Find a nominal type by name.
    pub fn lookup(&self, name: &str) -> Option<Idx> {
        self.inner.read().by_name.get(name).copied()
    }

    /// Number of types, built-ins included.
    pub fn len(&self) -> usize {
        self.builtins.len() + self.inner.read().entries.len()
    }

    /// Always false: the built-ins are present from the start.
    pub fn is_empty(&self) -> bool {
        false
    }

    // === Structural Types ===

    /// Array type of `elem` with the given rank.
    pub fn array(&self, elem: Idx, rank: usize) -> Result<Idx, TypeDefError> {
        let rank = u8::try_from(rank)
            .ok()
            .filter(|r| (1..=MAX_ARRAY_RANK).contains(r))
            .ok_or(TypeDefError::ArrayRank {
                rank,
                max: MAX_ARRAY_RANK,
            })?;
        self.entry(elem)?;
        Ok(self.intern(
            StructuralKey::Array(elem, rank),
            TypeFlags::IS_CONTAINER | TypeFlags::IS_SEALED | TypeFlags::IS_DEFINED,
        ))
    }

    /// List type `List<elem>`.
    pub fn list(&self, elem: Idx) -> Result<Idx, TypeDefError> {
        self.entry(elem)?;
        Ok(self.intern(StructuralKey::List(elem), Self::collection_flags()))
    }

    /// Set type `HashSet<elem>`.
    pub fn set(&self, elem: Idx) -> Result<Idx, TypeDefError> {
        self.entry(elem)?;
        Ok(self.intern(StructuralKey::Set(elem), Self::collection_flags()))
    }

    /// Map type `Dictionary<key,value>`.
    pub fn map(&self, key: Idx, value: Idx) -> Result<Idx, TypeDefError> {
        self.entry(key)?;
        self.entry(value)?;
        Ok(self.intern(StructuralKey::Map(key, value), Self::collection_flags()))
    }

    /// Reference tuple type `Tuple<T1,..,Tn>`.
    pub fn tuple(&self, elems: &[Idx]) -> Result<Idx, TypeDefError> {
        if elems.is_empty() || elems.len() > MAX_TUPLE_ARITY {
            return Err(TypeDefError::TupleArity { arity: elems.len() });
        }
        for &elem in elems {
            self.entry(elem)?;
        }
        let elems: TupleElems = SmallVec::from_slice(elems);
        Ok(self.intern(
            StructuralKey::Tuple(elems),
            TypeFlags::IS_CONTAINER | TypeFlags::IS_SEALED | TypeFlags::IS_DEFINED,
        ))
    }

    /// Nullable value type `inner?`.
    ///
    /// `inner` must be a defined value type that is not itself nullable.
    pub fn nullable(&self, inner: Idx) -> Result<Idx, TypeDefError> {
        let entry = self.entry(inner)?;
        if !entry.flags.is_value_type() || matches!(entry.data, TypeData::Nullable(_)) {
            return Err(TypeDefError::NullableOfReference {
                inner: self.display(inner),
            });
        }
        if !entry.flags.is_defined() {
            return Err(TypeDefError::UndefinedDependency {
                name: format!("{}?", self.display(inner)),
                dependency: self.display(inner),
            });
        }
        let mut flags = TypeFlags::IS_VALUE_TYPE | TypeFlags::IS_SEALED | TypeFlags::IS_DEFINED;
        if entry.flags.is_simple() {
            flags |= TypeFlags::IS_SIMPLE;
        }
        Ok(self.intern(StructuralKey::Nullable(inner), flags))
    }

    fn collection_flags() -> TypeFlags {
        TypeFlags::IS_CONTAINER
            | TypeFlags::IS_SEALED
            | TypeFlags::IS_DEFINED
            | TypeFlags::HAS_DEFAULT_CTOR
    }

    fn intern(&self, key: StructuralKey, flags: TypeFlags) -> Idx {
        // Fast path: already interned
        if let Some(&idx) = self.inner.read().structural.get(&key) {
            return idx;
        }

        let mut inner = self.inner.write();
        // Double-check after acquiring write lock
        if let Some(&idx) = inner.structural.get(&key) {
            return idx;
        }
        let idx = inner.push(key.to_data(), flags);
        inner.structural.insert(key, idx);
        idx
    }

    // === Nominal Types ===

    /// Define an enumeration backed by an integral primitive.
    pub fn enumeration(&self, name: &str, underlying: Primitive) -> Result<Idx, TypeDefError> {
        if !underlying.is_integral() {
            return Err(TypeDefError::EnumUnderlying {
                name: name.to_owned(),
            });
        }
        let name: Arc<str> = Arc::from(name);
        let data = TypeData::Enum(EnumDef {
            name: Arc::clone(&name),
            underlying,
        });
        self.register_named(
            name,
            data,
            TypeFlags::IS_VALUE_TYPE
                | TypeFlags::IS_NOMINAL
                | TypeFlags::IS_SIMPLE
                | TypeFlags::IS_SEALED
                | TypeFlags::IS_DEFINED,
        )
    }

    /// Define an interface.
    pub fn interface(&self, name: &str) -> Result<Idx, TypeDefError> {
        let name: Arc<str> = Arc::from(name);
        let data = TypeData::Interface {
            name: Arc::clone(&name),
        };
        self.register_named(
            name,
            data,
            TypeFlags::IS_NOMINAL
                | TypeFlags::IS_INTERFACE
                | TypeFlags::IS_ABSTRACT
                | TypeFlags::IS_DEFINED,
        )
    }

    /// Forward-declare a class so other types can refer to it before it is defined.
    pub fn declare_class(&self, name: &str) -> Result<Idx, TypeDefError> {
        self.declare(name, DeclaredKind::Class)
    }

    /// Start defining a new class. Its index is reserved immediately.
    pub fn class(&self, name: &str) -> Result<ClassBuilder<'_>, TypeDefError> {
        let idx = self.declare(name, DeclaredKind::Class)?;
        Ok(ClassBuilder::new(self, idx, Arc::from(name)))
    }

    /// Define a class that was forward-declared with [`TypePool::declare_class`].
    pub fn class_for(&self, idx: Idx) -> Result<ClassBuilder<'_>, TypeDefError> {
        let name = self.expect_declared(idx, DeclaredKind::Class)?;
        Ok(ClassBuilder::new(self, idx, name))
    }

    /// Start defining a new struct. Its index is reserved immediately.
    pub fn structure(&self, name: &str) -> Result<StructBuilder<'_>, TypeDefError> {
        let idx = self.declare(name, DeclaredKind::Struct)?;
        Ok(StructBuilder::new(self, idx, Arc::from(name)))
    }

    fn declare(&self, name: &str, kind: DeclaredKind) -> Result<Idx, TypeDefError> {
        let name: Arc<str> = Arc::from(name);
        let data = TypeData::Declared {
            name: Arc::clone(&name),
            kind,
        };
        let mut flags = TypeFlags::IS_NOMINAL;
        if kind == DeclaredKind::Struct {
            flags |= TypeFlags::IS_VALUE_TYPE;
        }
        self.register_named(name, data, flags)
    }

    fn register_named(
        &self,
        name: Arc<str>,
        data: TypeData,
        flags: TypeFlags,
    ) -> Result<Idx, TypeDefError> {
        let mut inner = self.inner.write();
        if inner.by_name.contains_key(&name) {
            return Err(TypeDefError::DuplicateName {
                name: name.to_string(),
            });
        }
        let idx = inner.push(data, flags);
        inner.by_name.insert(Arc::clone(&name), idx);
        tracing::trace!(ty = %name, idx = idx.raw(), "registered nominal type");
        Ok(idx)
    }

    /// Check that `idx` is a pending declaration of `kind` and return its name.
    fn expect_declared(&self, idx: Idx, kind: DeclaredKind) -> Result<Arc<str>, TypeDefError> {
        let entry = self.entry(idx)?;
        match &entry.data {
            TypeData::Declared {
                name,
                kind: declared,
            } if *declared == kind => Ok(Arc::clone(name)),
            TypeData::Declared {
                name,
                kind: declared,
            } => Err(TypeDefError::KindMismatch {
                name: name.to_string(),
                expected: *declared,
                found: kind,
            }),
            _ => Err(TypeDefError::AlreadyDefined {
                name: self.display(idx),
            }),
        }
    }

    /// Publish the definition of a declared type.
    fn publish(
        &self,
        idx: Idx,
        kind: DeclaredKind,
        data: TypeData,
        flags: TypeFlags,
    ) -> Result<(), TypeDefError> {
        let mut inner = self.inner.write();
        // Another builder may have defined the same declaration meanwhile.
        match inner.get(idx).map(|e| &e.data) {
            Some(TypeData::Declared { kind: declared, .. }) if *declared == kind => {}
            Some(_) => {
                return Err(TypeDefError::AlreadyDefined {
                    name: data.nominal_name().map(ToString::to_string).unwrap_or_default(),
                })
            }
            None => return Err(TypeDefError::UnknownType { idx }),
        }
        inner.replace(idx, data, flags);
        Ok(())
    }

    // === Relations ===

    /// Check if a value whose runtime type is `actual` may be stored where
    /// `declared` is expected.
    pub fn is_assignable(&self, actual: Idx, declared: Idx) -> bool {
        if actual == declared || declared == Idx::ANY {
            return true;
        }
        let Some(declared_entry) = self.get(declared) else {
            return false;
        };
        match &declared_entry.data {
            TypeData::Nullable(inner) => *inner == actual,
            TypeData::Class(_) => self.ancestors(actual).any(|a| a == declared),
            TypeData::Interface { .. } => self.ancestors(actual).any(|a| {
                self.get(a).is_some_and(|e| match &e.data {
                    TypeData::Class(def) => def.interfaces.contains(&declared),
                    _ => false,
                })
            }),
            _ => false,
        }
    }

    /// `idx` followed by its base classes, most-derived first.
    pub fn ancestors(&self, idx: Idx) -> impl Iterator<Item = Idx> + '_ {
        std::iter::successors(Some(idx), move |&current| {
            self.get(current).and_then(|e| match &e.data {
                TypeData::Class(def) => def.base,
                _ => None,
            })
        })
    }
}

impl Default for TypePool {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TypePool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypePool").field("len", &self.len()).finish()
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap for concise assertions"
)]
mod tests;
