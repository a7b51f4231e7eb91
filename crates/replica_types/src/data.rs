//! Type definitions stored in the pool.

use std::fmt;
use std::sync::Arc;

use smallvec::SmallVec;

use crate::Idx;

/// Built-in scalar kinds.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Primitive {
    Bool,
    Char,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    Decimal,
    DateTime,
    Guid,
}

impl Primitive {
    /// All primitives, in pre-interned index order.
    pub const ALL: [Primitive; 15] = [
        Primitive::Bool,
        Primitive::Char,
        Primitive::I8,
        Primitive::I16,
        Primitive::I32,
        Primitive::I64,
        Primitive::U8,
        Primitive::U16,
        Primitive::U32,
        Primitive::U64,
        Primitive::F32,
        Primitive::F64,
        Primitive::Decimal,
        Primitive::DateTime,
        Primitive::Guid,
    ];

    /// The pre-interned index of this primitive.
    pub const fn idx(self) -> Idx {
        match self {
            Primitive::Bool => Idx::BOOL,
            Primitive::Char => Idx::CHAR,
            Primitive::I8 => Idx::I8,
            Primitive::I16 => Idx::I16,
            Primitive::I32 => Idx::I32,
            Primitive::I64 => Idx::I64,
            Primitive::U8 => Idx::U8,
            Primitive::U16 => Idx::U16,
            Primitive::U32 => Idx::U32,
            Primitive::U64 => Idx::U64,
            Primitive::F32 => Idx::F32,
            Primitive::F64 => Idx::F64,
            Primitive::Decimal => Idx::DECIMAL,
            Primitive::DateTime => Idx::DATE_TIME,
            Primitive::Guid => Idx::GUID,
        }
    }

    /// The primitive named by a pre-interned index, if any.
    pub fn from_idx(idx: Idx) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.idx() == idx)
    }

    /// Integral primitives can back an enumeration.
    pub const fn is_integral(self) -> bool {
        matches!(
            self,
            Primitive::I8
                | Primitive::I16
                | Primitive::I32
                | Primitive::I64
                | Primitive::U8
                | Primitive::U16
                | Primitive::U32
                | Primitive::U64
        )
    }
}

/// How a field may be written once its object exists.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum FieldAccess {
    /// Freely assignable.
    #[default]
    ReadWrite,
    /// Assigned only during construction (get-only / private-set backing field).
    ReadOnly,
    /// Assigned only by object initializers (`init` accessor backing field).
    InitOnly,
}

impl FieldAccess {
    /// Check if the field accepts writes after construction.
    #[inline]
    pub const fn is_writable(self) -> bool {
        matches!(self, FieldAccess::ReadWrite)
    }
}

/// An instance field as declared on a class or struct.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FieldDef {
    pub name: Arc<str>,
    pub ty: Idx,
    pub access: FieldAccess,
}

/// A static field as declared on a class.
///
/// A read-only static whose type is the declaring class itself is a
/// singleton: a canonical instance of that class.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct StaticDef {
    pub name: Arc<str>,
    pub ty: Idx,
    pub readonly: bool,
}

/// How a fresh instance of a class can be obtained.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum Construction {
    /// A parameterless constructor exists; it default-initializes every field.
    #[default]
    Parameterless,
    /// No parameterless constructor, but a shallow member-wise copy is allowed.
    MemberwiseOnly,
    /// Neither; instances can only come from outside (native handles and the like).
    Opaque,
}

/// A slot in a flattened instance layout.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FieldSlot {
    /// Type that declared the field (the class itself or one of its ancestors).
    pub owner: Idx,
    pub name: Arc<str>,
    pub ty: Idx,
    pub access: FieldAccess,
}

/// Flattened instance layout: ancestor fields first, root-most ancestor first.
pub type Layout = Arc<[FieldSlot]>;

/// Find the slot of a field by name.
///
/// Searches from the most-derived end so hidden base fields lose to the
/// derived field of the same name.
pub fn slot_of(layout: &[FieldSlot], name: &str) -> Option<usize> {
    layout.iter().rposition(|slot| &*slot.name == name)
}

/// Class definition.
#[derive(Clone, Debug)]
pub struct ClassDef {
    pub name: Arc<str>,
    pub base: Option<Idx>,
    pub interfaces: Vec<Idx>,
    pub fields: Vec<FieldDef>,
    pub statics: Vec<StaticDef>,
    pub construction: Construction,
    pub is_abstract: bool,
    pub is_sealed: bool,
    pub layout: Layout,
}

impl ClassDef {
    /// Static slots holding canonical instances of `this`.
    pub fn singleton_slots(&self, this: Idx) -> Vec<usize> {
        self.statics
            .iter()
            .enumerate()
            .filter(|(_, s)| s.readonly && s.ty == this)
            .map(|(i, _)| i)
            .collect()
    }
}

/// Struct (user value type) definition.
#[derive(Clone, Debug)]
pub struct StructDef {
    pub name: Arc<str>,
    pub fields: Vec<FieldDef>,
    pub layout: Layout,
}

/// Enumeration definition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnumDef {
    pub name: Arc<str>,
    pub underlying: Primitive,
}

/// The kind a forward declaration promises.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DeclaredKind {
    Class,
    Struct,
    Interface,
}

impl fmt::Display for DeclaredKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeclaredKind::Class => f.write_str("class"),
            DeclaredKind::Struct => f.write_str("struct"),
            DeclaredKind::Interface => f.write_str("interface"),
        }
    }
}

/// Component types of a tuple.
pub type TupleElems = SmallVec<[Idx; 4]>;

/// Everything the pool knows about one type.
#[derive(Clone, Debug)]
pub enum TypeData {
    /// The universal top type.
    Any,
    Primitive(Primitive),
    Str,
    Enum(EnumDef),
    Struct(StructDef),
    Class(ClassDef),
    Interface { name: Arc<str> },
    /// Value type that may also hold null.
    Nullable(Idx),
    Array { elem: Idx, rank: u8 },
    List(Idx),
    Set(Idx),
    Map { key: Idx, value: Idx },
    Tuple(TupleElems),
    /// Forward declaration awaiting its definition.
    Declared { name: Arc<str>, kind: DeclaredKind },
}

impl TypeData {
    /// Nominal name, for types declared by name.
    pub fn nominal_name(&self) -> Option<&Arc<str>> {
        match self {
            TypeData::Enum(def) => Some(&def.name),
            TypeData::Struct(def) => Some(&def.name),
            TypeData::Class(def) => Some(&def.name),
            TypeData::Interface { name } | TypeData::Declared { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Instance layout of classes and structs.
    pub fn layout(&self) -> Option<&Layout> {
        match self {
            TypeData::Class(def) => Some(&def.layout),
            TypeData::Struct(def) => Some(&def.layout),
            _ => None,
        }
    }
}

/// Key under which structural types are interned.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) enum StructuralKey {
    Nullable(Idx),
    Array(Idx, u8),
    List(Idx),
    Set(Idx),
    Map(Idx, Idx),
    Tuple(TupleElems),
}

impl StructuralKey {
    pub(crate) fn to_data(&self) -> TypeData {
        match self {
            StructuralKey::Nullable(inner) => TypeData::Nullable(*inner),
            StructuralKey::Array(elem, rank) => TypeData::Array {
                elem: *elem,
                rank: *rank,
            },
            StructuralKey::List(elem) => TypeData::List(*elem),
            StructuralKey::Set(elem) => TypeData::Set(*elem),
            StructuralKey::Map(key, value) => TypeData::Map {
                key: *key,
                value: *value,
            },
            StructuralKey::Tuple(elems) => TypeData::Tuple(elems.clone()),
        }
    }
}
