//! Values stored in heap slots, statics and struct fields.
//!
//! Scalars, strings and structs live inline in a `Value`; everything with
//! reference identity lives in the heap arena and is named by an [`ObjRef`].
//!
//! # Equality
//!
//! `Value` equality is the key equality of sets and maps: scalars and
//! strings compare by content, floats by bit pattern, structs field-wise,
//! references by identity. Structural equality of whole graphs is
//! [`Heap::graph_eq`](crate::Heap::graph_eq).

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use replica_types::Idx;
use uuid::Uuid;

/// Handle to an object in a [`Heap`](crate::Heap).
///
/// Two handles are the same reference iff they are equal.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct ObjRef(u32);

impl ObjRef {
    #[inline]
    pub(crate) const fn from_slot(slot: usize) -> Self {
        #[expect(
            clippy::cast_possible_truncation,
            reason = "the heap refuses to grow past u32::MAX objects"
        )]
        let raw = slot as u32;
        Self(raw)
    }

    #[inline]
    pub(crate) const fn slot(self) -> usize {
        self.0 as usize
    }

    /// Handle from a raw slot number. Nothing checks that the slot is live.
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Raw arena slot, for diagnostics.
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for ObjRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Immutable shared string.
///
/// Cloning a `Str` shares the allocation; [`Str::deep_copy`] does not.
#[derive(Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct Str(Arc<str>);

impl Str {
    pub fn new(s: &str) -> Self {
        Str(Arc::from(s))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check if two strings share one allocation.
    #[inline]
    pub fn ptr_eq(a: &Str, b: &Str) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }

    /// A value-equal string with its own allocation.
    pub fn deep_copy(&self) -> Str {
        Str(Arc::from(&*self.0))
    }
}

impl fmt::Debug for Str {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

impl fmt::Display for Str {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Str {
    fn from(s: &str) -> Self {
        Str::new(s)
    }
}

impl From<String> for Str {
    fn from(s: String) -> Self {
        Str(Arc::from(s))
    }
}

/// Fixed-point decimal: `mantissa * 10^-scale`.
///
/// Storage only; the engine never does arithmetic on it.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct Decimal {
    mantissa: i128,
    scale: u8,
}

impl Decimal {
    /// Largest scale accepted (28 fractional digits).
    pub const MAX_SCALE: u8 = 28;

    pub fn new(mantissa: i128, scale: u8) -> Self {
        Self {
            mantissa,
            scale: scale.min(Self::MAX_SCALE),
        }
    }

    pub const fn mantissa(self) -> i128 {
        self.mantissa
    }

    pub const fn scale(self) -> u8 {
        self.scale
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.scale == 0 {
            return write!(f, "{}", self.mantissa);
        }
        let divisor = 10_i128.pow(u32::from(self.scale));
        let sign = if self.mantissa < 0 { "-" } else { "" };
        let abs = self.mantissa.unsigned_abs();
        let divisor = divisor.unsigned_abs();
        write!(
            f,
            "{sign}{}.{:0width$}",
            abs / divisor,
            abs % divisor,
            width = usize::from(self.scale)
        )
    }
}

/// Inline value of a user struct, in layout order.
#[derive(Clone, Debug)]
pub struct StructValue {
    ty: Idx,
    fields: Vec<Value>,
}

impl StructValue {
    /// Build a struct value from raw slots, bypassing field validation.
    ///
    /// Use [`Heap::new_struct`](crate::Heap::new_struct) for checked construction.
    pub fn from_slots(ty: Idx, fields: Vec<Value>) -> Self {
        Self { ty, fields }
    }

    #[inline]
    pub fn ty(&self) -> Idx {
        self.ty
    }

    #[inline]
    pub fn fields(&self) -> &[Value] {
        &self.fields
    }

    pub fn slot(&self, slot: usize) -> Option<&Value> {
        self.fields.get(slot)
    }

    /// Overwrite a slot directly. Returns `false` if the slot does not exist.
    pub fn write_slot(&mut self, slot: usize, value: Value) -> bool {
        match self.fields.get_mut(slot) {
            Some(dst) => {
                *dst = value;
                true
            }
            None => false,
        }
    }
}

impl PartialEq for StructValue {
    fn eq(&self, other: &Self) -> bool {
        self.ty == other.ty && self.fields == other.fields
    }
}

impl Eq for StructValue {}

impl Hash for StructValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.ty.hash(state);
        for v in &self.fields {
            v.hash(state);
        }
    }
}

/// A value in a slot.
#[derive(Clone, Default)]
pub enum Value {
    /// The absent reference (or an empty nullable).
    #[default]
    Null,
    Bool(bool),
    Char(char),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    Decimal(Decimal),
    DateTime(DateTime<Utc>),
    Guid(Uuid),
    /// Enumeration member, stored as its underlying integral value.
    Enum { ty: Idx, raw: i64 },
    Str(Str),
    Struct(StructValue),
    Ref(ObjRef),
}

impl Value {
    /// Create a string value.
    #[inline]
    pub fn string(s: &str) -> Self {
        Value::Str(Str::new(s))
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_obj(&self) -> Option<ObjRef> {
        match self {
            Value::Ref(r) => Some(*r),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&Str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_struct(&self) -> Option<&StructValue> {
        match self {
            Value::Struct(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Value::I8(n) => Some(i64::from(n)),
            Value::I16(n) => Some(i64::from(n)),
            Value::I32(n) => Some(i64::from(n)),
            Value::I64(n) => Some(n),
            Value::U8(n) => Some(i64::from(n)),
            Value::U16(n) => Some(i64::from(n)),
            Value::U32(n) => Some(i64::from(n)),
            Value::U64(n) => i64::try_from(n).ok(),
            _ => None,
        }
    }

    /// Runtime type of an inline value.
    ///
    /// `None` for `Null` and for references, whose type lives on the heap.
    pub fn inline_type(&self) -> Option<Idx> {
        Some(match self {
            Value::Null | Value::Ref(_) => return None,
            Value::Bool(_) => Idx::BOOL,
            Value::Char(_) => Idx::CHAR,
            Value::I8(_) => Idx::I8,
            Value::I16(_) => Idx::I16,
            Value::I32(_) => Idx::I32,
            Value::I64(_) => Idx::I64,
            Value::U8(_) => Idx::U8,
            Value::U16(_) => Idx::U16,
            Value::U32(_) => Idx::U32,
            Value::U64(_) => Idx::U64,
            Value::F32(_) => Idx::F32,
            Value::F64(_) => Idx::F64,
            Value::Decimal(_) => Idx::DECIMAL,
            Value::DateTime(_) => Idx::DATE_TIME,
            Value::Guid(_) => Idx::GUID,
            Value::Enum { ty, .. } => *ty,
            Value::Str(_) => Idx::STR,
            Value::Struct(s) => s.ty,
        })
    }

    /// Short kind name for error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Char(_) => "char",
            Value::I8(_) => "sbyte",
            Value::I16(_) => "short",
            Value::I32(_) => "int",
            Value::I64(_) => "long",
            Value::U8(_) => "byte",
            Value::U16(_) => "ushort",
            Value::U32(_) => "uint",
            Value::U64(_) => "ulong",
            Value::F32(_) => "float",
            Value::F64(_) => "double",
            Value::Decimal(_) => "decimal",
            Value::DateTime(_) => "DateTime",
            Value::Guid(_) => "Guid",
            Value::Enum { .. } => "enum",
            Value::Str(_) => "string",
            Value::Struct(_) => "struct",
            Value::Ref(_) => "reference",
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::I8(a), Value::I8(b)) => a == b,
            (Value::I16(a), Value::I16(b)) => a == b,
            (Value::I32(a), Value::I32(b)) => a == b,
            (Value::I64(a), Value::I64(b)) => a == b,
            (Value::U8(a), Value::U8(b)) => a == b,
            (Value::U16(a), Value::U16(b)) => a == b,
            (Value::U32(a), Value::U32(b)) => a == b,
            (Value::U64(a), Value::U64(b)) => a == b,
            // Bit equality keeps Eq and Hash consistent (NaN == NaN, 0.0 != -0.0)
            (Value::F32(a), Value::F32(b)) => a.to_bits() == b.to_bits(),
            (Value::F64(a), Value::F64(b)) => a.to_bits() == b.to_bits(),
            (Value::Decimal(a), Value::Decimal(b)) => a == b,
            (Value::DateTime(a), Value::DateTime(b)) => a == b,
            (Value::Guid(a), Value::Guid(b)) => a == b,
            (Value::Enum { ty: t1, raw: r1 }, Value::Enum { ty: t2, raw: r2 }) => {
                t1 == t2 && r1 == r2
            }
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Struct(a), Value::Struct(b)) => a == b,
            (Value::Ref(a), Value::Ref(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Null => {}
            Value::Bool(b) => b.hash(state),
            Value::Char(c) => c.hash(state),
            Value::I8(n) => n.hash(state),
            Value::I16(n) => n.hash(state),
            Value::I32(n) => n.hash(state),
            Value::I64(n) => n.hash(state),
            Value::U8(n) => n.hash(state),
            Value::U16(n) => n.hash(state),
            Value::U32(n) => n.hash(state),
            Value::U64(n) => n.hash(state),
            Value::F32(f) => f.to_bits().hash(state),
            Value::F64(f) => f.to_bits().hash(state),
            Value::Decimal(d) => d.hash(state),
            Value::DateTime(t) => t.hash(state),
            Value::Guid(g) => g.hash(state),
            Value::Enum { ty, raw } => {
                ty.hash(state);
                raw.hash(state);
            }
            Value::Str(s) => s.hash(state),
            Value::Struct(s) => s.hash(state),
            Value::Ref(r) => r.hash(state),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Char(c) => write!(f, "{c:?}"),
            Value::I8(n) => write!(f, "{n}i8"),
            Value::I16(n) => write!(f, "{n}i16"),
            Value::I32(n) => write!(f, "{n}"),
            Value::I64(n) => write!(f, "{n}L"),
            Value::U8(n) => write!(f, "{n}u8"),
            Value::U16(n) => write!(f, "{n}u16"),
            Value::U32(n) => write!(f, "{n}u"),
            Value::U64(n) => write!(f, "{n}UL"),
            Value::F32(x) => write!(f, "{x}f"),
            Value::F64(x) => write!(f, "{x}d"),
            Value::Decimal(d) => write!(f, "{d}m"),
            Value::DateTime(t) => write!(f, "{t}"),
            Value::Guid(g) => write!(f, "{g}"),
            Value::Enum { ty, raw } => write!(f, "{ty:?}::{raw}"),
            Value::Str(s) => write!(f, "{s:?}"),
            Value::Struct(s) => f
                .debug_struct("Struct")
                .field("ty", &s.ty)
                .field("fields", &s.fields)
                .finish(),
            Value::Ref(r) => write!(f, "{r:?}"),
        }
    }
}

macro_rules! impl_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                #[inline]
                fn from(v: $ty) -> Self {
                    Value::$variant(v)
                }
            }
        )*
    };
}

impl_from! {
    bool => Bool,
    char => Char,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    f32 => F32,
    f64 => F64,
    Decimal => Decimal,
    DateTime<Utc> => DateTime,
    Uuid => Guid,
    Str => Str,
    StructValue => Struct,
    ObjRef => Ref,
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::hash_map::DefaultHasher;

    use super::*;

    fn hash_of(v: &Value) -> u64 {
        let mut h = DefaultHasher::new();
        v.hash(&mut h);
        h.finish()
    }

    #[test]
    fn str_identity_vs_content() {
        let a = Str::new("abc");
        let shared = a.clone();
        let copied = a.deep_copy();
        assert!(Str::ptr_eq(&a, &shared));
        assert!(!Str::ptr_eq(&a, &copied));
        assert_eq!(a, copied);
    }

    #[test]
    fn floats_compare_by_bits() {
        let nan = Value::F64(f64::NAN);
        assert_eq!(nan, nan.clone());
        assert_eq!(hash_of(&nan), hash_of(&Value::F64(f64::NAN)));
        assert_ne!(Value::F64(0.0), Value::F64(-0.0));
    }

    #[test]
    fn refs_compare_by_identity() {
        assert_eq!(Value::Ref(ObjRef(3)), Value::Ref(ObjRef(3)));
        assert_ne!(Value::Ref(ObjRef(3)), Value::Ref(ObjRef(4)));
    }

    #[test]
    fn decimal_display() {
        assert_eq!(Decimal::new(150, 2).to_string(), "1.50");
        assert_eq!(Decimal::new(-5, 1).to_string(), "-0.5");
        assert_eq!(Decimal::new(42, 0).to_string(), "42");
    }

    #[test]
    fn inline_types() {
        assert_eq!(Value::from(1_i32).inline_type(), Some(Idx::I32));
        assert_eq!(Value::from("x").inline_type(), Some(Idx::STR));
        assert_eq!(Value::Null.inline_type(), None);
        assert_eq!(Value::Ref(ObjRef(0)).inline_type(), None);
    }
}
