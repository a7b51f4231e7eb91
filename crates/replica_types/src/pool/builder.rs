//! Builders for classes and structs.
//!
//! A builder holds the reserved index of its type, so field types may
//! refer to the type being defined (a class with a `Self`-typed field).
//! Nothing is validated until [`ClassBuilder::define`] runs.

use std::sync::Arc;

use rustc_hash::FxHashSet;

use crate::data::{
    ClassDef, Construction, DeclaredKind, FieldAccess, FieldDef, FieldSlot, StaticDef, StructDef,
    TypeData,
};
use crate::error::TypeDefError;
use crate::flags::TypeFlags;
use crate::Idx;

use super::TypePool;

/// Pending class definition.
#[must_use = "a class is only defined once `define` is called"]
pub struct ClassBuilder<'p> {
    pool: &'p TypePool,
    idx: Idx,
    name: Arc<str>,
    base: Option<Idx>,
    interfaces: Vec<Idx>,
    fields: Vec<FieldDef>,
    statics: Vec<StaticDef>,
    construction: Construction,
    is_abstract: bool,
    is_sealed: bool,
}

impl<'p> ClassBuilder<'p> {
    pub(super) fn new(pool: &'p TypePool, idx: Idx, name: Arc<str>) -> Self {
        Self {
            pool,
            idx,
            name,
            base: None,
            interfaces: Vec::new(),
            fields: Vec::new(),
            statics: Vec::new(),
            construction: Construction::default(),
            is_abstract: false,
            is_sealed: false,
        }
    }

    /// The index reserved for this class.
    pub fn idx(&self) -> Idx {
        self.idx
    }

    /// Derive from `base`.
    pub fn base(mut self, base: Idx) -> Self {
        self.base = Some(base);
        self
    }

    /// Implement an interface.
    pub fn implements(mut self, iface: Idx) -> Self {
        self.interfaces.push(iface);
        self
    }

    /// Add a read-write instance field.
    pub fn field(self, name: &str, ty: Idx) -> Self {
        self.field_with(name, ty, FieldAccess::ReadWrite)
    }

    /// Add a field backing a get-only or private-set property.
    pub fn readonly_field(self, name: &str, ty: Idx) -> Self {
        self.field_with(name, ty, FieldAccess::ReadOnly)
    }

    /// Add a field backing an `init` property.
    pub fn init_field(self, name: &str, ty: Idx) -> Self {
        self.field_with(name, ty, FieldAccess::InitOnly)
    }

    pub fn field_with(mut self, name: &str, ty: Idx, access: FieldAccess) -> Self {
        self.fields.push(FieldDef {
            name: Arc::from(name),
            ty,
            access,
        });
        self
    }

    /// Add a mutable static field.
    pub fn static_field(mut self, name: &str, ty: Idx) -> Self {
        self.statics.push(StaticDef {
            name: Arc::from(name),
            ty,
            readonly: false,
        });
        self
    }

    /// Add a write-once static field. When its type is this class, its
    /// value is a singleton of the class.
    pub fn readonly_static(mut self, name: &str, ty: Idx) -> Self {
        self.statics.push(StaticDef {
            name: Arc::from(name),
            ty,
            readonly: true,
        });
        self
    }

    pub fn construction(mut self, construction: Construction) -> Self {
        self.construction = construction;
        self
    }

    pub fn make_abstract(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    pub fn sealed(mut self) -> Self {
        self.is_sealed = true;
        self
    }

    /// Validate and publish the class.
    pub fn define(self) -> Result<Idx, TypeDefError> {
        let pool = self.pool;
        let name = self.name.to_string();

        if self.is_abstract && self.is_sealed {
            return Err(TypeDefError::AbstractSealed { name });
        }

        let mut layout: Vec<FieldSlot> = Vec::new();
        if let Some(base) = self.base {
            let entry = pool.entry(base)?;
            match &entry.data {
                TypeData::Class(def) if def.is_sealed => {
                    return Err(TypeDefError::SealedBase {
                        name,
                        base: pool.display(base),
                    });
                }
                TypeData::Class(def) => layout.extend(def.layout.iter().cloned()),
                TypeData::Declared {
                    kind: DeclaredKind::Class,
                    ..
                } => {
                    return Err(TypeDefError::UndefinedDependency {
                        name,
                        dependency: pool.display(base),
                    });
                }
                _ => {
                    return Err(TypeDefError::BaseNotClass {
                        name,
                        base: pool.display(base),
                    });
                }
            }
        }

        for &iface in &self.interfaces {
            let entry = pool.entry(iface)?;
            if !matches!(entry.data, TypeData::Interface { .. }) {
                return Err(TypeDefError::NotAnInterface {
                    name,
                    iface: pool.display(iface),
                });
            }
        }

        check_fields(pool, &name, &self.fields)?;
        for s in &self.statics {
            pool.entry(s.ty)?;
        }

        layout.extend(self.fields.iter().map(|f| FieldSlot {
            owner: self.idx,
            name: Arc::clone(&f.name),
            ty: f.ty,
            access: f.access,
        }));

        let mut flags = TypeFlags::IS_NOMINAL | TypeFlags::IS_DEFINED;
        if self.is_sealed {
            flags |= TypeFlags::IS_SEALED;
        }
        if self.is_abstract {
            flags |= TypeFlags::IS_ABSTRACT;
        }
        if self.construction == Construction::Parameterless {
            flags |= TypeFlags::HAS_DEFAULT_CTOR;
        }

        let slots = layout.len();
        let def = ClassDef {
            name: self.name,
            base: self.base,
            interfaces: self.interfaces,
            fields: self.fields,
            statics: self.statics,
            construction: self.construction,
            is_abstract: self.is_abstract,
            is_sealed: self.is_sealed,
            layout: layout.into(),
        };
        pool.publish(self.idx, DeclaredKind::Class, TypeData::Class(def), flags)?;
        tracing::debug!(ty = %name, slots, "defined class");
        Ok(self.idx)
    }
}

/// Pending struct definition.
#[must_use = "a struct is only defined once `define` is called"]
pub struct StructBuilder<'p> {
    pool: &'p TypePool,
    idx: Idx,
    name: Arc<str>,
    fields: Vec<FieldDef>,
}

impl<'p> StructBuilder<'p> {
    pub(super) fn new(pool: &'p TypePool, idx: Idx, name: Arc<str>) -> Self {
        Self {
            pool,
            idx,
            name,
            fields: Vec::new(),
        }
    }

    pub fn idx(&self) -> Idx {
        self.idx
    }

    pub fn field(self, name: &str, ty: Idx) -> Self {
        self.field_with(name, ty, FieldAccess::ReadWrite)
    }

    pub fn readonly_field(self, name: &str, ty: Idx) -> Self {
        self.field_with(name, ty, FieldAccess::ReadOnly)
    }

    pub fn init_field(self, name: &str, ty: Idx) -> Self {
        self.field_with(name, ty, FieldAccess::InitOnly)
    }

    pub fn field_with(mut self, name: &str, ty: Idx, access: FieldAccess) -> Self {
        self.fields.push(FieldDef {
            name: Arc::from(name),
            ty,
            access,
        });
        self
    }

    /// Validate and publish the struct.
    ///
    /// Every field type must already be defined. A struct is simple when
    /// every field type is.
    pub fn define(self) -> Result<Idx, TypeDefError> {
        let pool = self.pool;
        let name = self.name.to_string();

        check_fields(pool, &name, &self.fields)?;

        let mut simple = true;
        for field in &self.fields {
            if field.ty == self.idx {
                return Err(TypeDefError::RecursiveValueType {
                    name,
                    field: field.name.to_string(),
                });
            }
            let entry = pool.entry(field.ty)?;
            if entry.flags.is_value_type() && !entry.flags.is_defined() {
                return Err(TypeDefError::UndefinedDependency {
                    name,
                    dependency: pool.display(field.ty),
                });
            }
            simple &= entry.flags.is_simple();
        }

        let mut flags = TypeFlags::IS_VALUE_TYPE
            | TypeFlags::IS_NOMINAL
            | TypeFlags::IS_SEALED
            | TypeFlags::IS_DEFINED
            | TypeFlags::HAS_DEFAULT_CTOR;
        if simple {
            flags |= TypeFlags::IS_SIMPLE;
        }

        let layout: Vec<FieldSlot> = self
            .fields
            .iter()
            .map(|f| FieldSlot {
                owner: self.idx,
                name: Arc::clone(&f.name),
                ty: f.ty,
                access: f.access,
            })
            .collect();
        let def = StructDef {
            name: self.name,
            fields: self.fields,
            layout: layout.into(),
        };
        pool.publish(self.idx, DeclaredKind::Struct, TypeData::Struct(def), flags)?;
        tracing::debug!(ty = %name, simple, "defined struct");
        Ok(self.idx)
    }
}

/// Reject unknown field types and duplicate field names.
fn check_fields(pool: &TypePool, name: &str, fields: &[FieldDef]) -> Result<(), TypeDefError> {
    let mut seen = FxHashSet::default();
    for field in fields {
        if !seen.insert(&*field.name) {
            return Err(TypeDefError::DuplicateField {
                name: name.to_owned(),
                field: field.name.to_string(),
            });
        }
        pool.entry(field.ty)?;
    }
    Ok(())
}
