//! Plan builders, one module per shape.
//!
//! [`compile`] turns a type's pool entry into its primary plan;
//! [`redirect::compile_redirect`] builds the redirect entry for a runtime type.

pub(crate) mod array;
pub(crate) mod collection;
pub(crate) mod object;
pub(crate) mod redirect;
pub(crate) mod scalar;
pub(crate) mod tuple;

use replica_types::{Idx, Shape, TypeData};

use crate::engine::Replicator;
use crate::error::{CloneError, CloneResult};
use crate::plan::Plan;

/// Build the primary plan of `ty`.
pub(crate) fn compile(replicator: &Replicator, ty: Idx) -> CloneResult<Plan> {
    let pool = replicator.pool();
    let entry = pool.entry(ty)?;
    let unsupported = || CloneError::UnsupportedType {
        ty: pool.display(ty),
    };
    if !entry.flags.is_defined() {
        return Err(unsupported());
    }

    let plan = match (entry.shape, &entry.data) {
        (Shape::Scalar, _) => scalar::identity(),
        (Shape::String, _) => scalar::string(ty),
        (Shape::Array1D, TypeData::Array { elem, .. }) => array::one_dimensional(pool, ty, *elem),
        (Shape::ArrayND, TypeData::Array { elem, rank }) => {
            array::multi_dimensional(pool, ty, *elem, usize::from(*rank))
        }
        (Shape::ListOrSet, TypeData::List(elem)) => collection::list(pool, ty, *elem),
        (Shape::ListOrSet, TypeData::Set(elem)) => collection::set(pool, ty, *elem),
        (Shape::Map, TypeData::Map { key, value }) => collection::map(pool, ty, *key, *value),
        (Shape::Tuple, TypeData::Tuple(elems)) => tuple::tuple(pool, ty, elems),
        (Shape::Object, TypeData::Class(def)) => object::class(pool, ty, def, entry.flags)?,
        (Shape::Object, TypeData::Struct(def)) => object::structure(pool, ty, def),
        (Shape::Object, TypeData::Nullable(inner)) => object::nullable(pool, *inner),
        (Shape::AbstractOrInterface, _) => redirect::always(ty),
        _ => return Err(unsupported()),
    };

    tracing::debug!(ty = %pool.display(ty), shape = ?entry.shape, "compiled clone plan");
    Ok(plan)
}
