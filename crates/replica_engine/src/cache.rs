//! Process-wide plan cache.
//!
//! Two concurrent maps keyed by type: primary plans, and redirect entries
//! used when a value's runtime type differs from the type it was reached
//! through.
//!
//! # Publication
//!
//! Lookup is a shard read. On a miss the plan is built with no lock held,
//! then published with `entry().or_insert()`. Two threads may build the
//! same plan; only the first published one is ever returned, so every
//! caller sees a single plan per type.

use std::sync::Arc;

use dashmap::DashMap;
use replica_types::Idx;
use rustc_hash::FxBuildHasher;

use crate::error::CloneResult;
use crate::plan::Plan;

pub(crate) struct PlanCache {
    plans: DashMap<Idx, Plan, FxBuildHasher>,
    redirects: DashMap<Idx, Plan, FxBuildHasher>,
}

impl PlanCache {
    pub(crate) fn new() -> Self {
        Self {
            plans: DashMap::with_hasher(FxBuildHasher),
            redirects: DashMap::with_hasher(FxBuildHasher),
        }
    }

    pub(crate) fn plan(
        &self,
        ty: Idx,
        build: impl FnOnce() -> CloneResult<Plan>,
    ) -> CloneResult<Plan> {
        get_or_build(&self.plans, ty, build)
    }

    pub(crate) fn redirect(
        &self,
        actual: Idx,
        build: impl FnOnce() -> CloneResult<Plan>,
    ) -> CloneResult<Plan> {
        get_or_build(&self.redirects, actual, build)
    }

    /// Types with a published primary plan.
    pub(crate) fn compiled(&self) -> Vec<Idx> {
        self.plans.iter().map(|entry| *entry.key()).collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.plans.len()
    }
}

fn get_or_build(
    map: &DashMap<Idx, Plan, FxBuildHasher>,
    ty: Idx,
    build: impl FnOnce() -> CloneResult<Plan>,
) -> CloneResult<Plan> {
    // Fast path: already published
    if let Some(plan) = map.get(&ty) {
        return Ok(Arc::clone(plan.value()));
    }

    // Slow path: build outside any shard lock; building may consult the
    // cache again (a redirect entry wraps its type's primary plan).
    let built = build()?;

    // First publisher wins.
    let published = map.entry(ty).or_insert(built);
    Ok(Arc::clone(published.value()))
}
