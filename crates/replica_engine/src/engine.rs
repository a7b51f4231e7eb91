//! The replicator: plan cache plus the top-level copy entry points.

use std::fmt;
use std::sync::{Arc, LazyLock};

use replica_heap::{Heap, Value};
use replica_types::{Idx, TypePool};

use crate::cache::PlanCache;
use crate::cloners;
use crate::context::CloneCx;
use crate::error::{CloneError, CloneResult};
use crate::options::CloneOptions;
use crate::plan::Plan;

static GLOBAL: LazyLock<Replicator> = LazyLock::new(|| Replicator::new(Arc::new(TypePool::new())));

/// Deep-clone engine bound to one type pool.
///
/// Plans are compiled on first use and shared by every later call, on
/// every thread. Each call gets its own identity map.
pub struct Replicator {
    pool: Arc<TypePool>,
    cache: PlanCache,
}

impl Replicator {
    pub fn new(pool: Arc<TypePool>) -> Self {
        Self {
            pool,
            cache: PlanCache::new(),
        }
    }

    /// The process-wide replicator and its pool.
    pub fn global() -> &'static Replicator {
        &GLOBAL
    }

    #[inline]
    pub fn pool(&self) -> &TypePool {
        &self.pool
    }

    /// An empty heap bound to this replicator's pool.
    pub fn new_heap(&self) -> Heap {
        Heap::new(Arc::clone(&self.pool))
    }

    /// The primary plan of `ty`, compiled on first request.
    pub fn plan(&self, ty: Idx) -> CloneResult<Plan> {
        self.cache.plan(ty, || cloners::compile(self, ty))
    }

    /// The redirect entry of runtime type `actual`.
    pub(crate) fn redirect(&self, actual: Idx) -> CloneResult<Plan> {
        self.cache
            .redirect(actual, || cloners::redirect::compile_redirect(self, actual))
    }

    /// Deep-clone `value`, reached through its own runtime type.
    ///
    /// Null clones to null. `None` options mean the defaults.
    pub fn copy(
        &self,
        heap: &mut Heap,
        value: &Value,
        options: Option<&CloneOptions>,
    ) -> CloneResult<Value> {
        self.check_heap(heap)?;
        let Some(ty) = heap.type_of_value(value)? else {
            return Ok(Value::Null);
        };
        self.run(heap, value, ty, options)
    }

    /// Deep-clone `value`, reached through the static type `declared`.
    ///
    /// The value's runtime type must be assignable to `declared`; when the
    /// two differ the clone is redirected to the runtime type's plan.
    pub fn copy_as(
        &self,
        heap: &mut Heap,
        value: &Value,
        declared: Idx,
        options: Option<&CloneOptions>,
    ) -> CloneResult<Value> {
        self.check_heap(heap)?;
        let Some(actual) = heap.type_of_value(value)? else {
            return Ok(Value::Null);
        };
        if !self.pool.is_assignable(actual, declared) {
            return Err(CloneError::RedirectResolution {
                declared: self.pool.display(declared),
                actual: self.pool.display(actual),
            });
        }
        self.run(heap, value, declared, options)
    }

    fn check_heap(&self, heap: &Heap) -> CloneResult<()> {
        if Arc::ptr_eq(heap.pool(), &self.pool) {
            Ok(())
        } else {
            Err(CloneError::ForeignHeap)
        }
    }

    fn run(
        &self,
        heap: &mut Heap,
        value: &Value,
        declared: Idx,
        options: Option<&CloneOptions>,
    ) -> CloneResult<Value> {
        let options = match options {
            Some(options) => options,
            None => CloneOptions::none(),
        };
        let plan = self.plan(declared)?;
        let mark = heap.len();

        let (result, cloned) = {
            let mut cx = CloneCx::new(self, heap, options);
            let result = plan(value, &mut cx);
            (result, cx.identity.cloned())
        };

        match result {
            Ok(value) => {
                tracing::debug!(
                    ty = %self.pool.display(declared),
                    objects = cloned,
                    "deep copy complete"
                );
                Ok(value)
            }
            Err(err) => {
                // Drop the partial graph.
                heap.truncate(mark);
                Err(err)
            }
        }
    }

    /// Display names of every type with a compiled primary plan, sorted.
    pub fn compiled_types(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .cache
            .compiled()
            .into_iter()
            .map(|ty| self.pool.display(ty))
            .collect();
        names.sort_unstable();
        names
    }

    /// Number of compiled primary plans.
    pub fn compiled_count(&self) -> usize {
        self.cache.len()
    }
}

impl fmt::Debug for Replicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Replicator")
            .field("types", &self.pool.len())
            .field("plans", &self.cache.len())
            .finish_non_exhaustive()
    }
}
