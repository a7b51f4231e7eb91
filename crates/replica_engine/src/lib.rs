//! Deep-clone engine for replica heaps.
//!
//! A [`Replicator`] copies any value on a [`Heap`](replica_heap::Heap)
//! into a fully independent graph on the same heap. Cycles and shared
//! references keep their topology, runtime types are preserved through
//! base-class, interface and top-type slots, and read-only fields are
//! assigned directly.
//!
//! # Architecture
//!
//! - **Plans**: one compiled closure per type, chosen by the type's
//!   [`Shape`](replica_types::Shape) and built once from the pool.
//! - **Plan cache**: concurrent maps of primary plans and redirect
//!   entries, shared by every call and thread.
//! - **Identity map**: per call, source object to clone, registered
//!   before any child is cloned.
//! - **Redirects**: when a value's runtime type differs from the type it
//!   was reached through, cloning continues with the runtime type's plan.

mod cache;
mod cloners;
mod context;
mod engine;
mod error;
mod identity;
mod options;
mod plan;
mod stack;

pub use context::CloneCx;
pub use engine::Replicator;
pub use error::{CloneError, CloneResult};
pub use identity::IdentityMap;
pub use options::CloneOptions;
pub use plan::Plan;

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "tests use unwrap for concise assertions")]
mod tests;
