//! Per-call clone configuration.

use replica_heap::ObjRef;

/// Immutable configuration for one copy call.
///
/// # Example
///
/// ```text
/// let options = CloneOptions::new()
///     .deep_clone_strings(true)
///     .unclonable(shared_logger);
/// replicator.copy(&mut heap, &value, Some(&options))?;
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CloneOptions {
    deep_clone_strings: bool,
    deep_clone_singletons: bool,
    unclonable: Vec<ObjRef>,
}

static NONE: CloneOptions = CloneOptions::new();

impl CloneOptions {
    /// Default options: strings and singletons are shared, nothing is unclonable.
    pub const fn new() -> Self {
        Self {
            deep_clone_strings: false,
            deep_clone_singletons: false,
            unclonable: Vec::new(),
        }
    }

    /// The shared default instance.
    pub fn none() -> &'static CloneOptions {
        &NONE
    }

    /// Copy strings into fresh allocations instead of sharing them.
    #[must_use]
    pub fn deep_clone_strings(mut self, enabled: bool) -> Self {
        self.deep_clone_strings = enabled;
        self
    }

    /// Clone a class's own canonical static instances instead of reusing them.
    #[must_use]
    pub fn deep_clone_singletons(mut self, enabled: bool) -> Self {
        self.deep_clone_singletons = enabled;
        self
    }

    /// Resolve `obj`, and every reference to it, to itself.
    #[must_use]
    pub fn unclonable(mut self, obj: ObjRef) -> Self {
        if !self.unclonable.contains(&obj) {
            self.unclonable.push(obj);
        }
        self
    }

    #[must_use]
    pub fn unclonables(self, objs: impl IntoIterator<Item = ObjRef>) -> Self {
        objs.into_iter().fold(self, CloneOptions::unclonable)
    }

    #[inline]
    pub fn clones_strings(&self) -> bool {
        self.deep_clone_strings
    }

    #[inline]
    pub fn clones_singletons(&self) -> bool {
        self.deep_clone_singletons
    }

    pub fn unclonable_objects(&self) -> &[ObjRef] {
        &self.unclonable
    }
}
