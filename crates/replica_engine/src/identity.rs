//! Per-call identity map.
//!
//! Maps source object identity to its clone. A reference-type plan looks
//! its source up first and registers the destination shell *before*
//! cloning children, so a child pointing back at an ancestor finds the
//! shell instead of recursing.

use replica_heap::ObjRef;
use rustc_hash::FxHashMap;

#[derive(Debug, Default)]
pub struct IdentityMap {
    map: FxHashMap<ObjRef, ObjRef>,
    seeded: usize,
}

impl IdentityMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// A map where each of `objs` already resolves to itself.
    pub fn seeded(objs: &[ObjRef]) -> Self {
        let map: FxHashMap<ObjRef, ObjRef> = objs.iter().map(|&o| (o, o)).collect();
        let seeded = map.len();
        Self { map, seeded }
    }

    #[inline]
    pub fn try_get(&self, src: ObjRef) -> Option<ObjRef> {
        self.map.get(&src).copied()
    }

    #[inline]
    pub fn register(&mut self, src: ObjRef, dst: ObjRef) {
        self.map.insert(src, dst);
    }

    /// Objects cloned so far, seeds excluded.
    pub fn cloned(&self) -> usize {
        self.map.len() - self.seeded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeds_resolve_to_themselves() {
        let a = ObjRef::from_raw(1);
        let b = ObjRef::from_raw(2);
        let mut map = IdentityMap::seeded(&[a]);
        assert_eq!(map.try_get(a), Some(a));
        assert_eq!(map.try_get(b), None);
        assert_eq!(map.cloned(), 0);

        map.register(b, ObjRef::from_raw(7));
        assert_eq!(map.try_get(b), Some(ObjRef::from_raw(7)));
        assert_eq!(map.cloned(), 1);
    }
}
