use crate::lowered::LoweredTypeId;
use crate::LayoutError;
use rustc_hash::FxHashMap;
use tessera_hir::TypeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    /// Construction is in progress further up the stack.
    Reserved { reentered: bool },
    Ready(LoweredTypeId),
}

/// Counters for observing cache behaviour.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
    /// Candidates dropped because a recursive call finished first.
    pub discarded: usize,
}

/// Canonical descriptor → lowered type, write-once per key.
#[derive(Debug, Default)]
pub struct LoweringCache {
    slots: FxHashMap<TypeId, Slot>,
    ready: usize,
    stats: CacheStats,
}

impl LoweringCache {
    /// The finished entry for `key`, if any. Reserved slots read as absent.
    pub fn get(&self, key: TypeId) -> Option<LoweredTypeId> {
        match self.slots.get(&key) {
            Some(Slot::Ready(id)) => Some(*id),
            _ => None,
        }
    }

    pub fn contains(&self, key: TypeId) -> bool {
        self.get(key).is_some()
    }

    pub(crate) fn is_reserved(&self, key: TypeId) -> bool {
        matches!(self.slots.get(&key), Some(Slot::Reserved { .. }))
    }

    /// Number of finished entries.
    pub fn len(&self) -> usize {
        self.ready
    }

    pub fn is_empty(&self) -> bool {
        self.ready == 0
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Called on entry to `resolve`. Returns the finished entry, or `None`
    /// after reserving the slot for construction. A reserved slot may be
    /// entered once more from below; a second re-entry is a cycle that no
    /// aggregate declaration breaks.
    pub(crate) fn enter(&mut self, key: TypeId) -> Result<Option<LoweredTypeId>, LayoutError> {
        match self.slots.get_mut(&key) {
            Some(Slot::Ready(id)) => {
                self.stats.hits += 1;
                Ok(Some(*id))
            }
            Some(Slot::Reserved { reentered: true }) => Err(LayoutError::UnresolvableCycle(key)),
            Some(Slot::Reserved { reentered }) => {
                *reentered = true;
                Ok(None)
            }
            None => {
                self.stats.misses += 1;
                self.slots.insert(key, Slot::Reserved { reentered: false });
                Ok(None)
            }
        }
    }

    pub(crate) fn fill(&mut self, key: TypeId, id: LoweredTypeId) -> Result<(), LayoutError> {
        match self.slots.insert(key, Slot::Ready(id)) {
            Some(Slot::Ready(existing)) => {
                self.slots.insert(key, Slot::Ready(existing));
                Err(LayoutError::AlreadyLowered(key))
            }
            _ => {
                self.ready += 1;
                Ok(())
            }
        }
    }

    pub(crate) fn note_discard(&mut self) {
        self.stats.discarded += 1;
    }

    /// Drops a reservation left behind by a failed construction.
    pub(crate) fn abandon(&mut self, key: TypeId) {
        if let Some(Slot::Reserved { .. }) = self.slots.get(&key) {
            self.slots.remove(&key);
        }
    }

    /// Forgets every finished entry whose id is at or past `mark`.
    pub(crate) fn rollback(&mut self, mark: usize) {
        self.slots
            .retain(|_, slot| !matches!(slot, Slot::Ready(id) if id.index() >= mark));
        self.ready = self
            .slots
            .values()
            .filter(|slot| matches!(slot, Slot::Ready(_)))
            .count();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lowered::{LoweredType, LoweredTypes};
    use tessera_hir::{BasicKind, TypeTable};

    fn key_and_entry() -> (TypeId, LoweredTypeId) {
        let mut table = TypeTable::new();
        let key = table.basic(BasicKind::Int32);
        let mut arena = LoweredTypes::default();
        let id = arena.push(LoweredType::Int { bits: 32 }, key).unwrap();
        (key, id)
    }

    #[test]
    fn reserve_then_fill() {
        let (key, id) = key_and_entry();
        let mut cache = LoweringCache::default();
        assert_eq!(cache.enter(key).unwrap(), None);
        assert!(!cache.contains(key));
        cache.fill(key, id).unwrap();
        assert_eq!(cache.enter(key).unwrap(), Some(id));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.stats(), CacheStats { hits: 1, misses: 1, discarded: 0 });
    }

    #[test]
    fn second_reentry_is_a_cycle() {
        let (key, _) = key_and_entry();
        let mut cache = LoweringCache::default();
        assert_eq!(cache.enter(key).unwrap(), None);
        assert_eq!(cache.enter(key).unwrap(), None);
        assert!(matches!(cache.enter(key), Err(LayoutError::UnresolvableCycle(k)) if k == key));
    }

    #[test]
    fn entries_are_write_once() {
        let (key, id) = key_and_entry();
        let mut cache = LoweringCache::default();
        cache.fill(key, id).unwrap();
        assert!(matches!(cache.fill(key, id), Err(LayoutError::AlreadyLowered(k)) if k == key));
        assert_eq!(cache.get(key), Some(id));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn rollback_keeps_older_entries() {
        let mut table = TypeTable::new();
        let old_key = table.basic(BasicKind::Int8);
        let new_key = table.basic(BasicKind::Int16);
        let mut arena = LoweredTypes::default();
        let old = arena.push(LoweredType::Int { bits: 8 }, old_key).unwrap();
        let new = arena.push(LoweredType::Int { bits: 16 }, new_key).unwrap();

        let mut cache = LoweringCache::default();
        cache.fill(old_key, old).unwrap();
        cache.fill(new_key, new).unwrap();
        cache.rollback(new.index());
        assert_eq!(cache.get(old_key), Some(old));
        assert_eq!(cache.get(new_key), None);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn abandon_only_clears_reservations() {
        let (key, id) = key_and_entry();
        let mut cache = LoweringCache::default();
        cache.enter(key).unwrap();
        cache.abandon(key);
        assert_eq!(cache.enter(key).unwrap(), None);
        cache.fill(key, id).unwrap();
        cache.abandon(key);
        assert_eq!(cache.get(key), Some(id));
    }
}
