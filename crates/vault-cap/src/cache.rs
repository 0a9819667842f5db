//! Direct-mapped verification cache.
//!
//! Seal verification costs an HMAC per check. The cache memoizes the result
//! per capability for a bounded number of ticks. Slot `cap_id % slots` holds
//! at most one entry; a colliding id simply replaces it.

use vault_common::types::CapId;

#[derive(Debug, Clone, Copy)]
struct Entry {
    cap_id: CapId,
    validated_at: u64,
    valid: bool,
}

/// Memoized seal verification results.
#[derive(Debug)]
pub struct ValidationCache {
    slots: Vec<Option<Entry>>,
    ttl: u64,
}

impl ValidationCache {
    /// Creates a cache with `slots` entries (at least one) and the given TTL.
    pub fn new(slots: usize, ttl: u64) -> Self {
        Self {
            slots: vec![None; slots.max(1)],
            ttl,
        }
    }

    #[inline]
    fn slot(&self, cap_id: CapId) -> usize {
        (cap_id.as_u64() % self.slots.len() as u64) as usize
    }

    /// Returns the memoized validity if a fresh entry for `cap_id` exists.
    pub fn lookup(&self, cap_id: CapId, now: u64) -> Option<bool> {
        match self.slots[self.slot(cap_id)] {
            Some(entry)
                if entry.cap_id == cap_id
                    && now.saturating_sub(entry.validated_at) < self.ttl =>
            {
                Some(entry.valid)
            }
            _ => None,
        }
    }

    /// Records a verification result, replacing whatever shares the slot.
    pub fn record(&mut self, cap_id: CapId, now: u64, valid: bool) {
        let slot = self.slot(cap_id);
        self.slots[slot] = Some(Entry {
            cap_id,
            validated_at: now,
            valid,
        });
    }

    /// Drops the entry for `cap_id`, if cached.
    pub fn evict(&mut self, cap_id: CapId) {
        let slot = self.slot(cap_id);
        if matches!(self.slots[slot], Some(entry) if entry.cap_id == cap_id) {
            self.slots[slot] = None;
        }
    }

    /// Drops every entry.
    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|slot| *slot = None);
    }

    /// Number of slots.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Configured TTL in ticks.
    pub fn ttl(&self) -> u64 {
        self.ttl
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_within_ttl() {
        let mut cache = ValidationCache::new(4, 10);
        cache.record(CapId::new(1), 100, true);
        assert_eq!(cache.lookup(CapId::new(1), 100), Some(true));
        assert_eq!(cache.lookup(CapId::new(1), 109), Some(true));
        assert_eq!(cache.lookup(CapId::new(1), 110), None);
    }

    #[test]
    fn test_collision_replaces() {
        let mut cache = ValidationCache::new(4, 10);
        cache.record(CapId::new(1), 0, true);
        cache.record(CapId::new(5), 0, false);
        assert_eq!(cache.lookup(CapId::new(1), 0), None);
        assert_eq!(cache.lookup(CapId::new(5), 0), Some(false));
    }

    #[test]
    fn test_evict_only_matching() {
        let mut cache = ValidationCache::new(4, 10);
        cache.record(CapId::new(5), 0, true);
        cache.evict(CapId::new(1));
        assert_eq!(cache.lookup(CapId::new(5), 0), Some(true));
        cache.evict(CapId::new(5));
        assert_eq!(cache.lookup(CapId::new(5), 0), None);
    }

    #[test]
    fn test_clear() {
        let mut cache = ValidationCache::new(0, 10);
        assert_eq!(cache.capacity(), 1);
        cache.record(CapId::new(3), 0, true);
        cache.clear();
        assert_eq!(cache.lookup(CapId::new(3), 0), None);
    }
}
