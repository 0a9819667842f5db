//! Capability slot table.
//!
//! Capability ids map directly onto slots (`id - 1`). A removed capability
//! frees its slot but its id is never handed out again. The table also keeps
//! a parent → children index so revocation can walk a derivation subtree
//! without scanning every slot.

use std::collections::HashMap;

use vault_common::types::CapId;

use crate::error::{CapError, CapResult};
use crate::token::Capability;

/// Fixed-capacity storage for capabilities.
#[derive(Debug)]
pub struct CapTable {
    slots: Vec<Option<Capability>>,
    children: HashMap<CapId, Vec<CapId>>,
    len: usize,
}

impl CapTable {
    /// Creates an empty table with `capacity` slots.
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![None; capacity],
            children: HashMap::new(),
            len: 0,
        }
    }

    /// Number of slots.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of stored capabilities.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if no capability is stored.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns true if `cap_id` maps onto a slot.
    pub fn has_slot(&self, cap_id: CapId) -> bool {
        cap_id.slot().is_some_and(|slot| slot < self.slots.len())
    }

    /// Stores a capability in its slot and links it under its parent.
    pub fn insert(&mut self, cap: Capability) -> CapResult<()> {
        let slot = cap
            .cap_id
            .slot()
            .filter(|&slot| slot < self.slots.len())
            .ok_or(CapError::Full {
                capacity: self.slots.len(),
            })?;

        if cap.parent.is_valid() {
            self.children.entry(cap.parent).or_default().push(cap.cap_id);
        }
        if self.slots[slot].replace(cap).is_none() {
            self.len += 1;
        }
        Ok(())
    }

    /// Returns the capability with this id.
    pub fn get(&self, cap_id: CapId) -> Option<&Capability> {
        self.slots.get(cap_id.slot()?)?.as_ref()
    }

    /// Returns the capability with this id for modification.
    pub fn get_mut(&mut self, cap_id: CapId) -> Option<&mut Capability> {
        self.slots.get_mut(cap_id.slot()?)?.as_mut()
    }

    /// Frees the capability's slot and unlinks it from its parent.
    ///
    /// Children keep their parent id; they are no longer reachable from it
    /// when the parent is gone.
    pub fn remove(&mut self, cap_id: CapId) -> Option<Capability> {
        let cap = self.slots.get_mut(cap_id.slot()?)?.take()?;
        self.len -= 1;

        if let Some(siblings) = self.children.get_mut(&cap.parent) {
            siblings.retain(|&id| id != cap_id);
            if siblings.is_empty() {
                self.children.remove(&cap.parent);
            }
        }
        self.children.remove(&cap_id);
        Some(cap)
    }

    /// Ids derived directly from `cap_id`, in creation order.
    pub fn children(&self, cap_id: CapId) -> &[CapId] {
        self.children.get(&cap_id).map_or(&[], Vec::as_slice)
    }

    /// Iterates over stored capabilities in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Capability> {
        self.slots.iter().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::{ObjectType, Rights};
    use vault_common::types::ProcessId;

    fn cap(id: u64, parent: u64) -> Capability {
        Capability {
            cap_id: CapId::new(id),
            object_id: 1,
            object_type: ObjectType::Table,
            owner_pid: ProcessId::new(1),
            rights: Rights::READ,
            seal: [0; 32],
            parent: CapId::new(parent),
            created_at: 0,
            expires_at: 0,
            revoked: false,
        }
    }

    #[test]
    fn test_insert_and_get() {
        let mut table = CapTable::new(4);
        table.insert(cap(1, 0)).unwrap();
        table.insert(cap(2, 1)).unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.get(CapId::new(2)).unwrap().parent, CapId::new(1));
        assert!(table.get(CapId::NONE).is_none());
        assert!(table.get(CapId::new(3)).is_none());
        assert_eq!(table.children(CapId::new(1)), &[CapId::new(2)]);
        assert!(table.children(CapId::new(2)).is_empty());
    }

    #[test]
    fn test_full() {
        let mut table = CapTable::new(2);
        table.insert(cap(1, 0)).unwrap();
        table.insert(cap(2, 0)).unwrap();
        assert_eq!(
            table.insert(cap(3, 0)),
            Err(CapError::Full { capacity: 2 })
        );
        assert!(!table.has_slot(CapId::new(3)));
    }

    #[test]
    fn test_remove_unlinks() {
        let mut table = CapTable::new(4);
        table.insert(cap(1, 0)).unwrap();
        table.insert(cap(2, 1)).unwrap();
        table.insert(cap(3, 1)).unwrap();

        assert!(table.remove(CapId::new(2)).is_some());
        assert!(table.remove(CapId::new(2)).is_none());
        assert_eq!(table.children(CapId::new(1)), &[CapId::new(3)]);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_iter_in_id_order() {
        let mut table = CapTable::new(8);
        for id in [3, 1, 2] {
            table.insert(cap(id, 0)).unwrap();
        }
        let ids: Vec<u64> = table.iter().map(|c| c.cap_id.as_u64()).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }
}
