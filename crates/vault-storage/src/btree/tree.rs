//! Main B-tree implementation.

use std::ops::ControlFlow;

use super::error::{BTreeError, BTreeResult};
use super::node::Node;

/// Smallest order the split rule supports.
pub const MIN_ORDER: usize = 4;

/// Statistics about the tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TreeStats {
    /// Number of levels (1 = a single leaf).
    pub height: usize,
    /// Total number of nodes.
    pub node_count: usize,
    /// Number of live entries.
    pub entries: usize,
    /// Number of tombstoned keys still acting as separators.
    pub tombstones: usize,
}

enum Removed<V> {
    Compacted(V),
    Tombstoned(V),
}

/// An in-memory B-tree mapping `u64` keys to values.
#[derive(Debug, Clone)]
pub struct BTree<V> {
    root: Node<V>,
    max_keys: usize,
    live: usize,
    tombstones: usize,
}

impl<V> BTree<V> {
    /// Creates an empty tree of the given order (maximum children per node).
    pub fn new(order: usize) -> BTreeResult<Self> {
        if order < MIN_ORDER {
            return Err(BTreeError::InvalidOrder {
                order,
                min: MIN_ORDER,
            });
        }
        let max_keys = order - 1;
        Ok(Self {
            root: Node::leaf(max_keys),
            max_keys,
            live: 0,
            tombstones: 0,
        })
    }

    /// Returns the order of the tree.
    pub fn order(&self) -> usize {
        self.max_keys + 1
    }

    /// Returns the number of live entries.
    pub fn len(&self) -> usize {
        self.live
    }

    /// Returns true if the tree holds no live entries.
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Returns the number of levels in the tree.
    pub fn height(&self) -> usize {
        let mut height = 1;
        let mut node = &self.root;
        while let Some(child) = node.children.first() {
            height += 1;
            node = child;
        }
        height
    }

    /// Returns tree statistics.
    pub fn stats(&self) -> TreeStats {
        TreeStats {
            height: self.height(),
            node_count: self.root.node_count(),
            entries: self.live,
            tombstones: self.tombstones,
        }
    }

    // =========================================================================
    // Point Operations
    // =========================================================================

    /// Looks up the value stored under `key`.
    pub fn search(&self, key: u64) -> Option<&V> {
        let mut node = &self.root;
        loop {
            match node.locate(key) {
                Ok(i) => return node.values[i].as_ref(),
                Err(_) if node.leaf => return None,
                Err(i) => node = &node.children[i],
            }
        }
    }

    /// Looks up the value stored under `key` for in-place modification.
    pub fn search_mut(&mut self, key: u64) -> Option<&mut V> {
        self.slot_mut(key).and_then(Option::as_mut)
    }

    /// Returns true if a live entry exists for `key`.
    pub fn contains_key(&self, key: u64) -> bool {
        self.search(key).is_some()
    }

    /// Inserts `value` under `key`, returning the previous live value.
    ///
    /// An existing key (live or tombstoned) is updated in place.
    pub fn insert(&mut self, key: u64, value: V) -> Option<V> {
        if let Some(slot) = self.slot_mut(key) {
            let previous = slot.replace(value);
            if previous.is_none() {
                self.tombstones -= 1;
                self.live += 1;
            }
            return previous;
        }

        if self.root.keys.len() == self.max_keys {
            let old_root = std::mem::replace(&mut self.root, Node::internal(self.max_keys));
            self.root.children.push(old_root);
            self.root.split_child(0, self.max_keys);
        }

        Self::insert_non_full(&mut self.root, key, value, self.max_keys);
        self.live += 1;
        None
    }

    /// Removes the entry for `key`, returning its value.
    ///
    /// Leaf entries are removed outright; internal entries become tombstones.
    pub fn delete(&mut self, key: u64) -> Option<V> {
        match Self::remove(&mut self.root, key)? {
            Removed::Compacted(value) => {
                self.live -= 1;
                Some(value)
            }
            Removed::Tombstoned(value) => {
                self.live -= 1;
                self.tombstones += 1;
                Some(value)
            }
        }
    }

    // =========================================================================
    // Traversal
    // =========================================================================

    /// Visits every live entry in ascending key order.
    ///
    /// The callback may stop the traversal early by returning
    /// [`ControlFlow::Break`], whose payload is passed through.
    pub fn scan<B, F>(&self, mut f: F) -> ControlFlow<B>
    where
        F: FnMut(u64, &V) -> ControlFlow<B>,
    {
        Self::scan_node(&self.root, &mut f)
    }

    /// Returns an iterator over live entries in ascending key order.
    pub fn iter(&self) -> Iter<'_, V> {
        let mut iter = Iter { stack: Vec::new() };
        iter.push_left(&self.root);
        iter
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn slot_mut(&mut self, key: u64) -> Option<&mut Option<V>> {
        let mut node = &mut self.root;
        loop {
            match node.locate(key) {
                Ok(i) => return Some(&mut node.values[i]),
                Err(_) if node.leaf => return None,
                Err(i) => node = &mut node.children[i],
            }
        }
    }

    fn insert_non_full(root: &mut Node<V>, key: u64, value: V, max_keys: usize) {
        let mut node = root;
        loop {
            let mut i = node.keys.partition_point(|&k| k < key);
            if node.leaf {
                node.keys.insert(i, key);
                node.values.insert(i, Some(value));
                return;
            }
            if node.children[i].keys.len() == max_keys {
                node.split_child(i, max_keys);
                if key > node.keys[i] {
                    i += 1;
                }
            }
            node = &mut node.children[i];
        }
    }

    fn remove(root: &mut Node<V>, key: u64) -> Option<Removed<V>> {
        let mut node = root;
        loop {
            match node.locate(key) {
                Ok(i) if node.leaf => {
                    // Leaves never hold tombstones, but stay a no-op if one appears.
                    node.values[i].as_ref()?;
                    node.keys.remove(i);
                    return node.values.remove(i).map(Removed::Compacted);
                }
                Ok(i) => return node.values[i].take().map(Removed::Tombstoned),
                Err(_) if node.leaf => return None,
                Err(i) => node = &mut node.children[i],
            }
        }
    }

    fn scan_node<B, F>(node: &Node<V>, f: &mut F) -> ControlFlow<B>
    where
        F: FnMut(u64, &V) -> ControlFlow<B>,
    {
        for (i, key) in node.keys.iter().enumerate() {
            if !node.leaf {
                Self::scan_node(&node.children[i], f)?;
            }
            if let Some(value) = &node.values[i] {
                f(*key, value)?;
            }
        }
        match node.children.last() {
            Some(last) if !node.leaf => Self::scan_node(last, f),
            _ => ControlFlow::Continue(()),
        }
    }
}

/// In-order iterator over live entries.
pub struct Iter<'a, V> {
    stack: Vec<(&'a Node<V>, usize)>,
}

impl<'a, V> Iter<'a, V> {
    fn push_left(&mut self, mut node: &'a Node<V>) {
        loop {
            self.stack.push((node, 0));
            match node.children.first() {
                Some(child) => node = child,
                None => return,
            }
        }
    }
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (u64, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let top = self.stack.last_mut()?;
            let (node, i) = *top;
            if i >= node.keys.len() {
                self.stack.pop();
                continue;
            }
            top.1 += 1;
            if !node.leaf {
                self.push_left(&node.children[i + 1]);
            }
            if let Some(value) = &node.values[i] {
                return Some((node.keys[i], value));
            }
        }
    }
}

impl<'a, V> IntoIterator for &'a BTree<V> {
    type Item = (u64, &'a V);
    type IntoIter = Iter<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;
    use rand::SeedableRng;

    fn collect_keys(tree: &BTree<u64>) -> Vec<u64> {
        let mut keys = Vec::new();
        let _ = tree.scan(|key, _| {
            keys.push(key);
            ControlFlow::<()>::Continue(())
        });
        keys
    }

    fn assert_strictly_ascending(keys: &[u64]) {
        for pair in keys.windows(2) {
            assert!(pair[0] < pair[1], "keys out of order: {:?}", pair);
        }
    }

    #[test]
    fn test_invalid_order() {
        assert!(matches!(
            BTree::<u64>::new(3),
            Err(BTreeError::InvalidOrder { order: 3, min: 4 })
        ));
        assert_eq!(BTree::<u64>::new(64).unwrap().order(), 64);
    }

    #[test]
    fn test_empty_tree() {
        let tree: BTree<u64> = BTree::new(4).unwrap();
        assert!(tree.is_empty());
        assert_eq!(tree.search(1), None);
        assert_eq!(tree.height(), 1);
        assert_eq!(tree.iter().count(), 0);
    }

    #[test]
    fn test_insert_and_search() {
        let mut tree = BTree::new(4).unwrap();
        for key in 1..=100u64 {
            assert_eq!(tree.insert(key, key * 2), None);
        }
        assert_eq!(tree.len(), 100);
        for key in 1..=100u64 {
            assert_eq!(tree.search(key), Some(&(key * 2)));
        }
        assert_eq!(tree.search(0), None);
        assert_eq!(tree.search(101), None);
        assert!(tree.height() > 1);
    }

    #[test]
    fn test_insert_existing_updates_in_place() {
        let mut tree = BTree::new(4).unwrap();
        for key in 1..=10u64 {
            tree.insert(key, key);
        }
        assert_eq!(tree.insert(5, 500), Some(5));
        assert_eq!(tree.search(5), Some(&500));
        assert_eq!(tree.len(), 10);
    }

    #[test]
    fn test_root_split_order_64() {
        let mut tree = BTree::new(64).unwrap();
        for key in 1..=63u64 {
            tree.insert(key, key);
        }
        assert_eq!(tree.height(), 1);

        tree.insert(64, 64);
        assert_eq!(tree.height(), 2);
        assert_eq!(tree.root.keys, vec![32]);
        assert_eq!(collect_keys(&tree), (1..=64).collect::<Vec<_>>());
    }

    #[test]
    fn test_delete_leaf_compacts() {
        let mut tree = BTree::new(4).unwrap();
        for key in 1..=3u64 {
            tree.insert(key, key);
        }
        assert_eq!(tree.delete(2), Some(2));
        assert_eq!(tree.root.keys, vec![1, 3]);
        assert_eq!(tree.stats().tombstones, 0);
        assert_eq!(tree.delete(2), None);
    }

    #[test]
    fn test_delete_internal_tombstones_and_revives() {
        let mut tree = BTree::new(4).unwrap();
        for key in 1..=4u64 {
            tree.insert(key, key);
        }
        // The root now separates the two leaves with key 2.
        assert_eq!(tree.root.keys, vec![2]);

        assert_eq!(tree.delete(2), Some(2));
        assert_eq!(tree.search(2), None);
        assert!(!tree.contains_key(2));
        assert_eq!(tree.len(), 3);
        assert_eq!(tree.stats().tombstones, 1);
        assert_eq!(collect_keys(&tree), vec![1, 3, 4]);

        // Deleting a tombstone is a no-op.
        assert_eq!(tree.delete(2), None);
        assert_eq!(tree.len(), 3);

        assert_eq!(tree.insert(2, 20), None);
        assert_eq!(tree.search(2), Some(&20));
        assert_eq!(tree.len(), 4);
        assert_eq!(tree.stats().tombstones, 0);
    }

    #[test]
    fn test_scan_early_exit() {
        let mut tree = BTree::new(4).unwrap();
        for key in 1..=50u64 {
            tree.insert(key, key);
        }
        let mut visited = 0;
        let result = tree.scan(|key, _| {
            visited += 1;
            if key == 10 {
                ControlFlow::Break(key)
            } else {
                ControlFlow::Continue(())
            }
        });
        assert_eq!(result, ControlFlow::Break(10));
        assert_eq!(visited, 10);
    }

    #[test]
    fn test_iter_matches_scan() {
        let mut tree = BTree::new(5).unwrap();
        for key in (1..=200u64).rev() {
            tree.insert(key, key + 1);
        }
        for key in (1..=200u64).step_by(3) {
            tree.delete(key);
        }
        let from_iter: Vec<u64> = tree.iter().map(|(k, _)| k).collect();
        assert_eq!(from_iter, collect_keys(&tree));
        assert_eq!(from_iter.len(), tree.len());
        for (key, value) in &tree {
            assert_eq!(*value, key + 1);
        }
    }

    #[test]
    fn test_random_operations_keep_order() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut keys: Vec<u64> = (1..=500).collect();
        keys.shuffle(&mut rng);

        let mut tree = BTree::new(4).unwrap();
        let mut model = std::collections::BTreeMap::new();
        for &key in &keys {
            tree.insert(key, key);
            model.insert(key, key);
        }

        keys.shuffle(&mut rng);
        for &key in keys.iter().take(250) {
            assert_eq!(tree.delete(key), model.remove(&key));
        }
        for &key in keys.iter().take(50) {
            tree.insert(key, key * 3);
            model.insert(key, key * 3);
        }

        let scanned = collect_keys(&tree);
        assert_strictly_ascending(&scanned);
        assert_eq!(scanned, model.keys().copied().collect::<Vec<_>>());
        assert_eq!(tree.len(), model.len());
        for (key, value) in &model {
            assert_eq!(tree.search(*key), Some(value));
        }
    }

    #[test]
    fn test_search_mut() {
        let mut tree = BTree::new(4).unwrap();
        for key in 1..=20u64 {
            tree.insert(key, key);
        }
        *tree.search_mut(13).unwrap() = 1300;
        assert_eq!(tree.search(13), Some(&1300));
        tree.delete(13);
        assert!(tree.search_mut(13).is_none());
    }
}
