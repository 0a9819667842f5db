//! B-tree node layout.

/// A single B-tree node.
///
/// `keys` and `values` are parallel. A `None` value marks a tombstone, which
/// only ever appears in internal nodes. Internal nodes hold exactly
/// `keys.len() + 1` children; leaves hold none.
#[derive(Debug, Clone)]
pub(crate) struct Node<V> {
    pub(crate) keys: Vec<u64>,
    pub(crate) values: Vec<Option<V>>,
    pub(crate) children: Vec<Node<V>>,
    pub(crate) leaf: bool,
}

impl<V> Node<V> {
    /// Creates an empty leaf.
    pub(crate) fn leaf(capacity: usize) -> Self {
        Self {
            keys: Vec::with_capacity(capacity),
            values: Vec::with_capacity(capacity),
            children: Vec::new(),
            leaf: true,
        }
    }

    /// Creates an empty internal node.
    pub(crate) fn internal(capacity: usize) -> Self {
        Self {
            keys: Vec::with_capacity(capacity),
            values: Vec::with_capacity(capacity),
            children: Vec::with_capacity(capacity + 1),
            leaf: false,
        }
    }

    /// Returns the index of `key`, or the child index to descend into.
    #[inline]
    pub(crate) fn locate(&self, key: u64) -> Result<usize, usize> {
        self.keys.binary_search(&key)
    }

    /// Splits the full child at `index`, promoting its median into `self`.
    ///
    /// The left half keeps `keys[..mid]`, the right half takes
    /// `keys[mid + 1..]` and the median `keys[mid]` moves up.
    pub(crate) fn split_child(&mut self, index: usize, max_keys: usize) {
        let mid = max_keys / 2;
        let child = &mut self.children[index];

        let mut right_keys = child.keys.split_off(mid);
        let mut right_values = child.values.split_off(mid);
        let median_key = right_keys.remove(0);
        let median_value = right_values.remove(0);

        let right = Node {
            keys: right_keys,
            values: right_values,
            children: if child.leaf {
                Vec::new()
            } else {
                child.children.split_off(mid + 1)
            },
            leaf: child.leaf,
        };

        self.keys.insert(index, median_key);
        self.values.insert(index, median_value);
        self.children.insert(index + 1, right);
    }

    /// Counts nodes in this subtree.
    pub(crate) fn node_count(&self) -> usize {
        1 + self.children.iter().map(Node::node_count).sum::<usize>()
    }
}
