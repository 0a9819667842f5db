//! In-memory B-tree index keyed by row id.
//!
//! Each table owns one tree mapping `u64` row ids to stored values. The tree
//! is a classic preemptive-split B-tree: a full child is split before the
//! insert descends into it, so an insert never has to walk back up.
//!
//! ## Deletion
//!
//! Deleting from a leaf compacts the leaf. Deleting a key that lives in an
//! internal node leaves the key in place as a separator and clears its value
//! (a tombstone). Tombstones are invisible to [`BTree::search`],
//! [`BTree::scan`], [`BTree::iter`] and [`BTree::len`], and re-inserting the
//! key revives the slot. There is no merge or rebalance.
//!
//! ```text
//!                 ┌──────────────┐
//!                 │ [ 8 | 16† ]  │   † tombstone: key kept, value gone
//!                 └──────────────┘
//!                /       |        \
//!        ┌───────┐  ┌─────────┐  ┌──────────┐
//!        │ 1..7  │  │ 9..15   │  │ 17..     │
//!        └───────┘  └─────────┘  └──────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use std::ops::ControlFlow;
//! use vault_storage::btree::BTree;
//!
//! let mut tree = BTree::new(4).unwrap();
//! for key in 1..=20u64 {
//!     tree.insert(key, key * 10);
//! }
//! assert_eq!(tree.search(7), Some(&70));
//!
//! tree.delete(7);
//! assert_eq!(tree.search(7), None);
//! assert_eq!(tree.len(), 19);
//!
//! let mut seen = Vec::new();
//! let _ = tree.scan(|key, _| {
//!     seen.push(key);
//!     if seen.len() == 3 { ControlFlow::Break(()) } else { ControlFlow::Continue(()) }
//! });
//! assert_eq!(seen, vec![1, 2, 3]);
//! ```

mod error;
mod node;
mod tree;

pub use error::{BTreeError, BTreeResult};
pub use tree::{BTree, Iter, TreeStats, MIN_ORDER};
