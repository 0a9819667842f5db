//! Core identifier types for VaultDB.
//!
//! These types provide type-safe wrappers around numeric identifiers,
//! preventing a row id from being passed where a capability id is expected.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Row identifier, unique across every table of an engine.
///
/// Row ids are handed out by a single process-wide counter starting at 1.
/// They are never reused and never decrease.
///
/// # Example
///
/// ```rust
/// use vault_common::types::RowId;
///
/// let row = RowId::FIRST;
/// assert_eq!(row.as_u64(), 1);
/// assert_eq!(row.next(), RowId::new(2));
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct RowId(u64);

impl RowId {
    /// The first row id handed out by an engine.
    pub const FIRST: Self = Self(1);

    /// Creates a new `RowId` from a raw u64 value.
    #[inline]
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw u64 value.
    #[inline]
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// Returns the next row id.
    #[inline]
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl fmt::Debug for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RowId({})", self.0)
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for RowId {
    #[inline]
    fn from(id: u64) -> Self {
        Self::new(id)
    }
}

impl From<RowId> for u64 {
    #[inline]
    fn from(id: RowId) -> Self {
        id.0
    }
}

/// Table identifier.
///
/// Table ids are dense: the n-th table created by an engine gets id n,
/// starting at 0. They double as the object id tables are authorized by.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct TableId(u32);

impl TableId {
    /// Creates a new `TableId` from a raw u32 value.
    #[inline]
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw u32 value.
    #[inline]
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self.0
    }

    /// Returns the id as a slot index.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Returns the id widened to an object id for capability checks.
    #[inline]
    #[must_use]
    pub const fn object_id(self) -> u64 {
        self.0 as u64
    }
}

impl fmt::Debug for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TableId({})", self.0)
    }
}

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for TableId {
    #[inline]
    fn from(id: u32) -> Self {
        Self::new(id)
    }
}

/// Capability identifier.
///
/// Ids start at 1 and map directly onto capability table slots (`id - 1`).
/// The value 0 means "no capability" and is used as the parent of root
/// capabilities.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct CapId(u64);

impl CapId {
    /// Sentinel for "no capability" (the parent of a root capability).
    pub const NONE: Self = Self(0);

    /// The first capability id handed out.
    pub const FIRST: Self = Self(1);

    /// Creates a new `CapId` from a raw u64 value.
    #[inline]
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw u64 value.
    #[inline]
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// Returns the next capability id.
    #[inline]
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }

    /// Checks if this refers to an actual capability.
    #[inline]
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.0 != Self::NONE.0
    }

    /// Returns the capability table slot for this id.
    #[inline]
    #[must_use]
    pub fn slot(self) -> Option<usize> {
        usize::try_from(self.0).ok()?.checked_sub(1)
    }
}

impl fmt::Debug for CapId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::NONE {
            write!(f, "CapId(NONE)")
        } else {
            write!(f, "CapId({})", self.0)
        }
    }
}

impl fmt::Display for CapId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for CapId {
    #[inline]
    fn from(id: u64) -> Self {
        Self::new(id)
    }
}

/// Process identifier of a caller.
///
/// Pid 0 is the kernel, the owning root principal that always passes
/// capability checks.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct ProcessId(u64);

impl ProcessId {
    /// The kernel principal.
    pub const KERNEL: Self = Self(0);

    /// Creates a new `ProcessId` from a raw u64 value.
    #[inline]
    #[must_use]
    pub const fn new(pid: u64) -> Self {
        Self(pid)
    }

    /// Returns the raw u64 value.
    #[inline]
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// Returns true for the kernel principal.
    #[inline]
    #[must_use]
    pub const fn is_kernel(self) -> bool {
        self.0 == Self::KERNEL.0
    }
}

impl fmt::Debug for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_kernel() {
            write!(f, "ProcessId(KERNEL)")
        } else {
            write!(f, "ProcessId({})", self.0)
        }
    }
}

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ProcessId {
    #[inline]
    fn from(pid: u64) -> Self {
        Self::new(pid)
    }
}
