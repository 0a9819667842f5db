//! Transaction bookkeeping.
//!
//! Transactions only track state; statements are not buffered or rolled
//! back. Commit succeeds once, from the active state, and finished
//! transactions are forgotten.

use std::collections::HashMap;
use std::fmt;

use vault_common::types::ProcessId;

use super::error::{DatabaseError, DatabaseResult};

/// Transaction identifier, starting at 1.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TxnId(u64);

impl TxnId {
    /// Creates a new `TxnId` from a raw u64 value.
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
}

impl fmt::Debug for TxnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TxnId({})", self.0)
    }
}

impl fmt::Display for TxnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Transaction state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxnState {
    /// Begun, not yet finished.
    Active,
    /// Committed.
    Committed,
    /// Aborted.
    Aborted,
}

/// A transaction record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transaction {
    /// Transaction id.
    pub id: TxnId,
    /// Process that began it.
    pub pid: ProcessId,
    /// Current state.
    pub state: TxnState,
}

/// Active transactions of an engine.
///
/// Commit and abort remove the entry. Ids are never reused, so an id below
/// the next one that is no longer present belongs to a finished transaction.
#[derive(Debug)]
pub(crate) struct TxnTable {
    active: HashMap<TxnId, Transaction>,
    next_id: u64,
}

impl TxnTable {
    pub fn new() -> Self {
        Self {
            active: HashMap::new(),
            next_id: 1,
        }
    }

    pub fn begin(&mut self, pid: ProcessId) -> TxnId {
        let id = TxnId::new(self.next_id);
        self.next_id += 1;
        self.active.insert(
            id,
            Transaction {
                id,
                pid,
                state: TxnState::Active,
            },
        );
        id
    }

    /// Commits an active transaction, returning its final record.
    pub fn commit(&mut self, id: TxnId) -> DatabaseResult<Transaction> {
        self.finish(id, TxnState::Committed)
    }

    /// Aborts an active transaction, returning its final record.
    pub fn abort(&mut self, id: TxnId) -> DatabaseResult<Transaction> {
        self.finish(id, TxnState::Aborted)
    }

    /// Returns an active transaction.
    pub fn get(&self, id: TxnId) -> Option<Transaction> {
        self.active.get(&id).copied()
    }

    /// Returns the number of active transactions.
    pub fn len(&self) -> usize {
        self.active.len()
    }

    fn finish(&mut self, id: TxnId, state: TxnState) -> DatabaseResult<Transaction> {
        let mut txn = self.active.remove(&id).ok_or_else(|| {
            if id.as_u64() != 0 && id.as_u64() < self.next_id {
                DatabaseError::TxnNotActive(id)
            } else {
                DatabaseError::TxnNotFound(id)
            }
        })?;
        txn.state = state;
        tracing::debug!("Transaction {} of pid {} {:?}", txn.id, txn.pid, txn.state);
        Ok(txn)
    }
}
