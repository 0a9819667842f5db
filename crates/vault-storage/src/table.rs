//! Per-table encrypted storage.
//!
//! `EncryptedTable` wraps a B-tree of sealed envelopes. Plaintext records go
//! in and come out, but only ciphertext is ever stored, and a record is only
//! returned after its MAC verifies.

use std::ops::ControlFlow;
use std::sync::Arc;

use vault_common::platform::RandomSource;
use vault_common::types::{RowId, TableId};

use crate::btree::{BTree, TreeStats};
use crate::catalog::TableSchema;
use crate::crypto::{self, EncryptedRecord, TableKeys};
use crate::error::StorageResult;
use crate::record::Record;

/// A table's envelopes, keys and schema.
#[derive(Debug)]
pub struct EncryptedTable {
    schema: Arc<TableSchema>,
    keys: TableKeys,
    tree: BTree<EncryptedRecord>,
}

impl EncryptedTable {
    /// Creates an empty table.
    pub fn new(schema: Arc<TableSchema>, keys: TableKeys, order: usize) -> StorageResult<Self> {
        Ok(Self {
            schema,
            keys,
            tree: BTree::new(order)?,
        })
    }

    /// Returns the table schema.
    pub fn schema(&self) -> &Arc<TableSchema> {
        &self.schema
    }

    /// Returns the table id.
    pub fn id(&self) -> TableId {
        self.schema.id
    }

    /// Returns the number of stored rows.
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    /// Returns true if the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Returns index statistics.
    pub fn stats(&self) -> TreeStats {
        self.tree.stats()
    }

    // =========================================================================
    // Row Operations
    // =========================================================================

    /// Seals and stores a record under its row id.
    pub fn insert(&mut self, record: &Record, rng: &mut dyn RandomSource) -> StorageResult<()> {
        self.schema.check_record(record)?;
        let envelope = crypto::seal(&self.keys, record, self.schema.encrypted, rng)?;
        self.tree.insert(record.row_id.as_u64(), envelope);
        Ok(())
    }

    /// Reads a record.
    ///
    /// Returns `None` both for missing rows and for rows that fail
    /// verification.
    pub fn get(&self, row_id: RowId) -> Option<Record> {
        let envelope = self.tree.search(row_id.as_u64())?;
        self.open(envelope)
    }

    /// Deletes a record, returning true if it existed.
    pub fn delete(&mut self, row_id: RowId) -> bool {
        self.tree.delete(row_id.as_u64()).is_some()
    }

    /// Replaces a stored record with a freshly sealed one.
    ///
    /// The old envelope is removed and the new one gets a new IV. Returns
    /// false if the row does not exist.
    pub fn update(&mut self, record: &Record, rng: &mut dyn RandomSource) -> StorageResult<bool> {
        let key = record.row_id.as_u64();
        if !self.tree.contains_key(key) {
            return Ok(false);
        }
        self.schema.check_record(record)?;
        let envelope = crypto::seal(&self.keys, record, self.schema.encrypted, rng)?;
        self.tree.delete(key);
        self.tree.insert(key, envelope);
        Ok(true)
    }

    /// Visits every readable record in row id order.
    ///
    /// Rows that fail verification are skipped.
    pub fn scan<B, F>(&self, mut f: F) -> ControlFlow<B>
    where
        F: FnMut(Record) -> ControlFlow<B>,
    {
        self.tree.scan(|_, envelope| match self.open(envelope) {
            Some(record) => f(record),
            None => ControlFlow::Continue(()),
        })
    }

    /// Collects every readable record in row id order.
    pub fn records(&self) -> Vec<Record> {
        self.tree
            .iter()
            .filter_map(|(_, envelope)| self.open(envelope))
            .collect()
    }

    // =========================================================================
    // Envelope Access
    // =========================================================================

    /// Returns the stored envelope for a row.
    pub fn envelope(&self, row_id: RowId) -> Option<&EncryptedRecord> {
        self.tree.search(row_id.as_u64())
    }

    /// Returns the stored envelope for a row, mutably.
    pub fn envelope_mut(&mut self, row_id: RowId) -> Option<&mut EncryptedRecord> {
        self.tree.search_mut(row_id.as_u64())
    }

    fn open(&self, envelope: &EncryptedRecord) -> Option<Record> {
        match crypto::open(&self.keys, envelope, self.schema.encrypted) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(
                    "Skipping unreadable row {} in table {}: {}",
                    envelope.row_id,
                    self.schema.name,
                    e
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Catalog, ColumnDef};
    use crate::crypto::MasterKey;
    use crate::record::{ColumnType, FieldValue};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn table(encrypted: bool) -> EncryptedTable {
        let mut schema = TableSchema::new("notes")
            .column(ColumnDef::new("id", ColumnType::U64).primary_key())
            .column(ColumnDef::new("body", ColumnType::Str));
        if !encrypted {
            schema = schema.unencrypted();
        }
        let schema = Catalog::new(1).create(schema).unwrap();
        let keys = MasterKey::from_bytes([3; 32]).derive(schema.id).unwrap();
        EncryptedTable::new(schema, keys, 4).unwrap()
    }

    fn note(id: u64, body: &str) -> Record {
        Record::new(
            RowId::new(id),
            TableId::new(0),
            vec![FieldValue::U64(id), FieldValue::Str(body.into())],
        )
    }

    #[test]
    fn test_insert_get_delete() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut table = table(true);
        table.insert(&note(1, "a"), &mut rng).unwrap();
        table.insert(&note(2, "b"), &mut rng).unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.get(RowId::new(2)), Some(note(2, "b")));
        assert!(table.delete(RowId::new(2)));
        assert!(!table.delete(RowId::new(2)));
        assert_eq!(table.get(RowId::new(2)), None);
    }

    #[test]
    fn test_insert_rejects_schema_mismatch() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut table = table(true);
        let bad = Record::new(RowId::new(1), TableId::new(0), vec![FieldValue::U64(1)]);
        assert!(table.insert(&bad, &mut rng).is_err());
        assert!(table.is_empty());
    }

    #[test]
    fn test_update_reseals() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut table = table(true);
        table.insert(&note(1, "old"), &mut rng).unwrap();
        let before = table.envelope(RowId::new(1)).unwrap().clone();

        assert!(table.update(&note(1, "new"), &mut rng).unwrap());
        let after = table.envelope(RowId::new(1)).unwrap();
        assert_ne!(before.iv, after.iv);
        assert_eq!(table.get(RowId::new(1)), Some(note(1, "new")));
        assert!(!table.update(&note(9, "missing"), &mut rng).unwrap());
    }

    #[test]
    fn test_tampered_rows_are_hidden() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut table = table(true);
        for id in 1..=5 {
            table.insert(&note(id, "x"), &mut rng).unwrap();
        }
        table.envelope_mut(RowId::new(3)).unwrap().mac[0] ^= 0xff;

        assert_eq!(table.get(RowId::new(3)), None);
        let ids: Vec<u64> = table.records().iter().map(|r| r.row_id.as_u64()).collect();
        assert_eq!(ids, vec![1, 2, 4, 5]);
    }

    #[test]
    fn test_scan_in_order_and_stoppable() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut table = table(false);
        for id in [5u64, 3, 9, 1, 7] {
            table.insert(&note(id, "x"), &mut rng).unwrap();
        }
        let mut seen = Vec::new();
        let _ = table.scan(|record| {
            seen.push(record.row_id.as_u64());
            if seen.len() == 3 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });
        assert_eq!(seen, vec![1, 3, 5]);
    }
}
