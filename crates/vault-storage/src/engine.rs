//! Storage engine managing every table.
//!
//! `StorageEngine` owns the catalog, one [`EncryptedTable`] per table, the
//! master key the per-table keys derive from, the random source used for
//! IVs, and the process-wide row id counter.

use std::ops::ControlFlow;
use std::sync::Arc;

use vault_common::config::StorageConfig;
use vault_common::platform::RandomSource;
use vault_common::types::{RowId, TableId};

use crate::catalog::{Catalog, TableSchema};
use crate::crypto::{EncryptedRecord, MasterKey};
use crate::error::{StorageError, StorageResult};
use crate::record::Record;
use crate::table::EncryptedTable;

/// Storage engine that manages all tables.
pub struct StorageEngine {
    config: StorageConfig,
    catalog: Catalog,
    tables: Vec<EncryptedTable>,
    master: MasterKey,
    rng: Box<dyn RandomSource>,
    next_row_id: RowId,
}

impl StorageEngine {
    /// Creates an engine, drawing a fresh master key from `rng`.
    pub fn new(config: StorageConfig, mut rng: Box<dyn RandomSource>) -> StorageResult<Self> {
        config.validate().map_err(StorageError::InvalidConfig)?;
        let master = MasterKey::generate(rng.as_mut());
        Ok(Self {
            catalog: Catalog::new(config.max_tables),
            tables: Vec::with_capacity(config.max_tables),
            config,
            master,
            rng,
            next_row_id: RowId::FIRST,
        })
    }

    /// Returns the storage configuration.
    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    /// Returns the catalog.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Returns the random source.
    pub fn rng(&mut self) -> &mut dyn RandomSource {
        self.rng.as_mut()
    }

    // =========================================================================
    // Tables
    // =========================================================================

    /// Creates a table and derives its keys.
    pub fn create_table(&mut self, schema: TableSchema) -> StorageResult<Arc<TableSchema>> {
        let schema = self.catalog.create(schema)?;
        let keys = self.master.derive(schema.id)?;
        self.tables.push(EncryptedTable::new(
            Arc::clone(&schema),
            keys,
            self.config.btree_order,
        )?);
        tracing::info!(
            "Created table {} (id={}, columns={}, encrypted={})",
            schema.name,
            schema.id,
            schema.columns.len(),
            schema.encrypted
        );
        Ok(schema)
    }

    /// Gets a table by id.
    pub fn table(&self, id: TableId) -> StorageResult<&EncryptedTable> {
        self.tables.get(id.index()).ok_or(StorageError::TableNotFound(id))
    }

    /// Gets a table by id, mutably.
    pub fn table_mut(&mut self, id: TableId) -> StorageResult<&mut EncryptedTable> {
        self.tables
            .get_mut(id.index())
            .ok_or(StorageError::TableNotFound(id))
    }

    /// Iterates tables in id order.
    pub fn tables(&self) -> impl Iterator<Item = &EncryptedTable> {
        self.tables.iter()
    }

    // =========================================================================
    // Rows
    // =========================================================================

    /// Allocates the next global row id.
    pub fn allocate_row_id(&mut self) -> StorageResult<RowId> {
        let id = self.next_row_id;
        if id.as_u64() == u64::MAX {
            return Err(StorageError::RowIdsExhausted);
        }
        self.next_row_id = id.next();
        Ok(id)
    }

    /// Returns the row id the next insert will receive.
    pub fn peek_row_id(&self) -> RowId {
        self.next_row_id
    }

    /// Inserts a record into its table.
    pub fn insert(&mut self, record: &Record) -> StorageResult<()> {
        let table = self
            .tables
            .get_mut(record.table_id.index())
            .ok_or(StorageError::TableNotFound(record.table_id))?;
        table.insert(record, self.rng.as_mut())
    }

    /// Reads a record.
    pub fn get(&self, table_id: TableId, row_id: RowId) -> StorageResult<Option<Record>> {
        Ok(self.table(table_id)?.get(row_id))
    }

    /// Deletes a record.
    pub fn delete(&mut self, table_id: TableId, row_id: RowId) -> StorageResult<bool> {
        Ok(self.table_mut(table_id)?.delete(row_id))
    }

    /// Re-seals an existing record with new contents.
    pub fn update(&mut self, record: &Record) -> StorageResult<bool> {
        let table = self
            .tables
            .get_mut(record.table_id.index())
            .ok_or(StorageError::TableNotFound(record.table_id))?;
        table.update(record, self.rng.as_mut())
    }

    /// Visits every readable record of a table.
    pub fn scan<B, F>(&self, table_id: TableId, f: F) -> StorageResult<ControlFlow<B>>
    where
        F: FnMut(Record) -> ControlFlow<B>,
    {
        Ok(self.table(table_id)?.scan(f))
    }

    /// Returns the stored envelope for a row.
    pub fn envelope(&self, table_id: TableId, row_id: RowId) -> Option<&EncryptedRecord> {
        self.tables.get(table_id.index())?.envelope(row_id)
    }

    /// Returns the stored envelope for a row, mutably.
    pub fn envelope_mut(&mut self, table_id: TableId, row_id: RowId) -> Option<&mut EncryptedRecord> {
        self.tables.get_mut(table_id.index())?.envelope_mut(row_id)
    }
}

impl std::fmt::Debug for StorageEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageEngine")
            .field("config", &self.config)
            .field("tables", &self.catalog.len())
            .field("next_row_id", &self.next_row_id)
            .finish_non_exhaustive()
    }
}
