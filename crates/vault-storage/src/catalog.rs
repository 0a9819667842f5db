//! Table catalog for schema management.
//!
//! The catalog stores immutable table schemas. Table ids are dense and
//! assigned in creation order from 0, so a table id is also the index of
//! the table in the catalog. There is no DROP or ALTER.

use std::sync::Arc;

use vault_common::constants::{MAX_COLUMNS, MAX_COLUMN_NAME, MAX_TABLE_NAME};
use vault_common::types::{RowId, TableId};

use crate::error::{StorageError, StorageResult};
use crate::record::{ColumnType, Record};

/// A column definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    /// Column name.
    pub name: String,
    /// Column type.
    pub column_type: ColumnType,
    /// Part of the primary key.
    pub primary_key: bool,
    /// Must be given a value on insert.
    pub not_null: bool,
    /// Marked as indexed.
    pub indexed: bool,
}

impl ColumnDef {
    /// Creates a nullable, unindexed column.
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            primary_key: false,
            not_null: false,
            indexed: false,
        }
    }

    /// Marks the column as the primary key (implies not-null and indexed).
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.not_null = true;
        self.indexed = true;
        self
    }

    /// Marks the column as not-null.
    pub fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    /// Marks the column as indexed.
    pub fn indexed(mut self) -> Self {
        self.indexed = true;
        self
    }
}

/// A table schema.
///
/// # Example
///
/// ```rust
/// use vault_storage::{ColumnDef, ColumnType, TableSchema};
///
/// let schema = TableSchema::new("users")
///     .column(ColumnDef::new("id", ColumnType::U64).primary_key())
///     .column(ColumnDef::new("name", ColumnType::Str).not_null());
///
/// assert_eq!(schema.column_index("NAME"), Some(1));
/// assert!(schema.encrypted);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
    /// Table id, assigned by the catalog.
    pub id: TableId,
    /// Table name.
    pub name: String,
    /// Columns in storage order.
    pub columns: Vec<ColumnDef>,
    /// Records are encrypted at rest.
    pub encrypted: bool,
    /// Kernel-owned system table.
    pub system: bool,
}

impl TableSchema {
    /// Creates an empty encrypted user table schema.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: TableId::new(0),
            name: name.into(),
            columns: Vec::new(),
            encrypted: true,
            system: false,
        }
    }

    /// Appends a column.
    pub fn column(mut self, column: ColumnDef) -> Self {
        self.columns.push(column);
        self
    }

    /// Marks the table as a system table.
    pub fn system(mut self) -> Self {
        self.system = true;
        self
    }

    /// Stores records authenticated but unencrypted.
    pub fn unencrypted(mut self) -> Self {
        self.encrypted = false;
        self
    }

    /// Returns the index of a column, matching names case-insensitively.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// Returns the index of the first primary key column.
    pub fn primary_key_index(&self) -> Option<usize> {
        self.columns.iter().position(|c| c.primary_key)
    }

    /// Returns a record with every field set to its type's zero value.
    pub fn blank_record(&self, row_id: RowId) -> Record {
        Record::new(
            row_id,
            self.id,
            self.columns.iter().map(|c| c.column_type.zero_value()).collect(),
        )
    }

    /// Validates names, column count and column uniqueness.
    pub fn validate(&self) -> StorageResult<()> {
        if self.name.is_empty() || self.name.len() > MAX_TABLE_NAME {
            return Err(StorageError::InvalidSchema(format!(
                "table name must be 1..={MAX_TABLE_NAME} bytes"
            )));
        }
        if self.columns.is_empty() || self.columns.len() > MAX_COLUMNS {
            return Err(StorageError::InvalidSchema(format!(
                "table {} must have 1..={MAX_COLUMNS} columns",
                self.name
            )));
        }
        for (i, column) in self.columns.iter().enumerate() {
            if column.name.is_empty() || column.name.len() > MAX_COLUMN_NAME {
                return Err(StorageError::InvalidSchema(format!(
                    "column name must be 1..={MAX_COLUMN_NAME} bytes"
                )));
            }
            if self.columns[..i]
                .iter()
                .any(|c| c.name.eq_ignore_ascii_case(&column.name))
            {
                return Err(StorageError::InvalidSchema(format!(
                    "duplicate column: {}",
                    column.name
                )));
            }
        }
        Ok(())
    }

    /// Checks that a record belongs to this table and matches its columns.
    pub fn check_record(&self, record: &Record) -> StorageResult<()> {
        if record.table_id != self.id {
            return Err(StorageError::SchemaMismatch(format!(
                "record for table {} stored in table {}",
                record.table_id, self.id
            )));
        }
        if record.fields.len() != self.columns.len() {
            return Err(StorageError::SchemaMismatch(format!(
                "expected {} fields, got {}",
                self.columns.len(),
                record.fields.len()
            )));
        }
        for (field, column) in record.fields.iter().zip(&self.columns) {
            if field.column_type() != column.column_type {
                return Err(StorageError::SchemaMismatch(format!(
                    "column {} expects {}, got {}",
                    column.name,
                    column.column_type,
                    field.column_type()
                )));
            }
        }
        Ok(())
    }
}

/// Table catalog.
#[derive(Debug)]
pub struct Catalog {
    tables: Vec<Arc<TableSchema>>,
    max_tables: usize,
}

impl Catalog {
    /// Creates an empty catalog holding at most `max_tables` tables.
    pub fn new(max_tables: usize) -> Self {
        Self {
            tables: Vec::new(),
            max_tables,
        }
    }

    /// Registers a table, assigning the next table id.
    pub fn create(&mut self, mut schema: TableSchema) -> StorageResult<Arc<TableSchema>> {
        schema.validate()?;
        if self.find(&schema.name).is_some() {
            return Err(StorageError::TableExists(schema.name));
        }
        if self.tables.len() >= self.max_tables {
            return Err(StorageError::CatalogFull {
                max: self.max_tables,
            });
        }

        let id = u32::try_from(self.tables.len()).map_err(|_| StorageError::CatalogFull {
            max: self.max_tables,
        })?;
        schema.id = TableId::new(id);
        let schema = Arc::new(schema);
        self.tables.push(Arc::clone(&schema));
        Ok(schema)
    }

    /// Gets a table by id.
    pub fn get(&self, id: TableId) -> Option<&Arc<TableSchema>> {
        self.tables.get(id.index())
    }

    /// Finds a table by name, case-insensitively.
    pub fn find(&self, name: &str) -> Option<&Arc<TableSchema>> {
        self.tables
            .iter()
            .find(|t| t.name.eq_ignore_ascii_case(name))
    }

    /// Iterates tables in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<TableSchema>> {
        self.tables.iter()
    }

    /// Returns the number of tables.
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Returns true if no table exists.
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}
