//! Statement execution.
//!
//! An [`Executor`] runs one parsed statement for one caller against engine
//! state the caller of `run` has already locked. Every table access goes
//! through [`Executor::resolve`], which checks the caller's capabilities
//! before anything about the table is disclosed.

use std::ops::ControlFlow;
use std::sync::Arc;

use vault_cap::{CapabilityManager, ObjectType, Rights};
use vault_common::types::{CapId, ProcessId, RowId};
use vault_sql::parser::{
    DeleteStatement, GrantStatement, InsertStatement, Privilege, Projection, RevokeStatement,
    SelectStatement, Statement, UpdateStatement,
};
use vault_storage::{ColumnType, FieldValue, Record, StorageEngine, TableSchema};

use super::audit;
use super::coerce::{coerce, unsigned};
use super::error::{DatabaseError, DatabaseResult};
use super::predicate::Predicate;
use super::result::{QueryResult, ResultColumn, ResultSet};

/// Columns filled from the calling context on INSERT.
const OWNER_COLUMN: &str = "owner_pid";
const CREATED_COLUMN: &str = "created";
const SIZE_COLUMN: &str = "size";
const DATA_COLUMN: &str = "data";

/// Executes statements on behalf of one process.
pub(crate) struct Executor<'a> {
    storage: &'a mut StorageEngine,
    caps: &'a mut CapabilityManager,
    pid: ProcessId,
    now: u64,
}

impl<'a> Executor<'a> {
    pub fn new(
        storage: &'a mut StorageEngine,
        caps: &'a mut CapabilityManager,
        pid: ProcessId,
        now: u64,
    ) -> Self {
        Self {
            storage,
            caps,
            pid,
            now,
        }
    }

    /// Runs a statement.
    pub fn run(&mut self, statement: Statement) -> DatabaseResult<QueryResult> {
        match statement {
            Statement::Select(stmt) => self.select(&stmt),
            Statement::Insert(stmt) => self.insert(&stmt),
            Statement::Update(stmt) => self.update(&stmt),
            Statement::Delete(stmt) => self.delete(&stmt),
            Statement::ShowTables => Ok(self.show_tables()),
            Statement::Describe(table) => self.describe(&table),
            Statement::Grant(stmt) => self.grant(&stmt),
            Statement::Revoke(stmt) => Ok(self.revoke(stmt)),
        }
    }

    // =========================================================================
    // Authorization
    // =========================================================================

    /// Looks up a table the caller holds `required` rights on.
    ///
    /// A non-kernel caller cannot tell a missing table from a forbidden one.
    fn resolve(&mut self, name: &str, required: Rights) -> DatabaseResult<Arc<TableSchema>> {
        let denied = || DatabaseError::PermissionDenied {
            pid: self.pid,
            table: name.to_string(),
        };

        let Some(schema) = self.storage.catalog().find(name).cloned() else {
            return Err(if self.pid.is_kernel() {
                DatabaseError::TableNotFound(name.to_string())
            } else {
                denied()
            });
        };

        let writes = required.intersects(Rights::WRITE | Rights::DELETE);
        if schema.system && writes && !self.pid.is_kernel() {
            return Err(denied());
        }
        if !self.caps.check(self.pid, schema.id.object_id(), required) {
            return Err(denied());
        }
        Ok(schema)
    }

    /// Records an audit entry. A failed write is logged, not returned.
    fn audit(&mut self, action: &str, target_id: u64, result: &str) {
        if let Err(e) = audit::append(self.storage, self.now, self.pid, action, target_id, result)
        {
            tracing::warn!("Failed to audit {} by pid {}: {}", action, self.pid, e);
        }
    }

    /// Returns every record of `schema` that satisfies `predicate`.
    fn matching(&self, schema: &TableSchema, predicate: &Predicate) -> DatabaseResult<Vec<Record>> {
        let mut records = Vec::new();
        let _ = self.storage.scan(schema.id, |record| {
            if predicate.matches(&record) {
                records.push(record);
            }
            ControlFlow::<()>::Continue(())
        })?;
        Ok(records)
    }

    // =========================================================================
    // Queries
    // =========================================================================

    fn select(&mut self, stmt: &SelectStatement) -> DatabaseResult<QueryResult> {
        let schema = self.resolve(&stmt.table, Rights::READ)?;
        let predicate = Predicate::bind(&schema, &stmt.conditions)?;

        let indexes: Vec<usize> = match &stmt.projection {
            Projection::All => (0..schema.columns.len()).collect(),
            Projection::Columns(names) => names
                .iter()
                .map(|name| {
                    schema
                        .column_index(name)
                        .ok_or_else(|| DatabaseError::UnknownColumn(name.clone()))
                })
                .collect::<DatabaseResult<_>>()?,
        };

        let mut rows = ResultSet::new(
            indexes
                .iter()
                .map(|&i| ResultColumn::from(&schema.columns[i]))
                .collect(),
        );
        for record in self.matching(&schema, &predicate)? {
            rows.push(indexes.iter().map(|&i| record.fields[i].clone()).collect());
        }
        Ok(QueryResult::Rows(rows))
    }

    fn show_tables(&self) -> QueryResult {
        let mut rows = ResultSet::new(vec![
            ResultColumn::new("id", ColumnType::U64),
            ResultColumn::new("table_name", ColumnType::Str),
            ResultColumn::new("columns", ColumnType::U64),
        ]);
        for schema in self.storage.catalog().iter() {
            rows.push(vec![
                FieldValue::U64(schema.id.object_id()),
                FieldValue::Str(schema.name.clone()),
                FieldValue::U64(schema.columns.len() as u64),
            ]);
        }
        QueryResult::Rows(rows)
    }

    fn describe(&mut self, table: &str) -> DatabaseResult<QueryResult> {
        let schema = self.resolve(table, Rights::READ)?;
        let yes_no = |flag: bool| FieldValue::Str(if flag { "YES" } else { "NO" }.to_string());

        let mut rows = ResultSet::new(
            ["name", "type", "pk", "not_null"]
                .into_iter()
                .map(|name| ResultColumn::new(name, ColumnType::Str))
                .collect(),
        );
        for column in &schema.columns {
            rows.push(vec![
                FieldValue::Str(column.name.clone()),
                FieldValue::Str(column.column_type.name().to_string()),
                yes_no(column.primary_key),
                yes_no(column.not_null),
            ]);
        }
        Ok(QueryResult::Rows(rows))
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    fn insert(&mut self, stmt: &InsertStatement) -> DatabaseResult<QueryResult> {
        let schema = self.resolve(&stmt.table, Rights::WRITE)?;

        let mut given: Vec<Option<FieldValue>> = vec![None; schema.columns.len()];
        for (name, literal) in stmt.columns.iter().zip(&stmt.values) {
            let index = schema
                .column_index(name)
                .ok_or_else(|| DatabaseError::UnknownColumn(name.clone()))?;
            if given[index].is_some() {
                return Err(DatabaseError::DuplicateColumn(name.clone()));
            }
            given[index] = Some(coerce(&schema.columns[index], literal)?);
        }

        let auto_key = schema.columns[0].primary_key && is_integer(schema.columns[0].column_type);
        for (index, column) in schema.columns.iter().enumerate() {
            let filled = (index == 0 && auto_key) || is_context_column(&schema, index);
            if column.not_null && given[index].is_none() && !filled {
                return Err(DatabaseError::MissingValue(column.name.clone()));
            }
        }

        let row_id = self.storage.allocate_row_id()?;
        let mut record = schema.blank_record(row_id);
        if auto_key && given[0].is_none() {
            record.fields[0] = unsigned(&schema.columns[0], row_id.as_u64())?;
        }
        for (field, value) in record.fields.iter_mut().zip(given) {
            if let Some(value) = value {
                *field = value;
            }
        }
        self.fill_context_columns(&schema, &mut record)?;

        self.storage.insert(&record)?;
        self.audit("INSERT", row_id.as_u64(), "OK");
        Ok(QueryResult::Message(format!(
            "1 row inserted (row_id={row_id})"
        )))
    }

    /// Sets `owner_pid`, `created` and `size` from the calling context.
    fn fill_context_columns(&self, schema: &TableSchema, record: &mut Record) -> DatabaseResult<()> {
        if let Some(i) = unsigned_column(schema, OWNER_COLUMN) {
            record.fields[i] = unsigned(&schema.columns[i], self.pid.as_u64())?;
        }
        if let Some(i) = unsigned_column(schema, CREATED_COLUMN) {
            record.fields[i] = unsigned(&schema.columns[i], self.now)?;
        }
        if let (Some(size), Some(data)) = (
            unsigned_column(schema, SIZE_COLUMN),
            schema.column_index(DATA_COLUMN),
        ) {
            let len = record.fields[data].as_bytes().map_or(0, <[u8]>::len);
            record.fields[size] = unsigned(&schema.columns[size], len as u64)?;
        }
        Ok(())
    }

    fn update(&mut self, stmt: &UpdateStatement) -> DatabaseResult<QueryResult> {
        let schema = self.resolve(&stmt.table, Rights::WRITE)?;
        let predicate = Predicate::bind(&schema, &stmt.conditions)?;

        let mut assignments: Vec<(usize, FieldValue)> = Vec::with_capacity(stmt.assignments.len());
        for assignment in &stmt.assignments {
            let index = schema
                .column_index(&assignment.column)
                .ok_or_else(|| DatabaseError::UnknownColumn(assignment.column.clone()))?;
            if assignments.iter().any(|(i, _)| *i == index) {
                return Err(DatabaseError::DuplicateColumn(assignment.column.clone()));
            }
            assignments.push((index, coerce(&schema.columns[index], &assignment.value)?));
        }

        let mut updated = 0usize;
        for mut record in self.matching(&schema, &predicate)? {
            for (index, value) in &assignments {
                record.fields[*index] = value.clone();
            }
            if self.storage.update(&record)? {
                updated += 1;
            }
        }

        self.audit("UPDATE", 0, "OK");
        Ok(QueryResult::Message(format!("{updated} row(s) updated")))
    }

    fn delete(&mut self, stmt: &DeleteStatement) -> DatabaseResult<QueryResult> {
        let schema = self.resolve(&stmt.table, Rights::DELETE)?;
        let predicate = Predicate::bind(&schema, &stmt.conditions)?;

        let targets: Vec<RowId> = self
            .matching(&schema, &predicate)?
            .into_iter()
            .map(|record| record.row_id)
            .collect();

        let mut deleted = 0usize;
        for row_id in targets {
            if self.storage.delete(schema.id, row_id)? {
                deleted += 1;
                self.audit("DELETE", row_id.as_u64(), "OK");
            }
        }
        Ok(QueryResult::Message(format!("{deleted} row(s) deleted")))
    }

    // =========================================================================
    // Capabilities
    // =========================================================================

    fn grant(&mut self, stmt: &GrantStatement) -> DatabaseResult<QueryResult> {
        let rights = stmt
            .privileges
            .iter()
            .fold(Rights::empty(), |acc, p| acc | privilege_rights(*p));
        let target = ProcessId::new(stmt.target_pid);

        let cap_id = if self.pid.is_kernel() {
            self.caps
                .create(stmt.object_id, ObjectType::Table, target, rights, CapId::NONE)?
        } else {
            let parent = self
                .caps
                .find_grantable(self.pid, stmt.object_id)
                .ok_or_else(|| DatabaseError::PermissionDenied {
                    pid: self.pid,
                    table: format!("object {}", stmt.object_id),
                })?;
            self.caps.grant(self.pid, parent, target, rights)?
        };

        let granted = self.caps.get(cap_id).map_or(rights, |cap| cap.rights);
        self.audit("GRANT", cap_id.as_u64(), "OK");
        Ok(QueryResult::Message(format!(
            "Granted rights 0x{:x} on object {} to pid {} (cap_id={})",
            granted.bits(),
            stmt.object_id,
            target,
            cap_id
        )))
    }

    fn revoke(&mut self, stmt: RevokeStatement) -> QueryResult {
        let cap_id = CapId::new(stmt.cap_id);
        match self.caps.revoke(self.pid, cap_id) {
            Ok(_) => {
                self.audit("REVOKE", stmt.cap_id, "OK");
                QueryResult::Message(format!("Capability {cap_id} revoked (cascade)"))
            }
            Err(e) => {
                self.audit("REVOKE", stmt.cap_id, "DENIED");
                tracing::warn!("Revoke of cap {} by pid {} failed: {}", cap_id, self.pid, e);
                let code = e.code();
                QueryResult::error(code, format!("Revoke failed: {}", code.describe()))
            }
        }
    }
}

fn privilege_rights(privilege: Privilege) -> Rights {
    match privilege {
        Privilege::Read => Rights::READ,
        Privilege::Write => Rights::WRITE,
        Privilege::Execute => Rights::EXECUTE,
        Privilege::Delete => Rights::DELETE,
        Privilege::Grant => Rights::GRANT,
        Privilege::Revoke => Rights::REVOKE,
        Privilege::All => Rights::ALL,
    }
}

fn is_integer(column_type: ColumnType) -> bool {
    column_type.is_unsigned() || column_type == ColumnType::I64
}

fn unsigned_column(schema: &TableSchema, name: &str) -> Option<usize> {
    schema
        .column_index(name)
        .filter(|&i| schema.columns[i].column_type.is_unsigned())
}

/// True for columns INSERT fills from the calling context.
fn is_context_column(schema: &TableSchema, index: usize) -> bool {
    [OWNER_COLUMN, CREATED_COLUMN]
        .into_iter()
        .any(|name| unsigned_column(schema, name) == Some(index))
        || (unsigned_column(schema, SIZE_COLUMN) == Some(index)
            && schema.column_index(DATA_COLUMN).is_some())
}
