//! System tables created when an engine starts.
//!
//! ```text
//!  id  table            owner
//!  0   SystemTable      kernel   key/value boot metadata
//!  1   ProcessTable     kernel
//!  2   CapabilityTable  kernel
//!  3   ObjectTable      users    the only user-writable table
//!  4   MessageTable     kernel
//!  5   AuditTable       kernel   appended to by every mutation
//! ```

use vault_common::types::TableId;
use vault_storage::{ColumnDef, ColumnType, FieldValue, Record, StorageEngine, TableSchema};

use super::error::DatabaseResult;
use crate::config::BootConfig;

/// Key/value boot metadata.
pub const SYSTEM_TABLE: TableId = TableId::new(0);
/// Process records.
pub const PROCESS_TABLE: TableId = TableId::new(1);
/// Capability records.
pub const CAPABILITY_TABLE: TableId = TableId::new(2);
/// Named objects owned by processes.
pub const OBJECT_TABLE: TableId = TableId::new(3);
/// Inter-process messages.
pub const MESSAGE_TABLE: TableId = TableId::new(4);
/// Audit trail.
pub const AUDIT_TABLE: TableId = TableId::new(5);

/// Number of tables created at boot.
pub const SYSTEM_TABLE_COUNT: usize = 6;

/// Schemas of the boot tables, in table id order.
pub fn system_schemas() -> Vec<TableSchema> {
    use ColumnType::{Bool, Str, U32, U64};

    vec![
        TableSchema::new("SystemTable")
            .system()
            .column(ColumnDef::new("id", U64).primary_key())
            .column(ColumnDef::new("key", Str).not_null())
            .column(ColumnDef::new("value", Str))
            .column(ColumnDef::new("created", U64)),
        TableSchema::new("ProcessTable")
            .system()
            .column(ColumnDef::new("pid", U64).primary_key())
            .column(ColumnDef::new("name", Str))
            .column(ColumnDef::new("state", Str))
            .column(ColumnDef::new("priority", U32))
            .column(ColumnDef::new("cap_root", U64))
            .column(ColumnDef::new("created", U64)),
        TableSchema::new("CapabilityTable")
            .system()
            .column(ColumnDef::new("cap_id", U64).primary_key())
            .column(ColumnDef::new("object_id", U64))
            .column(ColumnDef::new("owner_pid", U64))
            .column(ColumnDef::new("rights", U32))
            .column(ColumnDef::new("parent_id", U64))
            .column(ColumnDef::new("revoked", Bool))
            .column(ColumnDef::new("created", U64)),
        TableSchema::new("ObjectTable")
            .column(ColumnDef::new("obj_id", U64).primary_key())
            .column(ColumnDef::new("name", Str).not_null())
            .column(ColumnDef::new("type", Str))
            .column(ColumnDef::new("data", Str))
            .column(ColumnDef::new("owner_pid", U64))
            .column(ColumnDef::new("size", U64))
            .column(ColumnDef::new("created", U64)),
        TableSchema::new("MessageTable")
            .system()
            .column(ColumnDef::new("msg_id", U64).primary_key())
            .column(ColumnDef::new("src_pid", U64))
            .column(ColumnDef::new("dst_pid", U64))
            .column(ColumnDef::new("type", Str))
            .column(ColumnDef::new("payload", Str))
            .column(ColumnDef::new("delivered", Bool)),
        TableSchema::new("AuditTable")
            .system()
            .column(ColumnDef::new("audit_id", U64).primary_key())
            .column(ColumnDef::new("timestamp", U64))
            .column(ColumnDef::new("pid", U64))
            .column(ColumnDef::new("action", Str))
            .column(ColumnDef::new("target_id", U64))
            .column(ColumnDef::new("result", Str)),
    ]
}

/// Creates the system tables and seeds `SystemTable`.
///
/// Must run on an empty storage engine so the tables receive ids 0 to 5.
pub fn bootstrap(storage: &mut StorageEngine, boot: &BootConfig) -> DatabaseResult<()> {
    for schema in system_schemas() {
        storage.create_table(schema)?;
    }

    let seeds = [
        ("os.name", boot.os_name.as_str()),
        ("os.version", boot.os_version.as_str()),
        ("os.philosophy", boot.philosophy.as_str()),
    ];
    for (key, value) in seeds {
        let row_id = storage.allocate_row_id()?;
        storage.insert(&Record::new(
            row_id,
            SYSTEM_TABLE,
            vec![
                FieldValue::U64(row_id.as_u64()),
                FieldValue::Str(key.to_string()),
                FieldValue::Str(value.to_string()),
                FieldValue::U64(0),
            ],
        ))?;
    }

    tracing::info!(
        "Bootstrapped {} system tables for {} {}",
        SYSTEM_TABLE_COUNT,
        boot.os_name,
        boot.os_version
    );
    Ok(())
}
