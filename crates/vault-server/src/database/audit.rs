//! Audit trail.
//!
//! Entries are plain rows of `AuditTable`, written straight to storage so
//! that recording an entry never produces another one. The action and
//! result columns are NUL-padded to a fixed width.

use vault_common::constants::AUDIT_FIELD_WIDTH;
use vault_common::types::{ProcessId, RowId};
use vault_storage::{FieldValue, Record, StorageEngine, StorageResult};

use super::bootstrap::AUDIT_TABLE;

/// Appends one audit entry and returns its row id.
pub(crate) fn append(
    storage: &mut StorageEngine,
    now: u64,
    pid: ProcessId,
    action: &str,
    target_id: u64,
    result: &str,
) -> StorageResult<RowId> {
    let row_id = storage.allocate_row_id()?;
    storage.insert(&Record::new(
        row_id,
        AUDIT_TABLE,
        vec![
            FieldValue::U64(row_id.as_u64()),
            FieldValue::U64(now),
            FieldValue::U64(pid.as_u64()),
            FieldValue::Str(pad(action)),
            FieldValue::U64(target_id),
            FieldValue::Str(pad(result)),
        ],
    ))?;
    Ok(row_id)
}

/// Truncates to the field width on a char boundary, then pads with NUL.
fn pad(text: &str) -> String {
    let mut end = text.len().min(AUDIT_FIELD_WIDTH);
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    let mut padded = String::with_capacity(AUDIT_FIELD_WIDTH);
    padded.push_str(&text[..end]);
    padded.extend(std::iter::repeat('\0').take(AUDIT_FIELD_WIDTH - end));
    padded
}
