//! Literal to field conversion for INSERT and UPDATE.

use vault_sql::parser::Literal;
use vault_storage::{ColumnDef, ColumnType, FieldValue};

use super::error::{DatabaseError, DatabaseResult};

/// Converts a literal to a value of `column`'s type.
///
/// STR and BLOB take strings. Integer columns take numbers, range-checked,
/// or strings holding a number. BOOL takes 0, 1, 'true' or 'false'.
pub(crate) fn coerce(column: &ColumnDef, literal: &Literal) -> DatabaseResult<FieldValue> {
    let invalid = |reason: &str| DatabaseError::InvalidValue {
        column: column.name.clone(),
        reason: reason.to_string(),
    };

    match (column.column_type, literal) {
        (ColumnType::Str, Literal::Str(s)) => Ok(FieldValue::Str(s.clone())),
        (ColumnType::Blob, Literal::Str(s)) => Ok(FieldValue::Blob(s.as_bytes().to_vec())),
        (ColumnType::Str | ColumnType::Blob, Literal::Number(_)) => {
            Err(invalid("expected a string"))
        }

        (ColumnType::I64, Literal::Str(s)) => s
            .trim()
            .parse::<i64>()
            .map(FieldValue::I64)
            .map_err(|_| invalid("expected an integer")),
        (ColumnType::I64, Literal::Number(n)) => i64::try_from(*n)
            .map(FieldValue::I64)
            .map_err(|_| out_of_range(column, *n)),

        (ColumnType::U64 | ColumnType::U32 | ColumnType::U8, Literal::Str(s)) => {
            let n = s
                .trim()
                .parse::<u64>()
                .map_err(|_| invalid("expected an unsigned integer"))?;
            unsigned(column, n)
        }
        (ColumnType::U64 | ColumnType::U32 | ColumnType::U8, Literal::Number(n)) => {
            unsigned(column, *n)
        }

        (ColumnType::Bool, Literal::Number(0)) => Ok(FieldValue::Bool(false)),
        (ColumnType::Bool, Literal::Number(1)) => Ok(FieldValue::Bool(true)),
        (ColumnType::Bool, Literal::Str(s)) if s.eq_ignore_ascii_case("true") || s == "1" => {
            Ok(FieldValue::Bool(true))
        }
        (ColumnType::Bool, Literal::Str(s)) if s.eq_ignore_ascii_case("false") || s == "0" => {
            Ok(FieldValue::Bool(false))
        }
        (ColumnType::Bool, _) => Err(invalid("expected 0, 1, 'true' or 'false'")),
    }
}

/// Stores an unsigned number in an unsigned integer column.
pub(crate) fn unsigned(column: &ColumnDef, n: u64) -> DatabaseResult<FieldValue> {
    let value = match column.column_type {
        ColumnType::U64 => Some(FieldValue::U64(n)),
        ColumnType::U32 => u32::try_from(n).ok().map(FieldValue::U32),
        ColumnType::U8 => u8::try_from(n).ok().map(FieldValue::U8),
        ColumnType::I64 => i64::try_from(n).ok().map(FieldValue::I64),
        ColumnType::Str | ColumnType::Blob | ColumnType::Bool => {
            return Err(DatabaseError::InvalidValue {
                column: column.name.clone(),
                reason: format!("{} column cannot hold a number", column.column_type),
            })
        }
    };
    value.ok_or_else(|| out_of_range(column, n))
}

fn out_of_range(column: &ColumnDef, value: u64) -> DatabaseError {
    DatabaseError::ValueOutOfRange {
        column: column.name.clone(),
        value,
    }
}
