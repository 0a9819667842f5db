//! Column types, field values and records.

use std::fmt;

use vault_common::types::{RowId, TableId};

/// Column data types with their stable wire tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum ColumnType {
    /// Unsigned 64-bit integer.
    U64 = 0,
    /// Signed 64-bit integer.
    I64 = 1,
    /// UTF-8 string of at most 255 bytes.
    Str = 2,
    /// Byte string of at most 2048 bytes.
    Blob = 3,
    /// Boolean.
    Bool = 4,
    /// Unsigned 32-bit integer.
    U32 = 5,
    /// Unsigned 8-bit integer.
    U8 = 6,
}

impl ColumnType {
    /// Returns the wire tag.
    #[inline]
    pub const fn tag(self) -> u32 {
        self as u32
    }

    /// Converts a wire tag back into a type.
    pub const fn from_tag(tag: u32) -> Option<Self> {
        Some(match tag {
            0 => Self::U64,
            1 => Self::I64,
            2 => Self::Str,
            3 => Self::Blob,
            4 => Self::Bool,
            5 => Self::U32,
            6 => Self::U8,
            _ => return None,
        })
    }

    /// Returns the type name shown by `DESCRIBE`.
    pub const fn name(self) -> &'static str {
        match self {
            Self::U64 => "U64",
            Self::I64 => "I64",
            Self::Str => "STR",
            Self::Blob => "BLOB",
            Self::Bool => "BOOL",
            Self::U32 => "U32",
            Self::U8 => "U8",
        }
    }

    /// Returns true for the unsigned integer types.
    pub const fn is_unsigned(self) -> bool {
        matches!(self, Self::U64 | Self::U32 | Self::U8)
    }

    /// Returns the value an unset column holds.
    pub fn zero_value(self) -> FieldValue {
        match self {
            Self::U64 => FieldValue::U64(0),
            Self::I64 => FieldValue::I64(0),
            Self::Str => FieldValue::Str(String::new()),
            Self::Blob => FieldValue::Blob(Vec::new()),
            Self::Bool => FieldValue::Bool(false),
            Self::U32 => FieldValue::U32(0),
            Self::U8 => FieldValue::U8(0),
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single typed field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldValue {
    /// Unsigned 64-bit integer.
    U64(u64),
    /// Signed 64-bit integer.
    I64(i64),
    /// UTF-8 string.
    Str(String),
    /// Byte string.
    Blob(Vec<u8>),
    /// Boolean.
    Bool(bool),
    /// Unsigned 32-bit integer.
    U32(u32),
    /// Unsigned 8-bit integer.
    U8(u8),
}

impl FieldValue {
    /// Returns the column type of this value.
    pub const fn column_type(&self) -> ColumnType {
        match self {
            Self::U64(_) => ColumnType::U64,
            Self::I64(_) => ColumnType::I64,
            Self::Str(_) => ColumnType::Str,
            Self::Blob(_) => ColumnType::Blob,
            Self::Bool(_) => ColumnType::Bool,
            Self::U32(_) => ColumnType::U32,
            Self::U8(_) => ColumnType::U8,
        }
    }

    /// Widens an unsigned integer value to u64.
    pub const fn as_unsigned(&self) -> Option<u64> {
        match self {
            Self::U64(v) => Some(*v),
            Self::U32(v) => Some(*v as u64),
            Self::U8(v) => Some(*v as u64),
            _ => None,
        }
    }

    /// Returns the string contents with trailing NUL padding removed.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s.trim_end_matches('\0')),
            _ => None,
        }
    }

    /// Returns the raw bytes of a string or blob.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Str(s) => Some(s.as_bytes()),
            Self::Blob(b) => Some(b),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::U64(v) => write!(f, "{v}"),
            Self::I64(v) => write!(f, "{v}"),
            Self::Str(s) => f.write_str(s.trim_end_matches('\0')),
            Self::Blob(b) => write!(f, "<blob {} bytes>", b.len()),
            Self::Bool(v) => write!(f, "{v}"),
            Self::U32(v) => write!(f, "{v}"),
            Self::U8(v) => write!(f, "{v}"),
        }
    }
}

/// A row: its identity plus fields in schema column order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Global row id.
    pub row_id: RowId,
    /// Owning table.
    pub table_id: TableId,
    /// Field values in column order.
    pub fields: Vec<FieldValue>,
}

impl Record {
    /// Creates a record.
    pub fn new(row_id: RowId, table_id: TableId, fields: Vec<FieldValue>) -> Self {
        Self {
            row_id,
            table_id,
            fields,
        }
    }

    /// Returns the field at `index`.
    pub fn get(&self, index: usize) -> Option<&FieldValue> {
        self.fields.get(index)
    }

    /// Returns the number of fields.
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }
}
