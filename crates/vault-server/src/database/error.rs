//! Database error types.

use thiserror::Error;
use vault_cap::CapError;
use vault_common::types::ProcessId;
use vault_common::ErrorCode;
use vault_sql::ParseError;
use vault_storage::StorageError;

use super::txn::TxnId;

/// Database errors.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Statement text did not parse.
    #[error("syntax error: {0}")]
    Parse(#[from] ParseError),

    /// Storage layer failure.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Capability operation failure.
    #[error(transparent)]
    Capability(#[from] CapError),

    /// Unknown table. Only reported to the kernel.
    #[error("table not found: {0}")]
    TableNotFound(String),

    /// The caller may not perform this operation on the table.
    #[error("permission denied: pid {pid} on {table}")]
    PermissionDenied {
        /// Calling process.
        pid: ProcessId,
        /// Table named by the statement.
        table: String,
    },

    /// A statement named a column the table does not have.
    #[error("unknown column: {0}")]
    UnknownColumn(String),

    /// A column was named twice in one INSERT or UPDATE.
    #[error("duplicate column: {0}")]
    DuplicateColumn(String),

    /// A literal cannot be stored in a column.
    #[error("invalid value for column {column}: {reason}")]
    InvalidValue {
        /// Target column.
        column: String,
        /// What was wrong.
        reason: String,
    },

    /// A number does not fit the column's integer type.
    #[error("value {value} out of range for column {column}")]
    ValueOutOfRange {
        /// Target column.
        column: String,
        /// The literal.
        value: u64,
    },

    /// A NOT NULL column was not given a value.
    #[error("column {0} requires a value")]
    MissingValue(String),

    /// No transaction with this id.
    #[error("transaction not found: {0}")]
    TxnNotFound(TxnId),

    /// The transaction is no longer active.
    #[error("transaction {0} is not active")]
    TxnNotActive(TxnId),

    /// Configuration rejected by validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl DatabaseError {
    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Parse(e) => e.code(),
            Self::Storage(e) => e.code(),
            Self::Capability(e) => e.code(),
            Self::TableNotFound(_) | Self::TxnNotFound(_) => ErrorCode::NotFound,
            Self::PermissionDenied { .. } => ErrorCode::PermissionDenied,
            Self::UnknownColumn(_)
            | Self::DuplicateColumn(_)
            | Self::InvalidValue { .. }
            | Self::MissingValue(_)
            | Self::InvalidConfig(_) => ErrorCode::InvalidArgument,
            Self::ValueOutOfRange { .. } => ErrorCode::Overflow,
            Self::TxnNotActive(_) => ErrorCode::TxnAbort,
        }
    }
}

/// Database result type.
pub type DatabaseResult<T> = Result<T, DatabaseError>;
