//! Error types for the storage layer.

use thiserror::Error;
use vault_common::types::{RowId, TableId};
use vault_common::ErrorCode;

use crate::btree::BTreeError;
use crate::record::CodecError;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur in storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Table id not in the catalog.
    #[error("table not found: {0}")]
    TableNotFound(TableId),

    /// A table with this name already exists.
    #[error("table already exists: {0}")]
    TableExists(String),

    /// The catalog holds the maximum number of tables.
    #[error("catalog full: {max} tables")]
    CatalogFull {
        /// Configured table limit.
        max: usize,
    },

    /// The schema definition is invalid.
    #[error("invalid schema: {0}")]
    InvalidSchema(String),

    /// A record does not match its table's schema.
    #[error("schema mismatch: {0}")]
    SchemaMismatch(String),

    /// A stored envelope failed authentication or decoded inconsistently.
    #[error("integrity check failed for row {row_id}")]
    IntegrityFailure {
        /// Row id recorded in the envelope.
        row_id: RowId,
    },

    /// Cipher or MAC setup failed.
    #[error("crypto error: {0}")]
    Crypto(String),

    /// Record encoding or decoding failed.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// B-tree construction failed.
    #[error("index error: {0}")]
    Index(#[from] BTreeError),

    /// Configuration rejected by validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The row id counter is exhausted.
    #[error("row id space exhausted")]
    RowIdsExhausted,
}

impl StorageError {
    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::TableNotFound(_) => ErrorCode::NotFound,
            Self::TableExists(_) => ErrorCode::AlreadyExists,
            Self::CatalogFull { .. } => ErrorCode::Full,
            Self::InvalidSchema(_) | Self::SchemaMismatch(_) | Self::InvalidConfig(_) => {
                ErrorCode::InvalidArgument
            }
            // Unreadable rows look exactly like missing rows.
            Self::IntegrityFailure { .. } => ErrorCode::NotFound,
            Self::Crypto(_) => ErrorCode::Generic,
            Self::Codec(e) => e.code(),
            Self::Index(_) => ErrorCode::InvalidArgument,
            Self::RowIdsExhausted => ErrorCode::Overflow,
        }
    }
}
