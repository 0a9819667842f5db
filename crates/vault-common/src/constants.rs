//! System-wide constants for VaultDB.
//!
//! Wire-format limits are fixed here; capacity limits that an operator may
//! want to tune live in [`crate::config`] and default to the values below.

// =============================================================================
// Record Limits
// =============================================================================

/// Maximum number of columns in a table schema and fields in a record.
pub const MAX_COLUMNS: usize = 16;

/// Maximum length of a table name in bytes.
pub const MAX_TABLE_NAME: usize = 63;

/// Maximum length of a column name in bytes.
pub const MAX_COLUMN_NAME: usize = 63;

/// Maximum string field length in bytes.
pub const MAX_STR_LEN: usize = 255;

/// Maximum blob field length in bytes.
pub const MAX_BLOB_LEN: usize = 2048;

/// Maximum serialized record size in bytes.
pub const MAX_RECORD_SIZE: usize = 4096;

/// Serialized record header: row_id (8) + table_id (4) + field_count (4).
pub const RECORD_HEADER_SIZE: usize = 16;

// =============================================================================
// Crypto Constants
// =============================================================================

/// Master secret length in bytes.
pub const MASTER_KEY_SIZE: usize = 32;

/// Block cipher key length in bytes (AES-128).
pub const CIPHER_KEY_SIZE: usize = 16;

/// Authentication key and tag length in bytes (HMAC-SHA256).
pub const MAC_SIZE: usize = 32;

/// Initialization vector and cipher block length in bytes.
pub const IV_SIZE: usize = 16;

// =============================================================================
// Capacity Defaults
// =============================================================================

/// Default B-tree order (maximum children per node).
pub const DEFAULT_BTREE_ORDER: usize = 64;

/// Default maximum number of tables.
pub const DEFAULT_MAX_TABLES: usize = 16;

/// Default capability table capacity.
pub const DEFAULT_CAP_TABLE_CAPACITY: usize = 1024;

/// Default number of capability validation cache slots.
pub const DEFAULT_CAP_CACHE_SLOTS: usize = 64;

/// Default validation cache time-to-live in ticks.
pub const DEFAULT_CAP_CACHE_TTL: u64 = 1000;

/// Default maximum number of WHERE conditions per statement.
pub const DEFAULT_MAX_WHERE_CONDS: usize = 8;

/// Default maximum number of INSERT values or UPDATE assignments.
pub const DEFAULT_MAX_INSERT_VALS: usize = 16;

/// Fixed width of the padded audit `action` and `result` strings.
pub const AUDIT_FIELD_WIDTH: usize = 64;

/// Maximum number of digits accepted in an integer literal.
pub const MAX_NUMBER_DIGITS: usize = 20;
