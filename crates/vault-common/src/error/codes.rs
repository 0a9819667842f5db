//! Stable numeric error codes.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Error codes for categorizing failures.
///
/// The numeric values are stable and negative for every failure, so they can
/// cross any boundary that only carries an integer status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum ErrorCode {
    /// Success.
    Ok = 0,
    /// Unspecified failure.
    Generic = -1,
    /// Allocation or capacity exhausted.
    OutOfMemory = -2,
    /// Invalid argument (unknown column, schema mismatch, bad literal).
    InvalidArgument = -3,
    /// Unknown table, row, or capability.
    NotFound = -4,
    /// Capability check failed.
    PermissionDenied = -5,
    /// Object already exists.
    AlreadyExists = -6,
    /// Fixed-capacity table or queue is full.
    Full = -7,
    /// Malformed statement.
    Syntax = -8,
    /// Capability seal verification failed.
    CapInvalid = -9,
    /// Capability expired.
    CapExpired = -10,
    /// Capability revoked.
    CapRevoked = -11,
    /// Transaction aborted or not active.
    TxnAbort = -12,
    /// I/O error.
    Io = -13,
    /// Buffer or numeric overflow.
    Overflow = -14,
    /// Resource busy.
    Busy = -15,
    /// Operation not implemented.
    NotImplemented = -16,
}

impl ErrorCode {
    /// Returns the numeric code.
    #[inline]
    #[must_use]
    pub const fn as_i32(self) -> i32 {
        self as i32
    }

    /// Converts a numeric code back into an `ErrorCode`.
    #[must_use]
    pub const fn from_i32(code: i32) -> Option<Self> {
        Some(match code {
            0 => Self::Ok,
            -1 => Self::Generic,
            -2 => Self::OutOfMemory,
            -3 => Self::InvalidArgument,
            -4 => Self::NotFound,
            -5 => Self::PermissionDenied,
            -6 => Self::AlreadyExists,
            -7 => Self::Full,
            -8 => Self::Syntax,
            -9 => Self::CapInvalid,
            -10 => Self::CapExpired,
            -11 => Self::CapRevoked,
            -12 => Self::TxnAbort,
            -13 => Self::Io,
            -14 => Self::Overflow,
            -15 => Self::Busy,
            -16 => Self::NotImplemented,
            _ => return None,
        })
    }

    /// Returns true for [`ErrorCode::Ok`].
    #[inline]
    #[must_use]
    pub const fn is_ok(self) -> bool {
        matches!(self, Self::Ok)
    }

    /// Returns the error category name.
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match self {
            Self::Ok => "Success",
            Self::Generic | Self::OutOfMemory | Self::Overflow | Self::Busy | Self::NotImplemented => {
                "General"
            }
            Self::InvalidArgument | Self::Syntax => "Query",
            Self::NotFound | Self::AlreadyExists | Self::Full | Self::Io => "Storage",
            Self::PermissionDenied | Self::CapInvalid | Self::CapExpired | Self::CapRevoked => {
                "Capability"
            }
            Self::TxnAbort => "Transaction",
        }
    }

    /// Returns the human-readable description shown to shell users.
    #[must_use]
    pub const fn describe(&self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::Generic => "Generic error",
            Self::OutOfMemory => "Out of memory",
            Self::InvalidArgument => "Invalid argument",
            Self::NotFound => "Not found",
            Self::PermissionDenied => "Permission denied",
            Self::AlreadyExists => "Already exists",
            Self::Full => "Table full",
            Self::Syntax => "Syntax error",
            Self::CapInvalid => "Invalid capability",
            Self::CapExpired => "Capability expired",
            Self::CapRevoked => "Capability revoked",
            Self::TxnAbort => "Transaction aborted",
            Self::Io => "I/O error",
            Self::Overflow => "Buffer overflow",
            Self::Busy => "Resource busy",
            Self::NotImplemented => "Not implemented",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.describe(), self.as_i32())
    }
}
