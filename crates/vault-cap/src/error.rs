//! Error types for the capability manager.

use thiserror::Error;
use vault_common::types::{CapId, ProcessId};
use vault_common::ErrorCode;

/// Result type for capability operations.
pub type CapResult<T> = Result<T, CapError>;

/// Errors that can occur in capability operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CapError {
    /// No capability with this id. Only reported to the kernel.
    #[error("capability not found: {0}")]
    NotFound(CapId),

    /// The caller may not use this capability, or it does not exist.
    #[error("permission denied for pid {pid} on capability {cap_id}")]
    PermissionDenied {
        /// Calling process.
        pid: ProcessId,
        /// Capability the caller named.
        cap_id: CapId,
    },

    /// The seal does not match the capability's fields.
    #[error("capability {0} has an invalid seal")]
    Invalid(CapId),

    /// The capability's expiry tick has passed.
    #[error("capability {0} has expired")]
    Expired(CapId),

    /// The capability was revoked.
    #[error("capability {0} has been revoked")]
    Revoked(CapId),

    /// No free capability slot for the next id.
    #[error("capability table full: {capacity} slots")]
    Full {
        /// Configured slot count.
        capacity: usize,
    },

    /// Configuration rejected by validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// MAC setup failed.
    #[error("crypto error: {0}")]
    Crypto(String),
}

impl CapError {
    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::NotFound(_) => ErrorCode::NotFound,
            Self::PermissionDenied { .. } => ErrorCode::PermissionDenied,
            Self::Invalid(_) => ErrorCode::CapInvalid,
            Self::Expired(_) => ErrorCode::CapExpired,
            Self::Revoked(_) => ErrorCode::CapRevoked,
            Self::Full { .. } => ErrorCode::Full,
            Self::InvalidConfig(_) => ErrorCode::InvalidArgument,
            Self::Crypto(_) => ErrorCode::Generic,
        }
    }
}
