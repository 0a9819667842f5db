//! # vault-common
//!
//! Common types, error codes, and platform interfaces for VaultDB.
//!
//! This crate provides the foundational types shared by every VaultDB
//! component:
//!
//! - **Types**: Core identifiers (`RowId`, `TableId`, `CapId`, `ProcessId`)
//! - **Errors**: The stable `ErrorCode` taxonomy every layer maps into
//! - **Config**: Engine configuration with validated limits
//! - **Constants**: Wire-format and schema limits
//! - **Platform**: The clock and randomness interfaces the engine consumes
//!
//! ## Example
//!
//! ```rust
//! use vault_common::types::{CapId, ProcessId, RowId};
//! use vault_common::ErrorCode;
//!
//! let row = RowId::new(1);
//! assert_eq!(row.next().as_u64(), 2);
//! assert!(ProcessId::KERNEL.is_kernel());
//! assert!(!CapId::NONE.is_valid());
//! assert_eq!(ErrorCode::PermissionDenied.as_i32(), -5);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod constants;
pub mod error;
pub mod platform;
pub mod types;

// Re-export commonly used items at the crate root
pub use constants::*;
pub use error::ErrorCode;
pub use types::{CapId, ProcessId, RowId, TableId};
