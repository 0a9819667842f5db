//! Error codes for VaultDB.
//!
//! Each crate defines its own error enum; all of them map into the
//! [`ErrorCode`] defined here so callers above the engine see one stable
//! numeric taxonomy.

mod codes;

pub use codes::ErrorCode;
