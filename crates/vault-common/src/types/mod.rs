//! Type definitions for VaultDB.
//!
//! This module contains the identifier types used across the engine.

mod ids;

pub use ids::{CapId, ProcessId, RowId, TableId};
