//! Configuration for VaultDB.
//!
//! This module provides the engine limits that replace fixed-capacity
//! arrays: table count, B-tree order, capability table size, cache shape and
//! statement limits.

mod engine;

pub use engine::{CapabilityConfig, EngineConfig, QueryConfig, StorageConfig};
