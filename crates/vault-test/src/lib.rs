//! # vault-test
//!
//! Integration tests for VaultDB.
//!
//! This crate contains:
//! - End-to-end scenario tests (`tests/`)
//! - Engine fixtures with a deterministic clock and random source
//! - Workload generators shared with the benchmarks

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Test utilities and helpers
pub mod utils;

/// Workload generators
pub mod workload;
