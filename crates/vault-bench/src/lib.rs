//! VaultDB Performance Benchmarks
//!
//! This crate contains benchmarks for the VaultDB components:
//! - Storage (B-tree index, record sealing and opening)
//! - SQL tokenizing and parsing
//! - End-to-end statements and capability checks
//!
//! Run benchmarks with:
//! ```bash
//! cargo bench -p vault-bench
//! ```

pub mod utils;
