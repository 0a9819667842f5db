//! # vault-storage
//!
//! Encrypted row storage for VaultDB.
//!
//! This crate provides everything below the query layer:
//!
//! - **B-tree**: an ordered `u64 -> V` index, one per table
//! - **Record codec**: the binary row format
//! - **Crypto**: per-table key derivation and encrypt-then-MAC envelopes
//! - **Catalog**: immutable table schemas with case-insensitive lookup
//! - **Tables**: B-trees of sealed envelopes that only hand out plaintext
//!   records after the MAC verifies
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      StorageEngine                          │
//! │  ┌─────────────┐  ┌─────────────┐  ┌─────────────────────┐  │
//! │  │   Catalog   │  │ Master key  │  │  next row id (1..)  │  │
//! │  └─────────────┘  └─────────────┘  └─────────────────────┘  │
//! └─────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                EncryptedTable (per table)                   │
//! │   Record ──codec──▶ bytes ──AES-CBC──▶ ct ──HMAC──▶ env     │
//! └─────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │              BTree<EncryptedRecord> keyed by row id         │
//! └─────────────────────────────────────────────────────────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod btree;
pub mod catalog;
pub mod crypto;
mod engine;
mod error;
pub mod record;
mod table;

pub use catalog::{Catalog, ColumnDef, TableSchema};
pub use engine::StorageEngine;
pub use error::{StorageError, StorageResult};
pub use record::{ColumnType, FieldValue, Record};
pub use table::EncryptedTable;
