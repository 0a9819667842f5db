//! # vault-server
//!
//! The VaultDB engine facade.
//!
//! This crate provides:
//!
//! - **Database Engine**: the [`Engine`] that wires together SQL parsing,
//!   capability-based authorization, encrypted storage and the audit trail.
//!   It is the main entry point for embedding VaultDB.
//!
//! - **Configuration**: [`ServerConfig`], engine limits plus boot metadata,
//!   loadable from and savable to TOML.
//!
//! # Quick Start
//!
//! ```rust
//! use vault_common::types::ProcessId;
//! use vault_server::{Engine, ServerConfig};
//!
//! let engine = Engine::open(ServerConfig::for_testing()).unwrap();
//! let kernel = ProcessId::KERNEL;
//!
//! // Give pid 7 read and write access to the object table (id 3).
//! let granted = engine.execute("GRANT READ, WRITE ON 3 TO 7", kernel);
//! assert!(granted.is_ok());
//!
//! let pid = ProcessId::new(7);
//! engine.execute("INSERT INTO ObjectTable (name, data) VALUES ('notes', 'secret')", pid);
//! let result = engine.execute("SELECT name, owner_pid FROM ObjectTable", pid);
//! println!("{result}");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

/// Database engine - the main entry point for VaultDB.
///
/// This module provides the `Engine` struct that combines statement
/// execution, authorization, storage and auditing.
pub mod database;

/// Engine configuration.
pub mod config;

// Re-export commonly used types
pub use config::{BootConfig, ServerConfig, ServerConfigBuilder};
pub use database::{
    DatabaseError, DatabaseResult, Engine, QueryResult, ResultColumn, ResultSet, Transaction,
    TxnId, TxnState,
};
