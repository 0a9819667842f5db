//! # VaultDB Database Engine
//!
//! This module wires the VaultDB components into one engine:
//!
//! - SQL parsing (`vault-sql`)
//! - Capability checks (`vault-cap`)
//! - Encrypted storage (`vault-storage`)
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Engine (one Mutex)                        │
//! │                            │                                   │
//! │    ┌───────────────────────┼───────────────────────┐           │
//! │    ▼                       ▼                       ▼           │
//! │ ┌──────────────┐    ┌─────────────────┐    ┌──────────────┐    │
//! │ │ StorageEngine│    │CapabilityManager│    │  TxnTable    │    │
//! │ │ - Catalog    │    │ - Sealed tokens │    │ - stub state │    │
//! │ │ - Tables     │    │ - Verify cache  │    │              │    │
//! │ └──────────────┘    └─────────────────┘    └──────────────┘    │
//! │         ▲                    ▲                                 │
//! │         └─────────┬──────────┘                                 │
//! │                   │                                            │
//! │   sql ──▶ Parser ──▶ Executor ──▶ resolve (check rights)       │
//! │                         │                                      │
//! │                         ├──▶ scan + Predicate                  │
//! │                         └──▶ audit (AuditTable)                │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example Usage
//!
//! ```rust
//! use vault_common::types::ProcessId;
//! use vault_server::database::Engine;
//! use vault_server::ServerConfig;
//!
//! let engine = Engine::open(ServerConfig::for_testing()).unwrap();
//! let kernel = ProcessId::KERNEL;
//!
//! engine.execute("INSERT INTO ObjectTable (name, data) VALUES ('motd', 'hi')", kernel);
//! let result = engine.execute("SELECT name, size FROM ObjectTable", kernel);
//! assert_eq!(result.row_count(), 1);
//!
//! // A process with no capability sees nothing.
//! let result = engine.execute("SELECT * FROM ObjectTable", ProcessId::new(7));
//! assert!(!result.is_ok());
//! ```

mod audit;
mod bootstrap;
mod coerce;
mod engine;
mod error;
mod executor;
mod predicate;
mod result;
mod txn;

pub use bootstrap::{
    system_schemas, AUDIT_TABLE, CAPABILITY_TABLE, MESSAGE_TABLE, OBJECT_TABLE, PROCESS_TABLE,
    SYSTEM_TABLE, SYSTEM_TABLE_COUNT,
};
pub use engine::Engine;
pub use error::{DatabaseError, DatabaseResult};
pub use result::{QueryResult, ResultColumn, ResultSet};
pub use txn::{Transaction, TxnId, TxnState};
