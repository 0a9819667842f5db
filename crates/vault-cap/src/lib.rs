//! # vault-cap
//!
//! Capability-based access control for VaultDB.
//!
//! Every access to a table is mediated by a capability: an unforgeable token
//! naming an object, an owner process and a set of [`Rights`]. Tokens are
//! sealed with HMAC-SHA256 under a secret only the manager knows, so a token
//! whose fields were changed without resealing fails validation.
//!
//! ## Derivation
//!
//! Capabilities form a derivation tree. [`CapabilityManager::grant`] derives
//! a child holding a subset of its parent's rights, and
//! [`CapabilityManager::revoke`] invalidates a capability together with
//! everything derived from it.
//!
//! ```text
//!            cap 1 (root, kernel, ALL)
//!                 │
//!            cap 2 (pid 10, READ|GRANT)      revoke(2) ─┐
//!             /        \                                │
//!     cap 3 (pid 20)  cap 4 (pid 30)   ◀── also revoked ┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use rand::rngs::OsRng;
//! use vault_cap::{CapabilityManager, ObjectType, Rights};
//! use vault_common::config::CapabilityConfig;
//! use vault_common::platform::ManualClock;
//! use vault_common::types::{CapId, ProcessId};
//!
//! let mut caps = CapabilityManager::new(
//!     CapabilityConfig::default(),
//!     &mut OsRng,
//!     Arc::new(ManualClock::new(0)),
//! ).unwrap();
//!
//! let alice = ProcessId::new(10);
//! let bob = ProcessId::new(20);
//! let cap = caps
//!     .create(7, ObjectType::Table, alice, Rights::READ | Rights::GRANT, CapId::NONE)
//!     .unwrap();
//! let child = caps.grant(alice, cap, bob, Rights::READ | Rights::WRITE).unwrap();
//!
//! assert_eq!(caps.get(child).unwrap().rights, Rights::READ);
//! assert!(caps.check(bob, 7, Rights::READ));
//!
//! caps.revoke(alice, cap).unwrap();
//! assert!(!caps.check(bob, 7, Rights::READ));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

mod cache;
mod error;
mod manager;
mod seal;
mod table;
mod token;

pub use cache::ValidationCache;
pub use error::{CapError, CapResult};
pub use manager::CapabilityManager;
pub use seal::{SealKey, SEAL_INPUT_SIZE};
pub use table::CapTable;
pub use token::{Capability, ObjectType, Rights};
