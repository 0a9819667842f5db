//! Main database engine.
//!
//! The `Engine` is the top-level entry point for VaultDB. It owns the
//! storage engine, the capability manager and the transaction table behind
//! a single lock, so every statement runs to completion on its own.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use vault_cap::{CapabilityManager, Capability, ObjectType, Rights};
use vault_common::platform::{MonotonicClock, OsRandom, RandomSource, TickSource};
use vault_common::types::{CapId, ProcessId, RowId, TableId};
use vault_sql::Parser;
use vault_storage::{StorageEngine, TableSchema};

use super::audit;
use super::bootstrap::bootstrap;
use super::error::{DatabaseError, DatabaseResult};
use super::executor::Executor;
use super::result::QueryResult;
use super::txn::{TxnId, TxnState, TxnTable};
use crate::config::ServerConfig;

/// Mutable engine state, guarded by the engine lock.
struct EngineState {
    storage: StorageEngine,
    caps: CapabilityManager,
    txns: TxnTable,
}

/// The VaultDB engine.
///
/// # Example
///
/// ```rust
/// use vault_common::types::ProcessId;
/// use vault_server::{Engine, ServerConfig};
///
/// let engine = Engine::open(ServerConfig::for_testing()).unwrap();
/// let result = engine.execute("SELECT value FROM SystemTable WHERE key = 'os.name'", ProcessId::KERNEL);
/// assert_eq!(result.row_count(), 1);
/// ```
pub struct Engine {
    config: ServerConfig,
    clock: Arc<dyn TickSource>,
    state: Mutex<EngineState>,
}

impl Engine {
    /// Opens an engine using OS randomness and a monotonic millisecond clock.
    pub fn open(config: ServerConfig) -> DatabaseResult<Self> {
        Self::with_platform(
            config,
            Box::new(OsRandom::default()),
            Arc::new(MonotonicClock::new()),
        )
    }

    /// Opens an engine with the given random source and clock.
    ///
    /// Draws the capability seal key and the storage master key from `rng`,
    /// then creates and seeds the system tables.
    pub fn with_platform(
        config: ServerConfig,
        mut rng: Box<dyn RandomSource>,
        clock: Arc<dyn TickSource>,
    ) -> DatabaseResult<Self> {
        config.validate().map_err(DatabaseError::InvalidConfig)?;

        let caps = CapabilityManager::new(
            config.engine.capability.clone(),
            rng.as_mut(),
            Arc::clone(&clock),
        )?;
        let mut storage = StorageEngine::new(config.engine.storage.clone(), rng)?;
        bootstrap(&mut storage, &config.boot)?;

        tracing::info!(
            "VaultDB engine started: {} tables, btree order {}, {} capability slots",
            storage.catalog().len(),
            config.engine.storage.btree_order,
            config.engine.capability.table_capacity
        );

        Ok(Self {
            config,
            clock,
            state: Mutex::new(EngineState {
                storage,
                caps,
                txns: TxnTable::new(),
            }),
        })
    }

    /// Returns the configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Returns the current tick.
    pub fn now(&self) -> u64 {
        self.clock.now()
    }

    // =========================================================================
    // Statements
    // =========================================================================

    /// Parses and executes one statement on behalf of `pid`.
    ///
    /// Errors are reported in the returned [`QueryResult`], never raised.
    pub fn execute(&self, sql: &str, pid: ProcessId) -> QueryResult {
        let statement = match Parser::parse(sql, &self.config.engine.query) {
            Ok(statement) => statement,
            Err(e) => {
                tracing::debug!("Pid {} sent an unparsable statement: {}", pid, e);
                return DatabaseError::from(e).into();
            }
        };
        tracing::debug!("Pid {} executing {}", pid, statement.kind());

        let now = self.clock.now();
        let mut guard = self.state.lock();
        let state = &mut *guard;
        match Executor::new(&mut state.storage, &mut state.caps, pid, now).run(statement) {
            Ok(result) => result,
            Err(e) => {
                if let DatabaseError::PermissionDenied { .. } = e {
                    tracing::warn!("{}", e);
                }
                e.into()
            }
        }
    }

    // =========================================================================
    // Tables
    // =========================================================================

    /// Creates a table. Kernel API; no capability is created for it.
    pub fn create_table(&self, schema: TableSchema) -> DatabaseResult<TableId> {
        let mut state = self.state.lock();
        Ok(state.storage.create_table(schema)?.id)
    }

    /// Looks up a table id by name.
    pub fn table_id(&self, name: &str) -> Option<TableId> {
        self.state.lock().storage.catalog().find(name).map(|t| t.id)
    }

    /// Runs `f` with exclusive access to the storage engine.
    ///
    /// Kernel-level inspection hook; bypasses capability checks.
    pub fn with_storage<R>(&self, f: impl FnOnce(&mut StorageEngine) -> R) -> R {
        f(&mut self.state.lock().storage)
    }

    // =========================================================================
    // Capabilities
    // =========================================================================

    /// Mints a root capability. Kernel API.
    pub fn create_capability(
        &self,
        object_id: u64,
        object_type: ObjectType,
        owner: ProcessId,
        rights: Rights,
    ) -> DatabaseResult<CapId> {
        Ok(self
            .state
            .lock()
            .caps
            .create(object_id, object_type, owner, rights, CapId::NONE)?)
    }

    /// Derives a capability for `target` from one `granter` owns.
    pub fn grant(
        &self,
        granter: ProcessId,
        cap_id: CapId,
        target: ProcessId,
        rights: Rights,
    ) -> DatabaseResult<CapId> {
        Ok(self.state.lock().caps.grant(granter, cap_id, target, rights)?)
    }

    /// Revokes a capability and its descendants. Returns how many were
    /// newly revoked.
    pub fn revoke(&self, pid: ProcessId, cap_id: CapId) -> DatabaseResult<usize> {
        Ok(self.state.lock().caps.revoke(pid, cap_id)?)
    }

    /// Transfers a capability to another process.
    pub fn delegate(&self, from: ProcessId, cap_id: CapId, to: ProcessId) -> DatabaseResult<()> {
        Ok(self.state.lock().caps.delegate(from, cap_id, to)?)
    }

    /// Returns true if `pid` holds `required` rights on `object_id`.
    pub fn check(&self, pid: ProcessId, object_id: u64, required: Rights) -> bool {
        self.state.lock().caps.check(pid, object_id, required)
    }

    /// Validates a capability's liveness and seal.
    pub fn validate(&self, cap_id: CapId) -> DatabaseResult<()> {
        Ok(self.state.lock().caps.validate(cap_id)?)
    }

    /// Sets a capability's expiry tick (0 for never).
    pub fn set_expiry(&self, cap_id: CapId, expires_at: u64) -> DatabaseResult<()> {
        Ok(self.state.lock().caps.set_expiry(cap_id, expires_at)?)
    }

    /// Returns a copy of a capability.
    pub fn capability(&self, cap_id: CapId) -> Option<Capability> {
        self.state.lock().caps.get(cap_id).cloned()
    }

    // =========================================================================
    // Audit and transactions
    // =========================================================================

    /// Appends an audit entry stamped with the current tick.
    pub fn audit_log(
        &self,
        pid: ProcessId,
        action: &str,
        target_id: u64,
        result: &str,
    ) -> DatabaseResult<RowId> {
        let now = self.clock.now();
        let mut state = self.state.lock();
        Ok(audit::append(&mut state.storage, now, pid, action, target_id, result)?)
    }

    /// Begins a transaction.
    pub fn txn_begin(&self, pid: ProcessId) -> TxnId {
        self.state.lock().txns.begin(pid)
    }

    /// Commits a transaction. Fails unless it is still active.
    pub fn txn_commit(&self, id: TxnId) -> DatabaseResult<()> {
        self.state.lock().txns.commit(id).map(|_| ())
    }

    /// Aborts a transaction. Fails unless it is still active.
    pub fn txn_abort(&self, id: TxnId) -> DatabaseResult<()> {
        self.state.lock().txns.abort(id).map(|_| ())
    }

    /// Returns the state of an active transaction. Finished transactions are
    /// not retained and report `None`.
    pub fn txn_state(&self, id: TxnId) -> Option<TxnState> {
        self.state.lock().txns.get(id).map(|txn| txn.state)
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("Engine")
            .field("storage", &state.storage)
            .field("capabilities", &state.caps.len())
            .field("active_txns", &state.txns.len())
            .finish_non_exhaustive()
    }
}
