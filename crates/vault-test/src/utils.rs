//! Engine fixtures.

use std::sync::{Arc, Once};

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing_subscriber::EnvFilter;
use vault_common::platform::ManualClock;
use vault_common::types::TableId;
use vault_server::{Engine, ServerConfig};
use vault_storage::{ColumnDef, ColumnType, TableSchema};

static TRACING: Once = Once::new();

/// Installs a test-friendly tracing subscriber once per process.
///
/// Honors `RUST_LOG`; defaults to warnings only.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
            )
            .with_test_writer()
            .try_init();
    });
}

/// An engine driven by a manual clock and a seeded random source.
pub struct TestEngine {
    /// The engine.
    pub engine: Engine,
    /// Handle on the engine's clock.
    pub clock: ManualClock,
}

impl TestEngine {
    /// Opens an engine with [`ServerConfig::for_testing`] and seed 0.
    pub fn new() -> Self {
        Self::with_seed(0)
    }

    /// Opens an engine whose keys and IVs derive from `seed`.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_config(ServerConfig::for_testing(), seed)
    }

    /// Opens an engine with a custom configuration.
    ///
    /// # Panics
    ///
    /// Panics if the configuration is rejected.
    pub fn with_config(config: ServerConfig, seed: u64) -> Self {
        init_tracing();
        let clock = ManualClock::new(0);
        let engine = Engine::with_platform(
            config,
            Box::new(StdRng::seed_from_u64(seed)),
            Arc::new(clock.clone()),
        )
        .expect("test engine config must be valid");
        Self { engine, clock }
    }

    /// Creates `T(id U64 PK, name STR)`, the table the scenarios use.
    ///
    /// # Panics
    ///
    /// Panics if the table already exists.
    pub fn create_t(&self) -> TableId {
        self.engine
            .create_table(users_schema("T"))
            .expect("T must not exist yet")
    }
}

impl Default for TestEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// `name(id U64 PK, name STR)`
pub fn users_schema(name: &str) -> TableSchema {
    TableSchema::new(name)
        .column(ColumnDef::new("id", ColumnType::U64).primary_key())
        .column(ColumnDef::new("name", ColumnType::Str))
}
