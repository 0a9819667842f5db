//! Engine configuration structures.
//!
//! These structures define the capacity limits of a VaultDB engine. Every
//! section deserializes with defaults for missing fields, so a config file
//! only has to name the limits it changes.

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_BTREE_ORDER, DEFAULT_CAP_CACHE_SLOTS, DEFAULT_CAP_CACHE_TTL,
    DEFAULT_CAP_TABLE_CAPACITY, DEFAULT_MAX_INSERT_VALS, DEFAULT_MAX_TABLES,
    DEFAULT_MAX_WHERE_CONDS, MAX_COLUMNS,
};

/// Main engine configuration.
///
/// # Example
///
/// ```rust
/// use vault_common::config::EngineConfig;
///
/// let config = EngineConfig::default();
/// assert_eq!(config.storage.btree_order, 64);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct EngineConfig {
    /// Storage engine limits.
    pub storage: StorageConfig,

    /// Capability manager limits.
    pub capability: CapabilityConfig,

    /// Statement limits.
    pub query: QueryConfig,
}

impl EngineConfig {
    /// Creates a small configuration for tests.
    ///
    /// A low B-tree order forces node splits after a handful of rows, and a
    /// short cache TTL makes expiry observable with a manual clock.
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            storage: StorageConfig {
                btree_order: 4,
                max_tables: 8,
            },
            capability: CapabilityConfig {
                table_capacity: 64,
                cache_slots: 8,
                cache_ttl: 10,
            },
            query: QueryConfig::default(),
        }
    }

    /// Validates the configuration and returns an error if invalid.
    pub fn validate(&self) -> Result<(), String> {
        self.storage.validate()?;
        self.capability.validate()?;
        self.query.validate()
    }
}

/// Storage engine limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// B-tree order (maximum children per node).
    /// Default: 64
    pub btree_order: usize,

    /// Maximum number of tables, system tables included.
    /// Default: 16
    pub max_tables: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            btree_order: DEFAULT_BTREE_ORDER,
            max_tables: DEFAULT_MAX_TABLES,
        }
    }
}

impl StorageConfig {
    /// Maximum keys per node for the configured order.
    #[must_use]
    pub const fn max_keys(&self) -> usize {
        self.btree_order - 1
    }

    /// Validates the storage limits.
    pub fn validate(&self) -> Result<(), String> {
        if self.btree_order < 4 {
            return Err("storage.btree_order must be at least 4".to_string());
        }
        if self.max_tables == 0 || self.max_tables > u32::MAX as usize {
            return Err("storage.max_tables must be between 1 and u32::MAX".to_string());
        }
        Ok(())
    }
}

/// Capability manager limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CapabilityConfig {
    /// Number of capability slots. Capability ids are never reused, so
    /// this also bounds the number of capabilities ever created.
    /// Default: 1024
    pub table_capacity: usize,

    /// Number of direct-mapped verification cache slots.
    /// Default: 64
    pub cache_slots: usize,

    /// Ticks a cached verification stays trusted.
    /// Default: 1000
    pub cache_ttl: u64,
}

impl Default for CapabilityConfig {
    fn default() -> Self {
        Self {
            table_capacity: DEFAULT_CAP_TABLE_CAPACITY,
            cache_slots: DEFAULT_CAP_CACHE_SLOTS,
            cache_ttl: DEFAULT_CAP_CACHE_TTL,
        }
    }
}

impl CapabilityConfig {
    /// Validates the capability limits.
    pub fn validate(&self) -> Result<(), String> {
        if self.table_capacity == 0 {
            return Err("capability.table_capacity must be non-zero".to_string());
        }
        if self.cache_slots == 0 {
            return Err("capability.cache_slots must be non-zero".to_string());
        }
        Ok(())
    }
}

/// Statement limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Maximum AND-joined conditions in a WHERE clause.
    /// Default: 8
    pub max_where_conditions: usize,

    /// Maximum values in an INSERT or assignments in an UPDATE.
    /// Default: 16
    pub max_insert_values: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            max_where_conditions: DEFAULT_MAX_WHERE_CONDS,
            max_insert_values: DEFAULT_MAX_INSERT_VALS,
        }
    }
}

impl QueryConfig {
    /// Validates the statement limits.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_where_conditions == 0 {
            return Err("query.max_where_conditions must be non-zero".to_string());
        }
        if self.max_insert_values == 0 || self.max_insert_values > MAX_COLUMNS {
            return Err(format!(
                "query.max_insert_values must be between 1 and {MAX_COLUMNS}"
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.storage.btree_order, 64);
        assert_eq!(config.storage.max_keys(), 63);
        assert_eq!(config.storage.max_tables, 16);
        assert_eq!(config.capability.table_capacity, 1024);
        assert_eq!(config.capability.cache_slots, 64);
        assert_eq!(config.capability.cache_ttl, 1000);
        assert_eq!(config.query.max_where_conditions, 8);
        assert_eq!(config.query.max_insert_values, 16);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = EngineConfig::default();
        config.storage.btree_order = 3;
        assert!(config.validate().is_err());

        config.storage.btree_order = 64;
        config.capability.cache_slots = 0;
        assert!(config.validate().is_err());

        config.capability.cache_slots = 64;
        config.query.max_insert_values = MAX_COLUMNS + 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_testing_config() {
        let config = EngineConfig::for_testing();
        assert_eq!(config.storage.btree_order, 4);
        assert_eq!(config.capability.cache_ttl, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: EngineConfig = toml::from_str(
            r#"
            [storage]
            btree_order = 8

            [capability]
            cache_ttl = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.storage.btree_order, 8);
        assert_eq!(config.storage.max_tables, DEFAULT_MAX_TABLES);
        assert_eq!(config.capability.cache_ttl, 5);
        assert_eq!(config.capability.table_capacity, DEFAULT_CAP_TABLE_CAPACITY);
        assert_eq!(config.query, QueryConfig::default());
    }
}
