//! Engine configuration.
//!
//! [`ServerConfig`] wraps the engine limits from `vault-common` with the
//! boot metadata written to `SystemTable`, and reads and writes TOML.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use vault_common::config::EngineConfig;

use crate::database::SYSTEM_TABLE_COUNT;

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ServerConfig {
    /// Storage, capability and statement limits.
    pub engine: EngineConfig,

    /// Metadata seeded into `SystemTable` at boot.
    pub boot: BootConfig,
}

/// Boot metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BootConfig {
    /// `os.name`
    #[serde(default = "default_os_name")]
    pub os_name: String,

    /// `os.version`
    #[serde(default = "default_os_version")]
    pub os_version: String,

    /// `os.philosophy`
    #[serde(default = "default_philosophy")]
    pub philosophy: String,
}

fn default_os_name() -> String {
    "VaultOS".to_string()
}

fn default_os_version() -> String {
    "0.1.0".to_string()
}

fn default_philosophy() -> String {
    "Everything is a database and all data is confidential".to_string()
}

impl Default for BootConfig {
    fn default() -> Self {
        Self {
            os_name: default_os_name(),
            os_version: default_os_version(),
            philosophy: default_philosophy(),
        }
    }
}

impl ServerConfig {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Small limits for tests.
    pub fn for_testing() -> Self {
        Self {
            engine: EngineConfig::for_testing(),
            boot: BootConfig::default(),
        }
    }

    /// Validates the configuration.
    pub fn validate(&self) -> std::result::Result<(), String> {
        self.engine.validate()?;
        if self.engine.storage.max_tables < SYSTEM_TABLE_COUNT {
            return Err(format!(
                "storage.max_tables must be at least {SYSTEM_TABLE_COUNT} to hold the system tables"
            ));
        }
        for (key, value) in [
            ("boot.os_name", &self.boot.os_name),
            ("boot.os_version", &self.boot.os_version),
            ("boot.philosophy", &self.boot.philosophy),
        ] {
            if value.len() > vault_common::MAX_STR_LEN {
                return Err(format!(
                    "{key} must be at most {} bytes",
                    vault_common::MAX_STR_LEN
                ));
            }
        }
        Ok(())
    }

    /// Loads configuration from a file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Saves configuration to a file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = self.to_toml()?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Converts configuration to TOML string.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Creates a builder for configuration.
    pub fn builder() -> ServerConfigBuilder {
        ServerConfigBuilder::new()
    }
}

/// Builder for engine configuration.
#[derive(Debug, Default)]
pub struct ServerConfigBuilder {
    config: ServerConfig,
}

impl ServerConfigBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the B-tree order.
    pub fn btree_order(mut self, order: usize) -> Self {
        self.config.engine.storage.btree_order = order;
        self
    }

    /// Sets the maximum number of tables.
    pub fn max_tables(mut self, max: usize) -> Self {
        self.config.engine.storage.max_tables = max;
        self
    }

    /// Sets the capability table capacity.
    pub fn capability_capacity(mut self, capacity: usize) -> Self {
        self.config.engine.capability.table_capacity = capacity;
        self
    }

    /// Sets the validation cache size and TTL.
    pub fn capability_cache(mut self, slots: usize, ttl: u64) -> Self {
        self.config.engine.capability.cache_slots = slots;
        self.config.engine.capability.cache_ttl = ttl;
        self
    }

    /// Sets the WHERE condition limit.
    pub fn max_where_conditions(mut self, max: usize) -> Self {
        self.config.engine.query.max_where_conditions = max;
        self
    }

    /// Sets the boot metadata.
    pub fn boot(mut self, boot: BootConfig) -> Self {
        self.config.boot = boot;
        self
    }

    /// Builds the configuration.
    pub fn build(self) -> ServerConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.engine, EngineConfig::default());
        assert_eq!(config.boot.os_name, "VaultOS");
        assert_eq!(config.boot.os_version, "0.1.0");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = ServerConfig::builder()
            .btree_order(8)
            .max_tables(10)
            .capability_cache(4, 20)
            .build();

        assert_eq!(config.engine.storage.btree_order, 8);
        assert_eq!(config.engine.storage.max_tables, 10);
        assert_eq!(config.engine.capability.cache_slots, 4);
        assert_eq!(config.engine.capability.cache_ttl, 20);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation() {
        let config = ServerConfig::builder().max_tables(5).build();
        assert!(config.validate().unwrap_err().contains("system tables"));

        let config = ServerConfig::builder().btree_order(2).build();
        assert!(config.validate().is_err());

        let config = ServerConfig::builder()
            .boot(BootConfig {
                os_name: "x".repeat(300),
                ..BootConfig::default()
            })
            .build();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_to_toml() {
        let config = ServerConfig::default();
        let toml = config.to_toml().unwrap();
        assert!(toml.contains("btree_order"));
        assert!(toml.contains("os_name"));
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: ServerConfig = toml::from_str(
            r#"
            [boot]
            os_version = "0.2.0"
            "#,
        )
        .unwrap();
        assert_eq!(config.boot.os_version, "0.2.0");
        assert_eq!(config.boot.os_name, "VaultOS");
        assert_eq!(config.engine, EngineConfig::default());
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("vault.toml");

        let config = ServerConfig::builder()
            .btree_order(16)
            .max_where_conditions(4)
            .build();
        config.save(&path).unwrap();

        let loaded = ServerConfig::from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let err = ServerConfig::from_file(&temp_dir.path().join("absent.toml")).unwrap_err();
        assert!(err.to_string().contains("absent.toml"));
    }
}
