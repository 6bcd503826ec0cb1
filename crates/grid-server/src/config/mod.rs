//! Tool configuration.
//!
//! A `GridConfig` is read from a TOML file and then overridden by
//! command-line flags.

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use grid_common::config::{JournalMode, SyncMode};
use grid_common::StoreConfig;

/// Configuration for the `gridctl` tool and embedders of [`crate::Backend`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridConfig {
    /// Log filter directive, e.g. `info` or `grid_store=debug`.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Workspace store settings.
    #[serde(default)]
    pub store: StoreConfig,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            store: StoreConfig::default(),
        }
    }
}

impl GridConfig {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
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

    /// Checks the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.log_level.trim().is_empty() {
            bail!("log_level must not be empty");
        }
        if let Err(message) = self.store.validate() {
            bail!("invalid store configuration: {message}");
        }
        Ok(())
    }

    /// Creates a builder for configuration.
    pub fn builder() -> GridConfigBuilder {
        GridConfigBuilder::new()
    }
}

/// Builder for [`GridConfig`].
#[derive(Default)]
pub struct GridConfigBuilder {
    config: GridConfig,
}

impl GridConfigBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the data directory.
    pub fn data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.store.data_dir = dir.into();
        self
    }

    /// Sets the log filter.
    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.config.log_level = level.into();
        self
    }

    /// Sets the busy timeout in milliseconds.
    pub fn busy_timeout_ms(mut self, ms: u64) -> Self {
        self.config.store.busy_timeout_ms = ms;
        self
    }

    /// Sets the journal mode.
    pub fn journal_mode(mut self, mode: JournalMode) -> Self {
        self.config.store.journal_mode = mode;
        self
    }

    /// Sets the synchronous mode.
    pub fn synchronous(mut self, mode: SyncMode) -> Self {
        self.config.store.synchronous = mode;
        self
    }

    /// Sets whether an empty `where` touches every row.
    pub fn allow_unfiltered_mutations(mut self, allow: bool) -> Self {
        self.config.store.allow_unfiltered_mutations = allow;
        self
    }

    /// Builds the configuration.
    pub fn build(self) -> GridConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = GridConfig::default();
        assert_eq!(config.log_level, "info");
        assert_eq!(config.store.data_dir, PathBuf::from("./data"));
        assert_eq!(config.store.busy_timeout_ms, 5000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = GridConfig::builder()
            .data_dir("/srv/grid")
            .journal_mode(JournalMode::Wal)
            .allow_unfiltered_mutations(false)
            .build();

        assert_eq!(config.store.data_dir, PathBuf::from("/srv/grid"));
        assert_eq!(config.store.journal_mode, JournalMode::Wal);
        assert!(!config.store.allow_unfiltered_mutations);
    }

    #[test]
    fn test_to_toml() {
        let toml = GridConfig::default().to_toml().unwrap();
        assert!(toml.contains("log_level"));
        assert!(toml.contains("[store]"));
        assert!(toml.contains("busy_timeout_ms"));
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("conf").join("grid.toml");

        let config = GridConfig::builder()
            .data_dir("/tmp/workspaces")
            .log_level("debug")
            .synchronous(SyncMode::Normal)
            .build();
        config.save(&path).unwrap();

        assert_eq!(GridConfig::from_file(&path).unwrap(), config);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("grid.toml");
        std::fs::write(&path, "[store]\ndata_dir = \"/var/lib/grid\"\n").unwrap();

        let config = GridConfig::from_file(&path).unwrap();
        assert_eq!(config.log_level, "info");
        assert_eq!(config.store.data_dir, PathBuf::from("/var/lib/grid"));
        assert!(config.store.allow_unfiltered_mutations);
    }

    #[test]
    fn test_invalid_file_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("grid.toml");
        std::fs::write(&path, "[store]\nbusy_timeout_ms = 0\n").unwrap();
        assert!(GridConfig::from_file(&path).is_err());
    }
}
