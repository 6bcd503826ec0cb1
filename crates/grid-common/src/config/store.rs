//! Store configuration structures.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::constants::DEFAULT_BUSY_TIMEOUT_MS;

/// SQLite journal mode applied to every connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JournalMode {
    /// Rollback journal, deleted after each transaction.
    #[default]
    Delete,
    /// Write-ahead log.
    Wal,
}

impl JournalMode {
    /// Returns the pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Delete => "DELETE",
            Self::Wal => "WAL",
        }
    }
}

/// SQLite synchronous mode applied to every connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncMode {
    /// Sync on every commit.
    #[default]
    Full,
    /// Sync at critical moments only.
    Normal,
}

impl SyncMode {
    /// Returns the pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Full => "FULL",
            Self::Normal => "NORMAL",
        }
    }
}

/// Workspace store configuration.
///
/// # Example
///
/// ```rust
/// use grid_common::config::StoreConfig;
///
/// let config = StoreConfig::with_data_dir("/tmp/grid");
/// assert!(config.validate().is_ok());
/// assert!(config.allow_unfiltered_mutations);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Directory holding one `.grid` file per workspace.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// How long a connection waits on a locked store, in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,

    /// Journal mode.
    #[serde(default)]
    pub journal_mode: JournalMode,

    /// Synchronous mode.
    #[serde(default)]
    pub synchronous: SyncMode,

    /// Whether update/delete instructions with an empty `where` touch every
    /// row. When false such instructions need an explicit `all-rows` flag.
    #[serde(default = "default_allow_unfiltered")]
    pub allow_unfiltered_mutations: bool,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

const fn default_allow_unfiltered() -> bool {
    true
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            busy_timeout_ms: default_busy_timeout_ms(),
            journal_mode: JournalMode::default(),
            synchronous: SyncMode::default(),
            allow_unfiltered_mutations: default_allow_unfiltered(),
        }
    }
}

impl StoreConfig {
    /// Creates a configuration rooted at the given data directory.
    #[must_use]
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Default::default()
        }
    }

    /// Returns the busy timeout as a duration.
    #[must_use]
    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }

    /// Validates the configuration and returns an error if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.data_dir.as_os_str().is_empty() {
            return Err("data_dir must not be empty".to_string());
        }

        if self.busy_timeout_ms == 0 {
            return Err("busy_timeout_ms must be greater than zero".to_string());
        }

        Ok(())
    }
}
