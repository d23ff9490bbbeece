//! Engine configuration via `strata-engine.toml`
//!
//! Every field has a default, so an empty file (or no file) is a valid
//! configuration. Values are validated eagerly when loaded.

use serde::{Deserialize, Serialize};
use std::path::Path;
use strata_core::{Error, Result};

/// Config file name.
pub const CONFIG_FILE_NAME: &str = "strata-engine.toml";

/// Engine configuration loaded from `strata-engine.toml`.
///
/// # Example
///
/// ```toml
/// # Threads completing operations
/// worker_threads = 4
///
/// # Pending operations before submissions are rejected
/// max_queue_depth = 4096
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Number of worker threads. Must be at least 1.
    #[serde(default = "default_worker_threads")]
    pub worker_threads: usize,
    /// Pending operations before submissions are rejected. Must be at least 1.
    #[serde(default = "default_max_queue_depth")]
    pub max_queue_depth: usize,
}

fn default_worker_threads() -> usize {
    4
}

fn default_max_queue_depth() -> usize {
    4096
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            worker_threads: default_worker_threads(),
            max_queue_depth: default_max_queue_depth(),
        }
    }
}

impl EngineConfig {
    /// Check value ranges.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if a value is out of range.
    pub fn validate(&self) -> Result<()> {
        if self.worker_threads == 0 {
            return Err(Error::invalid_input(
                "worker_threads must be at least 1 in strata-engine.toml",
            ));
        }
        if self.max_queue_depth == 0 {
            return Err(Error::invalid_input(
                "max_queue_depth must be at least 1 in strata-engine.toml",
            ));
        }
        Ok(())
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# Strata engine configuration
#
# Threads completing operations (default: 4)
worker_threads = 4

# Pending operations before new submissions are rejected (default: 4096)
max_queue_depth = 4096
"#
    }

    /// Parse config from TOML text.
    ///
    /// # Errors
    ///
    /// Returns `Serialization` if the text does not parse and `InvalidInput`
    /// if a value is out of range.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: EngineConfig = toml::from_str(content)
            .map_err(|e| Error::serialization(format!("Failed to parse engine config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse config from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::internal(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml(&content)
    }

    /// Write the default config file if it does not already exist.
    pub fn write_default_if_missing(path: &Path) -> Result<()> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml()).map_err(|e| {
                Error::internal(format!(
                    "Failed to write default config file '{}': {}",
                    path.display(),
                    e
                ))
            })?;
        }
        Ok(())
    }
}
