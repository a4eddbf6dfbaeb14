//! Configuration for hashkv
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

use crate::error::{HashKvError, Result};

/// Main configuration for a hashkv instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Directory holding every segment file
    /// Internal structure:
    ///   {directory}/
    ///     ├── LOCK                 (advisory lock, one engine per directory)
    ///     ├── segment-000000.log
    ///     └── segment-000001.log   ...
    pub directory: PathBuf,

    /// Segment size (in bytes) past which the next append rolls over to a
    /// fresh segment file
    pub max_segment_size: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("./hashkv_data"),
            max_segment_size: 32 * 1024, // 32 KB
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Reject settings the engine cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.max_segment_size == 0 {
            return Err(HashKvError::Config(
                "max_segment_size must be greater than zero".to_string(),
            ));
        }
        if self.directory.as_os_str().is_empty() {
            return Err(HashKvError::Config("directory must not be empty".to_string()));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the segment directory
    pub fn directory(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.directory = path.into();
        self
    }

    /// Set the rotation threshold (in bytes)
    pub fn max_segment_size(mut self, size: u64) -> Self {
        self.config.max_segment_size = size;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
