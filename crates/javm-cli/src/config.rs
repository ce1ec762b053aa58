//! `javm.toml` configuration
//!
//! ```toml
//! [threads]
//! max_priority = 10
//! name_prefix = "Thread-"
//! stack_size = 1048576
//! ```

use anyhow::Context;
use javm_core::ThreadOptions;
use serde::Deserialize;
use std::path::Path;

/// Top-level configuration file
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Thread manager options
    pub threads: ThreadOptions,
}

impl Config {
    /// Parse and validate a TOML document
    pub fn from_toml(text: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(text)?;
        config.threads.validate()?;
        Ok(config)
    }

    /// Read and validate a TOML file
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("invalid config {}", path.display()))
    }
}

/// Load the config file if one was given, defaults otherwise
pub fn load(path: Option<&Path>) -> anyhow::Result<Config> {
    match path {
        Some(path) => Config::from_file(path),
        None => Ok(Config::default()),
    }
}
