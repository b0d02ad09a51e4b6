// src/config/loader.rs

use std::fs;
use std::path::Path;

use tokio::runtime::{Builder, Runtime};

use crate::config::model::{ConfigFile, RawConfigFile, RuntimeSection};
use crate::errors::Result;

/// Load a configuration file from a given path and return the raw `RawConfigFile`.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file from path and validate it.
///
/// - Reads TOML.
/// - Applies defaults (handled by `serde` + `Default` impls).
/// - Checks runtime sizing sanity.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let raw_config = load_from_path(&path)?;
    let config = ConfigFile::try_from(raw_config)?;
    Ok(config)
}

impl ConfigFile {
    /// Parse and validate configuration from an in-memory TOML string.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let raw: RawConfigFile = toml::from_str(contents)?;
        ConfigFile::try_from(raw)
    }
}

impl RuntimeSection {
    /// Build a multi-threaded tokio runtime shaped by this section.
    pub fn build_runtime(&self) -> Result<Runtime> {
        let mut builder = Builder::new_multi_thread();
        builder.enable_all().thread_name(self.thread_name.clone());

        if let Some(n) = self.worker_threads {
            builder.worker_threads(n);
        }
        if let Some(n) = self.max_blocking_threads {
            builder.max_blocking_threads(n);
        }

        Ok(builder.build()?)
    }
}
