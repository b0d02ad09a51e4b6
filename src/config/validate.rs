// src/config/validate.rs

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{DagstartError, Result};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::DagstartError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.launcher, raw.runtime, raw.logging))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_runtime(cfg)?;
    Ok(())
}

fn validate_runtime(cfg: &RawConfigFile) -> Result<()> {
    // default_context and logging.level are strongly typed and validated
    // during deserialization, so we don't need to check them here.

    if cfg.runtime.worker_threads == Some(0) {
        return Err(DagstartError::ConfigError(
            "[runtime].worker_threads must be >= 1 (got 0)".to_string(),
        ));
    }

    if cfg.runtime.max_blocking_threads == Some(0) {
        return Err(DagstartError::ConfigError(
            "[runtime].max_blocking_threads must be >= 1 (got 0)".to_string(),
        ));
    }

    if cfg.runtime.thread_name.trim().is_empty() {
        return Err(DagstartError::ConfigError(
            "[runtime].thread_name must not be empty".to_string(),
        ));
    }

    Ok(())
}
