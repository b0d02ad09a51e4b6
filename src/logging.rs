// src/logging.rs

//! Logging setup for `dagstart` using `tracing` + `tracing-subscriber`.
//!
//! Priority for determining the log level:
//! 1. explicit level (argument, or `[logging].level` via [`init_from_config`])
//! 2. `DAGSTART_LOG` environment variable (e.g. "info", "debug")
//! 3. default to `info`
//!
//! Logs are sent to STDERR so that task output on stdout stays clean.

use anyhow::Result;
use tracing_subscriber::fmt;

use crate::config::ConfigFile;
use crate::types::LogLevel;

/// Initialise global logging subscriber.
///
/// Safe to call once at startup; a second call returns an error because a
/// global subscriber is already installed.
pub fn init_logging(level: Option<LogLevel>) -> Result<()> {
    let level: tracing::Level = level
        .or_else(|| {
            std::env::var("DAGSTART_LOG")
                .ok()
                .and_then(|s| s.parse::<LogLevel>().ok())
        })
        .map(Into::into)
        .unwrap_or(tracing::Level::INFO);

    fmt()
        .with_max_level(level)
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))?;

    Ok(())
}

/// Initialise logging from the `[logging]` section of a config.
pub fn init_from_config(cfg: &ConfigFile) -> Result<()> {
    init_logging(cfg.logging.level)
}
