// src/config/model.rs

use serde::Deserialize;

use crate::types::{ContextKind, LogLevel};

/// Configuration as read from TOML, before validation.
///
/// ```toml
/// [launcher]
/// default_context = "worker"
/// precheck_cycles = true
///
/// [runtime]
/// worker_threads = 4
/// max_blocking_threads = 64
/// thread_name = "dagstart-worker"
///
/// [logging]
/// level = "debug"
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub launcher: LauncherSection,

    #[serde(default)]
    pub runtime: RuntimeSection,

    #[serde(default)]
    pub logging: LoggingSection,
}

/// Validated configuration. Build it with `ConfigFile::try_from(raw)`,
/// [`ConfigFile::from_toml_str`] or
/// [`load_and_validate`](crate::config::load_and_validate).
#[derive(Debug, Clone, Default)]
pub struct ConfigFile {
    pub launcher: LauncherSection,
    pub runtime: RuntimeSection,
    pub logging: LoggingSection,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        launcher: LauncherSection,
        runtime: RuntimeSection,
        logging: LoggingSection,
    ) -> Self {
        Self {
            launcher,
            runtime,
            logging,
        }
    }
}

/// `[launcher]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LauncherSection {
    /// Context for tasks registered without an explicit one.
    #[serde(default)]
    pub default_context: ContextKind,

    /// Check for cycles before launching and log every cycle found.
    ///
    /// Launching a cyclic graph fails either way; this only makes the failure
    /// easier to diagnose.
    #[serde(default)]
    pub precheck_cycles: bool,
}

/// `[runtime]` section: shape of the tokio runtime built by
/// [`RuntimeSection::build_runtime`].
#[derive(Debug, Clone, Deserialize)]
pub struct RuntimeSection {
    /// Worker thread count; `None` uses tokio's default (one per core).
    #[serde(default)]
    pub worker_threads: Option<usize>,

    /// Upper bound of the blocking pool used by the `blocking` context.
    #[serde(default)]
    pub max_blocking_threads: Option<usize>,

    #[serde(default = "default_thread_name")]
    pub thread_name: String,
}

fn default_thread_name() -> String {
    "dagstart-worker".to_string()
}

impl Default for RuntimeSection {
    fn default() -> Self {
        Self {
            worker_threads: None,
            max_blocking_threads: None,
            thread_name: default_thread_name(),
        }
    }
}

/// `[logging]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingSection {
    /// If `None`, `DAGSTART_LOG` or `info` is used.
    #[serde(default)]
    pub level: Option<LogLevel>,
}
