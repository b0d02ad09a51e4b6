// src/errors.rs

//! Crate-wide error aliases and helpers.

use thiserror::Error;

/// Failure of a single task as observed through its unit.
///
/// Cloneable so that every joiner of a unit sees the same failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskFailure {
    #[error("task '{task}' panicked: {message}")]
    Panicked { task: String, message: String },

    #[error("task '{task}' was cancelled")]
    Cancelled { task: String },
}

impl TaskFailure {
    /// Name of the task the failure belongs to.
    pub fn task(&self) -> &str {
        match self {
            TaskFailure::Panicked { task, .. } | TaskFailure::Cancelled { task } => task,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, TaskFailure::Cancelled { .. })
    }
}

#[derive(Error, Debug)]
pub enum DagstartError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Circular dependency in task graph: {0}")]
    CircularDependency(String),

    #[error("Root node missing from cloned task graph")]
    RootMissing,

    #[error("Node {0} not found in task graph")]
    NodeNotFound(String),

    #[error("Unit for dependency '{0}' not found while wiring launcher")]
    MissingUnit(String),

    #[error("No tokio runtime available: {0}")]
    NoRuntime(String),

    #[error(transparent)]
    Task(#[from] TaskFailure),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, DagstartError>;
