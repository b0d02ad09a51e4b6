// src/lib.rs

//! Dependency-aware task launcher.
//!
//! Register tasks and their dependencies in a [`TaskGraph`], then hand the
//! graph to [`Launcher::start`]. Independent tasks run concurrently, each on
//! the [`ExecutionContext`] it was registered with; a task only runs once all
//! of its dependencies have finished.
//!
//! ```no_run
//! use dagstart::{Launcher, TaskGraph, TaskHandle, TaskOptions};
//!
//! # async fn demo() -> dagstart::errors::Result<()> {
//! let fetch = TaskHandle::new("fetch", || println!("fetch"));
//! let parse = TaskHandle::new("parse", || println!("parse"));
//!
//! let mut graph = TaskGraph::new();
//! graph
//!     .add(&fetch)
//!     .register(&parse, TaskOptions::new().tag("parse"), [&fetch]);
//!
//! let launcher = Launcher::run(&graph).await?;
//! assert!(launcher.is_task_completed(["parse"]));
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod dag;
pub mod errors;
pub mod exec;
pub mod launcher;
pub mod logging;
pub mod task;
pub mod types;

pub use dag::{Node, TaskGraph, TaskOptions};
pub use errors::{DagstartError, TaskFailure};
pub use exec::{Dispatcher, ExecutionContext, LaunchScope, Unit, UnitState};
pub use launcher::Launcher;
pub use task::{Task, TaskHandle, TaskId};
