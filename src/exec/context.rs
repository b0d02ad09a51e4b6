// src/exec/context.rs

//! Pluggable execution contexts.
//!
//! A unit always coordinates (starting and joining its dependencies) on the
//! runtime of its [`LaunchScope`](super::LaunchScope). Only the task body
//! itself is handed to the node's [`ExecutionContext`]:
//!
//! - `Worker` runs it as a regular tokio task on the scope runtime.
//! - `Blocking` runs it on the tokio blocking pool, for I/O-heavy work.
//! - `Runtime` runs it as a blocking call on another runtime's blocking
//!   pool, keeping it off the scope runtime entirely.
//! - `Custom` hands it to a caller-supplied [`Dispatcher`]; tests use this to
//!   record what ran where.

use std::any::Any;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::task::JoinError;

use crate::errors::TaskFailure;
use crate::task::TaskHandle;
use crate::types::ContextKind;

/// Future returned by a dispatch: resolves once the task body has finished.
pub type DispatchFuture = Pin<Box<dyn Future<Output = Result<(), TaskFailure>> + Send>>;

/// Trait abstracting how a single task body is executed.
///
/// Implementations are free to run the task inline, on a thread of their own,
/// or on any pool they manage, as long as the returned future only resolves
/// after `task.run()` returned (or failed).
pub trait Dispatcher: Send + Sync + fmt::Debug {
    /// Short label used in logs.
    fn name(&self) -> &str;

    fn dispatch(&self, task: TaskHandle) -> DispatchFuture;
}

/// Worker-pool class a task body runs on.
#[derive(Debug, Clone, Default)]
pub enum ExecutionContext {
    #[default]
    Worker,
    Blocking,
    Runtime(Handle),
    Custom(Arc<dyn Dispatcher>),
}

impl From<ContextKind> for ExecutionContext {
    fn from(kind: ContextKind) -> Self {
        match kind {
            ContextKind::Worker => ExecutionContext::Worker,
            ContextKind::Blocking => ExecutionContext::Blocking,
        }
    }
}

impl ExecutionContext {
    pub fn custom(dispatcher: impl Dispatcher + 'static) -> Self {
        ExecutionContext::Custom(Arc::new(dispatcher))
    }

    pub fn label(&self) -> &str {
        match self {
            ExecutionContext::Worker => "worker",
            ExecutionContext::Blocking => "blocking",
            ExecutionContext::Runtime(_) => "runtime",
            ExecutionContext::Custom(d) => d.name(),
        }
    }

    /// Submit `task` to this context. `scope` is the runtime the launching
    /// scope lives on; it backs the `Worker` and `Blocking` contexts.
    pub(crate) fn dispatch(&self, task: TaskHandle, scope: &Handle) -> DispatchFuture {
        match self {
            ExecutionContext::Worker => {
                let runner = task.clone();
                let join = scope.spawn(async move { runner.run() });
                Box::pin(async move { join.await.map_err(|e| failure_from_join(&task, e)) })
            }
            ExecutionContext::Blocking => {
                let runner = task.clone();
                let join = scope.spawn_blocking(move || runner.run());
                Box::pin(async move { join.await.map_err(|e| failure_from_join(&task, e)) })
            }
            ExecutionContext::Runtime(handle) => {
                let runner = task.clone();
                let join = handle.spawn_blocking(move || runner.run());
                Box::pin(async move { join.await.map_err(|e| failure_from_join(&task, e)) })
            }
            ExecutionContext::Custom(dispatcher) => dispatcher.dispatch(task),
        }
    }
}

fn failure_from_join(task: &TaskHandle, err: JoinError) -> TaskFailure {
    if err.is_panic() {
        TaskFailure::Panicked {
            task: task.name().to_string(),
            message: panic_message(err.into_panic()),
        }
    } else {
        TaskFailure::Cancelled {
            task: task.name().to_string(),
        }
    }
}

/// Best-effort text of a panic payload.
pub fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
