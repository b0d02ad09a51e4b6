// src/exec/scope.rs

//! Structured-concurrency boundary for one launch.

use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, warn};

use crate::errors::{DagstartError, Result, TaskFailure};

/// Lifetime boundary that units and leaf waiters are launched into.
///
/// The first task failure recorded through [`LaunchScope::fail`] cancels the
/// scope; every unit still waiting on it then resolves as cancelled and the
/// failure is reported to whoever awaits the launcher.
#[derive(Debug, Clone)]
pub struct LaunchScope {
    handle: Handle,
    tracker: TaskTracker,
    cancel: CancellationToken,
    failure: Arc<Mutex<Option<TaskFailure>>>,
}

impl LaunchScope {
    /// Scope on the runtime the caller is currently running on.
    pub fn new() -> Result<Self> {
        let handle =
            Handle::try_current().map_err(|e| DagstartError::NoRuntime(e.to_string()))?;
        Ok(Self::with_handle(handle))
    }

    pub fn with_handle(handle: Handle) -> Self {
        Self {
            handle,
            tracker: TaskTracker::new(),
            cancel: CancellationToken::new(),
            failure: Arc::new(Mutex::new(None)),
        }
    }

    pub fn handle(&self) -> &Handle {
        &self.handle
    }

    /// Spawn `future` as a child of this scope.
    pub fn launch<F>(&self, future: F) -> JoinHandle<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        self.tracker.spawn_on(future, &self.handle)
    }

    /// Cancel every unit of this scope that has not finished yet.
    pub fn cancel(&self) {
        if !self.cancel.is_cancelled() {
            debug!("launch scope cancelled");
        }
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub(crate) fn token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Record a task failure and cancel the scope. Only the first failure is
    /// kept.
    pub fn fail(&self, failure: TaskFailure) {
        {
            let mut slot = self.failure.lock().unwrap_or_else(PoisonError::into_inner);
            if slot.is_none() {
                warn!(task = %failure.task(), error = %failure, "task failed; cancelling scope");
                *slot = Some(failure);
            }
        }
        self.cancel();
    }

    /// The failure that cancelled this scope, if any.
    pub fn failure(&self) -> Option<TaskFailure> {
        self.failure
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Wait until everything launched in this scope has finished.
    pub async fn wait(&self) {
        self.tracker.close();
        self.tracker.wait().await;
    }
}
