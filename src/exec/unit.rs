// src/exec/unit.rs

//! Deferred execution units.
//!
//! A [`Unit`] is created not-yet-running. [`Unit::start`] submits its body to
//! the scope exactly once, no matter how many callers race on it, and
//! [`Unit::join`] starts the unit if needed before waiting for it. Completion
//! is assigned once; joiners that arrived earlier are released earlier, each
//! through its own `oneshot`, so dependents blocked on a shared unit resume
//! in the order they started waiting.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::oneshot;
use tracing::debug;

use crate::errors::TaskFailure;
use crate::exec::LaunchScope;
use crate::task::{TaskHandle, TaskId};

pub(crate) type UnitBody = Pin<Box<dyn Future<Output = Result<(), TaskFailure>> + Send>>;

/// Lifecycle of a unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitState {
    /// Created but never started.
    Pending,
    /// Submitted to the scope; waiting on dependencies or running.
    Started,
    Completed,
    Failed(TaskFailure),
}

impl UnitState {
    pub fn is_finished(&self) -> bool {
        matches!(self, UnitState::Completed | UnitState::Failed(_))
    }

    fn outcome(&self) -> Option<Result<(), TaskFailure>> {
        match self {
            UnitState::Completed => Some(Ok(())),
            UnitState::Failed(failure) => Some(Err(failure.clone())),
            UnitState::Pending | UnitState::Started => None,
        }
    }
}

/// Lazily started, joinable handle bound to one task.
#[derive(Clone)]
pub struct Unit {
    inner: Arc<UnitInner>,
}

struct UnitInner {
    task: TaskHandle,
    scope: LaunchScope,
    started: AtomicBool,
    body: Mutex<Option<UnitBody>>,
    slot: Mutex<Slot>,
}

/// Current state plus the joiners waiting for it to become terminal, in
/// arrival order.
struct Slot {
    state: UnitState,
    waiters: Vec<oneshot::Sender<Result<(), TaskFailure>>>,
}

impl UnitInner {
    fn slot(&self) -> std::sync::MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn mark_started(&self) {
        let mut slot = self.slot();
        if slot.state == UnitState::Pending {
            slot.state = UnitState::Started;
        }
    }

    /// Assign the terminal state and release every joiner, first come first
    /// served.
    fn finish(&self, state: UnitState) {
        let Some(outcome) = state.outcome() else {
            return;
        };
        let waiters = {
            let mut slot = self.slot();
            slot.state = state;
            std::mem::take(&mut slot.waiters)
        };
        for waiter in waiters {
            let _ = waiter.send(outcome.clone());
        }
    }
}

impl Unit {
    pub(crate) fn deferred(task: TaskHandle, scope: LaunchScope, body: UnitBody) -> Self {
        Self {
            inner: Arc::new(UnitInner {
                task,
                scope,
                started: AtomicBool::new(false),
                body: Mutex::new(Some(body)),
                slot: Mutex::new(Slot {
                    state: UnitState::Pending,
                    waiters: Vec::new(),
                }),
            }),
        }
    }

    pub fn id(&self) -> TaskId {
        self.inner.task.id()
    }

    pub fn task(&self) -> &TaskHandle {
        &self.inner.task
    }

    /// Submit the unit to its scope. Idempotent.
    pub fn start(&self) {
        if self.inner.started.swap(true, Ordering::AcqRel) {
            return;
        }

        let body = self
            .inner
            .body
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        let Some(body) = body else {
            return;
        };

        debug!(task = %self.inner.task, "starting unit");
        self.inner.mark_started();

        let inner = Arc::clone(&self.inner);
        let token = inner.scope.token();
        self.inner.scope.launch(async move {
            let outcome = tokio::select! {
                biased;
                _ = token.cancelled() => Err(TaskFailure::Cancelled {
                    task: inner.task.name().to_string(),
                }),
                out = body => out,
            };

            let state = match outcome {
                Ok(()) => {
                    debug!(task = %inner.task, "unit completed");
                    UnitState::Completed
                }
                Err(failure) => {
                    if !failure.is_cancelled() {
                        inner.scope.fail(failure.clone());
                    } else {
                        debug!(task = %inner.task, "unit cancelled");
                    }
                    UnitState::Failed(failure)
                }
            };
            inner.finish(state);
        });
    }

    /// Start the unit if needed and wait for it to finish.
    pub async fn join(&self) -> Result<(), TaskFailure> {
        self.start();

        let rx = {
            let mut slot = self.inner.slot();
            if let Some(outcome) = slot.state.outcome() {
                return outcome;
            }
            let (tx, rx) = oneshot::channel();
            slot.waiters.push(tx);
            rx
        };

        // A dropped sender means the unit's future never finished, e.g. the
        // runtime shut down underneath it.
        rx.await.unwrap_or_else(|_| {
            Err(TaskFailure::Cancelled {
                task: self.inner.task.name().to_string(),
            })
        })
    }

    pub fn is_started(&self) -> bool {
        self.inner.started.load(Ordering::Acquire)
    }

    /// Non-blocking: whether the unit reached a terminal state.
    pub fn is_finished(&self) -> bool {
        self.inner.slot().state.is_finished()
    }

    pub fn state(&self) -> UnitState {
        self.inner.slot().state.clone()
    }
}

impl fmt::Debug for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Unit")
            .field("task", &self.inner.task)
            .field("state", &self.inner.slot().state)
            .finish()
    }
}
