// src/task.rs

//! Caller-supplied units of work and their identity.
//!
//! A [`Task`] is opaque to the launcher: it is only ever `run()` once per
//! launch and its effects are not observed. Identity comes from the
//! [`TaskHandle`] wrapping it, never from the task value itself.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Process-wide counter for task identities. `0` is reserved for the root.
static NEXT_TASK_ID: AtomicU64 = AtomicU64::new(1);

/// Unique identity of a registered task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

impl TaskId {
    /// Identity of the synthetic root node every graph is anchored on.
    pub const ROOT: TaskId = TaskId(0);

    fn next() -> Self {
        TaskId(NEXT_TASK_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }

    pub fn is_root(self) -> bool {
        self == TaskId::ROOT
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A side-effect-only unit of work.
pub trait Task: Send + Sync + 'static {
    fn run(&self);
}

impl<F> Task for F
where
    F: Fn() + Send + Sync + 'static,
{
    fn run(&self) {
        self()
    }
}

/// Shared, identity-carrying handle to a [`Task`].
///
/// Clones refer to the same task. Two handles created separately are always
/// distinct tasks, even when they wrap identical closures.
#[derive(Clone)]
pub struct TaskHandle {
    id: TaskId,
    name: Arc<str>,
    task: Arc<dyn Task>,
}

impl TaskHandle {
    pub fn new(name: impl Into<String>, task: impl Task) -> Self {
        Self {
            id: TaskId::next(),
            name: Arc::from(name.into()),
            task: Arc::new(task),
        }
    }

    /// Wrap an already shared task object.
    pub fn from_arc(name: impl Into<String>, task: Arc<dyn Task>) -> Self {
        Self {
            id: TaskId::next(),
            name: Arc::from(name.into()),
            task,
        }
    }

    pub(crate) fn root() -> Self {
        Self {
            id: TaskId::ROOT,
            name: Arc::from("<root>"),
            task: Arc::new(|| {}),
        }
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn run(&self) {
        self.task.run();
    }
}

impl PartialEq for TaskHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TaskHandle {}

impl Hash for TaskHandle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TaskHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskHandle")
            .field("id", &self.id)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for TaskHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.name, self.id)
    }
}
