// src/dag/node.rs

//! Task metadata and graph nodes.

use crate::exec::ExecutionContext;
use crate::task::{TaskHandle, TaskId};

/// Registration options for a task.
///
/// `context: None` means "use the graph's default context". An empty tag is
/// treated the same as no tag.
#[derive(Debug, Clone, Default)]
pub struct TaskOptions {
    pub context: Option<ExecutionContext>,
    pub priority: i32,
    pub tag: Option<String>,
}

impl TaskOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn context(mut self, context: ExecutionContext) -> Self {
        self.context = Some(context);
        self
    }

    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }
}

/// Scheduling metadata for one task identity.
///
/// Everything but `task` is overwritten when the same task is registered
/// again.
#[derive(Debug, Clone)]
pub struct TaskRecord {
    pub(crate) task: TaskHandle,
    pub(crate) context: ExecutionContext,
    /// Lower values are started first among siblings that are ready together.
    pub(crate) priority: i32,
    pub(crate) tag: Option<String>,
}

/// A task plus its immediate adjacency.
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) record: TaskRecord,
    /// In-edges: tasks this node depends on (may include the root).
    pub(crate) predecessors: Vec<TaskId>,
    /// Out-edges: tasks that depend on this node.
    pub(crate) successors: Vec<TaskId>,
}

impl Node {
    pub(crate) fn new(record: TaskRecord) -> Self {
        Self {
            record,
            predecessors: Vec::new(),
            successors: Vec::new(),
        }
    }

    pub fn id(&self) -> TaskId {
        self.record.task.id()
    }

    pub fn task(&self) -> &TaskHandle {
        &self.record.task
    }

    pub fn context(&self) -> &ExecutionContext {
        &self.record.context
    }

    pub fn priority(&self) -> i32 {
        self.record.priority
    }

    pub fn tag(&self) -> Option<&str> {
        self.record.tag.as_deref()
    }

    /// Explicit dependencies, without the root anchor.
    pub fn dependencies(&self) -> impl Iterator<Item = TaskId> + '_ {
        self.predecessors.iter().copied().filter(|id| !id.is_root())
    }

    /// Tasks that depend on this one.
    pub fn dependents(&self) -> &[TaskId] {
        &self.successors
    }

    /// `true` while the node has no explicit dependency.
    pub fn is_anchored_on_root(&self) -> bool {
        self.predecessors.contains(&TaskId::ROOT)
    }

    pub(crate) fn add_predecessor(&mut self, id: TaskId) {
        if !self.predecessors.contains(&id) {
            self.predecessors.push(id);
        }
    }

    pub(crate) fn add_successor(&mut self, id: TaskId) {
        if !self.successors.contains(&id) {
            self.successors.push(id);
        }
    }

    pub(crate) fn remove_predecessor(&mut self, id: TaskId) {
        self.predecessors.retain(|p| *p != id);
    }

    pub(crate) fn remove_successor(&mut self, id: TaskId) {
        self.successors.retain(|s| *s != id);
    }
}
