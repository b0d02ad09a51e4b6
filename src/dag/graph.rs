// src/dag/graph.rs

use std::collections::HashMap;

use petgraph::algo::tarjan_scc;
use petgraph::graphmap::DiGraphMap;
use tracing::{debug, warn};

use crate::config::ConfigFile;
use crate::dag::node::{Node, TaskOptions, TaskRecord};
use crate::dag::peel::{NodeMap, peel};
use crate::exec::ExecutionContext;
use crate::task::{TaskHandle, TaskId};

/// Mutable dependency graph that callers build up before launching.
///
/// Nodes are keyed by [`TaskId`]. A synthetic root node is always present:
/// every node without an explicit dependency hangs off it, so peeling from
/// the root reaches the whole acyclic part of the graph.
#[derive(Debug, Clone)]
pub struct TaskGraph {
    nodes: NodeMap,
    tags: HashMap<String, TaskId>,
    default_context: ExecutionContext,
}

impl Default for TaskGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskGraph {
    pub fn new() -> Self {
        Self::with_default_context(ExecutionContext::default())
    }

    /// Graph whose registrations run on `context` unless told otherwise.
    pub fn with_default_context(context: ExecutionContext) -> Self {
        let root = Node::new(TaskRecord {
            task: TaskHandle::root(),
            context: context.clone(),
            priority: 0,
            tag: None,
        });

        let mut nodes = NodeMap::new();
        nodes.insert(TaskId::ROOT, root);

        Self {
            nodes,
            tags: HashMap::new(),
            default_context: context,
        }
    }

    /// Build an empty graph from the `[launcher]` section of a config.
    pub fn from_config(cfg: &ConfigFile) -> Self {
        Self::with_default_context(cfg.launcher.default_context.into())
    }

    pub fn default_context(&self) -> &ExecutionContext {
        &self.default_context
    }

    /// Register `task`, or update it if it was registered before.
    ///
    /// Re-registering overwrites context, priority and tag. Dependencies are
    /// added to the existing ones; dependencies that were never registered
    /// get a placeholder node with default settings, configured later if
    /// they are registered themselves.
    pub fn register<'a, I>(&mut self, task: &TaskHandle, options: TaskOptions, dependencies: I) -> &mut Self
    where
        I: IntoIterator<Item = &'a TaskHandle>,
    {
        let id = task.id();
        let context = options
            .context
            .unwrap_or_else(|| self.default_context.clone());
        let tag = options.tag.filter(|t| !t.is_empty());

        match self.nodes.get_mut(&id) {
            Some(node) => {
                let old_tag = node.record.tag.take();
                node.record.context = context;
                node.record.priority = options.priority;
                node.record.tag = tag.clone();

                if let Some(old) = old_tag {
                    if self.tags.get(&old) == Some(&id) {
                        self.tags.remove(&old);
                    }
                }
                debug!(task = %task, "updated registered task");
            }
            None => {
                self.insert_node(task, context, options.priority, tag.clone());
            }
        }

        if let Some(tag) = tag {
            self.tags.insert(tag, id);
        }

        let dependencies: Vec<&TaskHandle> = dependencies.into_iter().collect();
        if dependencies.is_empty() {
            return self;
        }

        self.unlink(TaskId::ROOT, id);
        for dep in dependencies {
            if !self.nodes.contains_key(&dep.id()) {
                let context = self.default_context.clone();
                self.insert_node(dep, context, 0, None);
            }
            self.link(dep.id(), id);
        }

        self
    }

    /// Register `task` with default options and no dependency.
    pub fn add(&mut self, task: &TaskHandle) -> &mut Self {
        self.register(task, TaskOptions::default(), std::iter::empty())
    }

    pub fn add_after<'a, I>(&mut self, task: &TaskHandle, dependencies: I) -> &mut Self
    where
        I: IntoIterator<Item = &'a TaskHandle>,
    {
        self.register(task, TaskOptions::default(), dependencies)
    }

    pub fn add_on<'a, I>(&mut self, task: &TaskHandle, context: ExecutionContext, dependencies: I) -> &mut Self
    where
        I: IntoIterator<Item = &'a TaskHandle>,
    {
        self.register(task, TaskOptions::new().context(context), dependencies)
    }

    pub fn add_tagged<'a, I>(&mut self, task: &TaskHandle, tag: &str, dependencies: I) -> &mut Self
    where
        I: IntoIterator<Item = &'a TaskHandle>,
    {
        self.register(task, TaskOptions::new().tag(tag), dependencies)
    }

    /// Node registered under `tag`.
    pub fn lookup(&self, tag: &str) -> Option<&Node> {
        self.tags.get(tag).and_then(|id| self.nodes.get(id))
    }

    pub fn node(&self, task: &TaskHandle) -> Option<&Node> {
        self.node_by_id(task.id())
    }

    pub fn node_by_id(&self, id: TaskId) -> Option<&Node> {
        if id.is_root() {
            return None;
        }
        self.nodes.get(&id)
    }

    pub fn contains(&self, task: &TaskHandle) -> bool {
        self.node(task).is_some()
    }

    /// All registered nodes (placeholders included), root excluded.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> + '_ {
        self.nodes.values().filter(|n| !n.id().is_root())
    }

    /// Number of registered tasks, root excluded.
    pub fn len(&self) -> usize {
        self.nodes.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Deep copy of every node, root included. Destructive algorithms work
    /// on this copy so the graph itself is never touched.
    pub fn clone_nodes(&self) -> NodeMap {
        self.nodes.clone()
    }

    /// Whether the registered edges contain a directed cycle.
    ///
    /// Purely advisory: cyclic graphs can still be built, they only fail
    /// when launched.
    pub fn has_cycle(&self) -> bool {
        let mut nodes = self.clone_nodes();
        if let Err(e) = peel(&mut nodes, TaskId::ROOT, |_| Ok(())) {
            // An interrupted peel leaves nodes behind and reports a cycle.
            warn!(error = %e, "cycle check stopped early");
        }
        !nodes.is_empty()
    }

    /// Task names of every cycle, one list per strongly connected component.
    pub fn cycles(&self) -> Vec<Vec<String>> {
        let mut graph: DiGraphMap<TaskId, ()> = DiGraphMap::new();
        for node in self.nodes() {
            graph.add_node(node.id());
            for dep in node.dependencies() {
                graph.add_edge(dep, node.id(), ());
            }
        }

        tarjan_scc(&graph)
            .into_iter()
            .filter(|scc| scc.len() > 1 || graph.contains_edge(scc[0], scc[0]))
            .map(|scc| {
                let mut names: Vec<String> = scc
                    .iter()
                    .filter_map(|id| self.nodes.get(id))
                    .map(|n| n.task().name().to_string())
                    .collect();
                names.sort();
                names
            })
            .collect()
    }

    pub(crate) fn tag_index(&self) -> &HashMap<String, TaskId> {
        &self.tags
    }

    pub(crate) fn raw_node(&self, id: TaskId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    fn insert_node(
        &mut self,
        task: &TaskHandle,
        context: ExecutionContext,
        priority: i32,
        tag: Option<String>,
    ) {
        let id = task.id();
        let node = Node::new(TaskRecord {
            task: task.clone(),
            context,
            priority,
            tag,
        });
        self.nodes.insert(id, node);
        self.link(TaskId::ROOT, id);
        debug!(task = %task, "registered new task");
    }

    /// Add the edge `from -> to` (`to` depends on `from`).
    fn link(&mut self, from: TaskId, to: TaskId) {
        if let Some(node) = self.nodes.get_mut(&to) {
            node.add_predecessor(from);
        }
        if let Some(node) = self.nodes.get_mut(&from) {
            node.add_successor(to);
        }
    }

    fn unlink(&mut self, from: TaskId, to: TaskId) {
        if let Some(node) = self.nodes.get_mut(&to) {
            node.remove_predecessor(from);
        }
        if let Some(node) = self.nodes.get_mut(&from) {
            node.remove_successor(to);
        }
    }
}
