// src/launcher.rs

//! One-shot launcher turning a [`TaskGraph`] into running units.
//!
//! Launching works on a private clone of the graph:
//! 1. sort every adjacency list by ascending priority,
//! 2. peel from the root, building one deferred [`Unit`] per visited node,
//! 3. fail hard if anything is left (circular dependency),
//! 4. launch one waiter per leaf; joining a leaf starts it, and every unit
//!    starts its own dependencies before waiting on them, so the leaves
//!    transitively kick off the whole graph.

use std::collections::HashMap;

use tracing::{debug, info, warn};

use crate::config::ConfigFile;
use crate::dag::{NodeMap, TaskGraph, peel};
use crate::dag::node::Node;
use crate::errors::{DagstartError, Result, TaskFailure};
use crate::exec::{LaunchScope, Unit};
use crate::task::{TaskHandle, TaskId};

/// Running (or finished) launch of a task graph.
///
/// The unit map and leaf list are fixed once [`Launcher::start`] returns.
#[derive(Debug)]
pub struct Launcher {
    scope: LaunchScope,
    units: HashMap<TaskId, Unit>,
    /// Leaf tasks in kickoff order.
    leaves: Vec<TaskId>,
    /// Tag index snapshot taken at launch.
    tags: HashMap<String, TaskId>,
}

impl Launcher {
    /// Wire and kick off every task of `graph` inside `scope`.
    ///
    /// Does not block. Either returns a launcher whose units are all wired
    /// and triggered, or an error with nothing started.
    pub fn start(scope: &LaunchScope, graph: &TaskGraph) -> Result<Self> {
        let mut launcher = Self {
            scope: scope.clone(),
            units: HashMap::new(),
            leaves: Vec::new(),
            tags: graph.tag_index().clone(),
        };

        launcher.wire(graph)?;
        launcher.kick_off();

        info!(
            units = launcher.units.len(),
            leaves = launcher.leaves.len(),
            "launcher: task graph started"
        );
        Ok(launcher)
    }

    /// Like [`Launcher::start`], honouring the `[launcher]` config section.
    pub fn start_with_config(scope: &LaunchScope, graph: &TaskGraph, cfg: &ConfigFile) -> Result<Self> {
        if cfg.launcher.precheck_cycles && graph.has_cycle() {
            for cycle in graph.cycles() {
                warn!(?cycle, "launcher: circular dependency in task graph");
            }
        }
        Self::start(scope, graph)
    }

    /// Open a scope on the current runtime, launch `graph` in it and wait
    /// until everything launched there has finished.
    pub async fn run(graph: &TaskGraph) -> Result<Self> {
        let scope = LaunchScope::new()?;
        let launcher = Self::start(&scope, graph)?;

        scope.wait().await;
        if let Some(failure) = scope.failure() {
            return Err(failure.into());
        }
        Ok(launcher)
    }

    /// Wait until every leaf, and therefore every task, has finished.
    ///
    /// Starts nothing itself; can be called any number of times.
    pub async fn await_all(&self) -> Result<()> {
        for id in &self.leaves {
            if let Some(unit) = self.units.get(id) {
                unit.join().await.map_err(|f| self.root_cause(f))?;
            }
        }
        Ok(())
    }

    /// Wait for the tasks registered under `tags`. Unknown tags are skipped.
    pub async fn await_tasks<I, S>(&self, tags: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for tag in tags {
            let tag = tag.as_ref();
            match self.unit(tag) {
                Some(unit) => unit.join().await.map_err(|f| self.root_cause(f))?,
                None => debug!(tag, "await on unknown tag; skipping"),
            }
        }
        Ok(())
    }

    /// Completion handle for the task registered under `tag`.
    pub fn unit(&self, tag: &str) -> Option<Unit> {
        self.tags
            .get(tag)
            .and_then(|id| self.units.get(id))
            .cloned()
    }

    /// Completion handle for `task`, tagged or not.
    pub fn unit_of(&self, task: &TaskHandle) -> Option<Unit> {
        if task.id().is_root() {
            return None;
        }
        self.units.get(&task.id()).cloned()
    }

    /// Non-blocking: `true` only if every tag names a finished unit.
    pub fn is_task_completed<I, S>(&self, tags: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        tags.into_iter()
            .all(|tag| self.unit(tag.as_ref()).is_some_and(|u| u.is_finished()))
    }

    /// Non-blocking: `true` once every leaf unit has finished.
    pub fn is_completed(&self) -> bool {
        self.leaves
            .iter()
            .all(|id| self.units.get(id).is_some_and(Unit::is_finished))
    }

    pub fn leaves(&self) -> &[TaskId] {
        &self.leaves
    }

    /// Number of units, the root's included.
    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn scope(&self) -> &LaunchScope {
        &self.scope
    }

    /// Cancel the enclosing scope.
    pub fn cancel(&self) {
        self.scope.cancel();
    }

    /// Prefer the failure that cancelled the scope over the cancellation it
    /// caused.
    fn root_cause(&self, failure: TaskFailure) -> DagstartError {
        self.scope.failure().unwrap_or(failure).into()
    }

    fn wire(&mut self, graph: &TaskGraph) -> Result<()> {
        let mut nodes = graph.clone_nodes();
        sort_by_priority(&mut nodes);

        if !nodes.contains_key(&TaskId::ROOT) {
            return Err(DagstartError::RootMissing);
        }

        // Peeling drains predecessor lists, so keep the sorted order aside.
        let predecessors: HashMap<TaskId, Vec<TaskId>> = nodes
            .iter()
            .map(|(id, node)| (*id, node.predecessors.clone()))
            .collect();

        let scope = &self.scope;
        let units = &mut self.units;
        let leaves = &mut self.leaves;

        peel(&mut nodes, TaskId::ROOT, |id| {
            let original = graph
                .raw_node(id)
                .ok_or_else(|| DagstartError::NodeNotFound(id.to_string()))?;

            if original.successors.is_empty() {
                leaves.push(id);
            }

            let deps = predecessors
                .get(&id)
                .map(Vec::as_slice)
                .unwrap_or_default()
                .iter()
                .map(|dep| {
                    units.get(dep).cloned().ok_or_else(|| {
                        let name = graph
                            .raw_node(*dep)
                            .map(|n| n.task().to_string())
                            .unwrap_or_else(|| dep.to_string());
                        DagstartError::MissingUnit(name)
                    })
                })
                .collect::<Result<Vec<_>>>()?;

            units.insert(id, deferred_unit(scope, original, deps));
            Ok(())
        })?;

        if !nodes.is_empty() {
            return Err(DagstartError::CircularDependency(describe_cycles(graph, &nodes)));
        }

        self.leaves.sort_by_key(|id| {
            graph
                .raw_node(*id)
                .map(Node::priority)
                .unwrap_or_default()
        });

        Ok(())
    }

    /// Launch one waiter per leaf. This is the only place units get
    /// triggered from outside the graph.
    fn kick_off(&self) {
        for id in &self.leaves {
            let Some(unit) = self.units.get(id).cloned() else {
                continue;
            };
            debug!(task = %unit.task(), "launching leaf waiter");
            self.scope.launch(async move {
                let _ = unit.join().await;
            });
        }
    }
}

/// Stable-sort every adjacency list by ascending priority.
fn sort_by_priority(nodes: &mut NodeMap) {
    let priorities: HashMap<TaskId, i32> = nodes
        .iter()
        .map(|(id, node)| (*id, node.priority()))
        .collect();
    let priority_of = |id: &TaskId| priorities.get(id).copied().unwrap_or_default();

    for node in nodes.values_mut() {
        node.predecessors.sort_by_key(priority_of);
        node.successors.sort_by_key(priority_of);
    }
}

/// Unit whose body starts `deps`, waits for all of them, then runs the task
/// on its execution context.
fn deferred_unit(scope: &LaunchScope, node: &Node, deps: Vec<Unit>) -> Unit {
    let task = node.task().clone();
    let context = node.context().clone();
    let handle = scope.handle().clone();
    let runner = task.clone();

    let body = Box::pin(async move {
        for dep in &deps {
            dep.start();
        }
        for dep in &deps {
            if let Err(failure) = dep.join().await {
                debug!(task = %runner, dependency = %dep.task(), %failure, "dependency failed; not running task");
                return Err(TaskFailure::Cancelled {
                    task: runner.name().to_string(),
                });
            }
        }

        if runner.id().is_root() {
            return Ok(());
        }

        debug!(task = %runner, context = context.label(), "dependencies finished; running task");
        context.dispatch(runner, &handle).await
    });

    Unit::deferred(task, scope.clone(), body)
}

fn describe_cycles(graph: &TaskGraph, residual: &NodeMap) -> String {
    let cycles = graph.cycles();
    if cycles.is_empty() {
        let mut names: Vec<String> = residual.values().map(|n| n.task().to_string()).collect();
        names.sort();
        return format!("{} task(s) could not be ordered: {}", names.len(), names.join(", "));
    }

    let cycles: Vec<String> = cycles
        .iter()
        .map(|cycle| format!("[{}]", cycle.join(" -> ")))
        .collect();
    format!(
        "{} task(s) could not be ordered; cycles: {}",
        residual.len(),
        cycles.join(", ")
    )
}
