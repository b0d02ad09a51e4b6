// src/dag/peel.rs

//! In-degree peeling shared by cycle detection and launching.

use std::collections::HashMap;

use crate::dag::node::Node;
use crate::errors::Result;
use crate::task::TaskId;

/// Owned node map that peeling consumes.
pub type NodeMap = HashMap<TaskId, Node>;

/// Repeatedly remove zero-predecessor nodes, starting at `start`.
///
/// Each removed node is passed to `visit` before any of its successors can
/// be, and only after all of its predecessors were. Successors are examined
/// in list order, so sorting the lists beforehand fixes the visit order of
/// siblings. Nodes that are still in `nodes` afterwards lie on, or behind, a
/// cycle.
///
/// Does nothing if `start` is absent or still has predecessors. The first
/// error returned by `visit` stops the peel.
pub fn peel<F>(nodes: &mut NodeMap, start: TaskId, mut visit: F) -> Result<()>
where
    F: FnMut(TaskId) -> Result<()>,
{
    match nodes.get(&start) {
        Some(node) if node.predecessors.is_empty() => {}
        _ => return Ok(()),
    }

    let mut stack = vec![start];

    while let Some(id) = stack.pop() {
        let Some(node) = nodes.remove(&id) else {
            continue;
        };
        visit(id)?;

        let mut ready = Vec::new();
        for succ in &node.successors {
            if let Some(succ_node) = nodes.get_mut(succ) {
                succ_node.remove_predecessor(id);
                if succ_node.predecessors.is_empty() {
                    ready.push(*succ);
                }
            }
        }

        // Reverse so the first ready successor is visited first.
        stack.extend(ready.into_iter().rev());
    }

    Ok(())
}
