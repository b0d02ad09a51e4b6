#![allow(dead_code)]

pub use dagstart_test_utils::{init_tracing, with_timeout, Event, Journal, RecordingDispatcher};

use dagstart::{TaskGraph, TaskHandle};

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

/// Chain: Y after X, Z after X and Y.
pub fn chain_graph(journal: &Journal) -> (TaskGraph, [TaskHandle; 3]) {
    let x = journal.task("X");
    let y = journal.task("Y");
    let z = journal.task("Z");

    let mut graph = TaskGraph::new();
    graph
        .add(&x)
        .add_after(&y, [&x])
        .add_after(&z, [&x, &y]);

    (graph, [x, y, z])
}

/// Two-task cycle: P after Q, Q after P.
pub fn two_cycle_graph(journal: &Journal) -> (TaskGraph, [TaskHandle; 2]) {
    let p = journal.task("P");
    let q = journal.task("Q");

    let mut graph = TaskGraph::new();
    graph.add_after(&p, [&q]).add_after(&q, [&p]);

    (graph, [p, q])
}
