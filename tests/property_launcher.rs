// tests/property_launcher.rs

use std::collections::HashSet;

use dagstart::config::RuntimeSection;
use dagstart::{Launcher, TaskGraph, TaskHandle, TaskOptions};
use dagstart_test_utils::Journal;
use proptest::prelude::*;

/// A random DAG: task `i` may only depend on tasks `0..i`, so the raw
/// dependency indices are reduced modulo `i`.
#[derive(Debug, Clone)]
struct DagShape {
    deps: Vec<Vec<usize>>,
    priorities: Vec<i32>,
}

fn dag_strategy(max_tasks: usize) -> impl Strategy<Value = DagShape> {
    (1..=max_tasks).prop_flat_map(|num_tasks| {
        let deps = proptest::collection::vec(
            proptest::collection::vec(any::<usize>(), 0..4),
            num_tasks,
        );
        let priorities = proptest::collection::vec(-5i32..5, num_tasks);

        (deps, priorities).prop_map(|(raw_deps, priorities)| {
            let deps = raw_deps
                .into_iter()
                .enumerate()
                .map(|(i, potential)| {
                    if i == 0 {
                        return Vec::new();
                    }
                    let unique: HashSet<usize> = potential.into_iter().map(|d| d % i).collect();
                    let mut unique: Vec<usize> = unique.into_iter().collect();
                    unique.sort();
                    unique
                })
                .collect();
            DagShape { deps, priorities }
        })
    })
}

fn build(shape: &DagShape, journal: &Journal) -> (TaskGraph, Vec<TaskHandle>) {
    let tasks: Vec<TaskHandle> = (0..shape.deps.len())
        .map(|i| journal.task(&format!("task_{i}")))
        .collect();

    let mut graph = TaskGraph::new();
    for (i, deps) in shape.deps.iter().enumerate() {
        graph.register(
            &tasks[i],
            TaskOptions::new().priority(shape.priorities[i]),
            deps.iter().map(|d| &tasks[*d]),
        );
    }
    (graph, tasks)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn every_task_runs_once_after_its_dependencies(shape in dag_strategy(12)) {
        let journal = Journal::new();
        let (graph, _) = build(&shape, &journal);
        prop_assert!(!graph.has_cycle());

        let runtime = RuntimeSection {
            worker_threads: Some(2),
            ..RuntimeSection::default()
        }
        .build_runtime()
        .unwrap();
        let launched = runtime.block_on(Launcher::run(&graph));
        runtime.shutdown_background();
        prop_assert!(launched.is_ok(), "launch failed: {:?}", launched.err());

        for (i, deps) in shape.deps.iter().enumerate() {
            let name = format!("task_{i}");
            prop_assert_eq!(journal.start_count(&name), 1);
            for d in deps {
                prop_assert!(
                    journal.finished_before_started(&format!("task_{d}"), &name),
                    "task_{} must finish before {} starts", d, name
                );
            }
        }
    }

    #[test]
    fn back_edge_makes_a_cycle(shape in dag_strategy(8)) {
        let journal = Journal::new();
        let (mut graph, tasks) = build(&shape, &journal);

        // Any edge from a task to one of its dependencies closes a loop.
        let Some((i, dep)) = shape
            .deps
            .iter()
            .enumerate()
            .find_map(|(i, deps)| deps.first().map(|d| (i, *d)))
        else {
            return Ok(());
        };

        graph.add_after(&tasks[dep], [&tasks[i]]);
        prop_assert!(graph.has_cycle());
        prop_assert!(!graph.cycles().is_empty());
    }
}
