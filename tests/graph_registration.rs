// tests/graph_registration.rs

mod common;
use crate::common::{chain_graph, init_tracing, two_cycle_graph, Journal};

use dagstart::config::ConfigFile;
use dagstart::{ExecutionContext, TaskGraph, TaskHandle, TaskId, TaskOptions};

#[test]
fn new_task_is_anchored_on_root() {
    init_tracing();

    let a = TaskHandle::new("A", || {});
    let mut graph = TaskGraph::new();
    graph.add(&a);

    let node = graph.node(&a).expect("A registered");
    assert!(node.is_anchored_on_root());
    assert_eq!(node.dependencies().count(), 0);
    assert_eq!(node.priority(), 0);
    assert_eq!(node.tag(), None);
    assert_eq!(graph.len(), 1);
}

#[test]
fn separately_created_handles_are_distinct_tasks() {
    let a1 = TaskHandle::new("A", || {});
    let a2 = TaskHandle::new("A", || {});
    assert_ne!(a1, a2);
    assert_eq!(a1.clone(), a1);

    let mut graph = TaskGraph::new();
    graph.add(&a1).add(&a2).add(&a1.clone());

    assert_eq!(graph.len(), 2);
}

#[test]
fn re_registration_overwrites_metadata_without_duplicating_node() {
    let a = TaskHandle::new("A", || {});
    let mut graph = TaskGraph::new();

    graph.register(&a, TaskOptions::new().priority(5).tag("first"), std::iter::empty());
    graph.register(
        &a,
        TaskOptions::new()
            .priority(-3)
            .tag("second")
            .context(ExecutionContext::Blocking),
        std::iter::empty(),
    );

    assert_eq!(graph.len(), 1);
    let node = graph.node(&a).unwrap();
    assert_eq!(node.priority(), -3);
    assert_eq!(node.tag(), Some("second"));
    assert!(matches!(node.context(), ExecutionContext::Blocking));

    assert!(graph.lookup("first").is_none(), "stale tag must be dropped");
    assert_eq!(graph.lookup("second").map(|n| n.id()), Some(a.id()));
}

#[test]
fn re_registration_with_empty_tag_clears_index_entry() {
    let a = TaskHandle::new("A", || {});
    let mut graph = TaskGraph::new();

    graph.add_tagged(&a, "alpha", std::iter::empty());
    assert!(graph.lookup("alpha").is_some());

    graph.add_tagged(&a, "", std::iter::empty());
    assert!(graph.lookup("alpha").is_none());
    assert!(graph.lookup("").is_none());
    assert_eq!(graph.node(&a).unwrap().tag(), None);
}

#[test]
fn tag_reused_by_another_task_is_last_write_wins() {
    let a = TaskHandle::new("A", || {});
    let b = TaskHandle::new("B", || {});
    let mut graph = TaskGraph::new();

    graph.add_tagged(&a, "shared", std::iter::empty());
    graph.add_tagged(&b, "shared", std::iter::empty());
    assert_eq!(graph.lookup("shared").map(|n| n.id()), Some(b.id()));

    // Moving A off the tag must not remove B's entry.
    graph.add_tagged(&a, "other", std::iter::empty());
    assert_eq!(graph.lookup("shared").map(|n| n.id()), Some(b.id()));
    assert_eq!(graph.lookup("other").map(|n| n.id()), Some(a.id()));
}

#[test]
fn dependencies_create_placeholders_configured_later() {
    let a = TaskHandle::new("A", || {});
    let b = TaskHandle::new("B", || {});
    let mut graph = TaskGraph::new();

    graph.add_after(&b, [&a]);
    assert_eq!(graph.len(), 2);

    let placeholder = graph.node(&a).unwrap();
    assert!(placeholder.is_anchored_on_root());
    assert_eq!(placeholder.priority(), 0);
    assert_eq!(placeholder.dependents(), &[b.id()]);

    let dependent = graph.node(&b).unwrap();
    assert!(!dependent.is_anchored_on_root());
    assert_eq!(dependent.dependencies().collect::<Vec<_>>(), vec![a.id()]);

    graph.register(&a, TaskOptions::new().priority(7).tag("a"), std::iter::empty());
    assert_eq!(graph.len(), 2);
    let configured = graph.lookup("a").unwrap();
    assert_eq!(configured.priority(), 7);
    assert_eq!(configured.dependents(), &[b.id()]);
}

#[test]
fn duplicate_edges_are_ignored() {
    let a = TaskHandle::new("A", || {});
    let b = TaskHandle::new("B", || {});
    let mut graph = TaskGraph::new();

    graph.add_after(&b, [&a, &a]).add_after(&b, [&a]);

    assert_eq!(graph.node(&b).unwrap().dependencies().count(), 1);
    assert_eq!(graph.node(&a).unwrap().dependents().len(), 1);
}

#[test]
fn re_registration_without_dependencies_keeps_existing_edges() {
    let a = TaskHandle::new("A", || {});
    let b = TaskHandle::new("B", || {});
    let mut graph = TaskGraph::new();

    graph.add_after(&b, [&a]).add(&b);

    let node = graph.node(&b).unwrap();
    assert!(!node.is_anchored_on_root());
    assert_eq!(node.dependencies().collect::<Vec<_>>(), vec![a.id()]);
}

#[test]
fn acyclic_graph_has_no_cycle() {
    let journal = Journal::new();
    let (graph, _) = chain_graph(&journal);

    assert!(!graph.has_cycle());
    assert!(graph.cycles().is_empty());
}

#[test]
fn cycle_check_is_repeatable_and_non_destructive() {
    let journal = Journal::new();
    let (graph, [p, q]) = two_cycle_graph(&journal);

    for _ in 0..3 {
        assert!(graph.has_cycle());
    }

    assert_eq!(graph.len(), 2);
    assert_eq!(graph.node(&p).unwrap().dependencies().collect::<Vec<_>>(), vec![q.id()]);
    assert_eq!(graph.node(&q).unwrap().dependencies().collect::<Vec<_>>(), vec![p.id()]);
    assert_eq!(graph.cycles(), vec![vec!["P".to_string(), "Q".to_string()]]);
}

#[test]
fn self_dependency_is_a_cycle() {
    let a = TaskHandle::new("A", || {});
    let mut graph = TaskGraph::new();
    graph.add_after(&a, [&a]);

    assert!(graph.has_cycle());
    assert_eq!(graph.cycles(), vec![vec!["A".to_string()]]);
}

#[test]
fn cycles_exclude_tasks_that_only_depend_on_a_cycle() {
    let a = TaskHandle::new("A", || {});
    let b = TaskHandle::new("B", || {});
    let c = TaskHandle::new("C", || {});
    let tail = TaskHandle::new("tail", || {});
    let free = TaskHandle::new("free", || {});

    let mut graph = TaskGraph::new();
    graph
        .add_after(&a, [&c])
        .add_after(&b, [&a])
        .add_after(&c, [&b])
        .add_after(&tail, [&c])
        .add(&free);

    assert!(graph.has_cycle());
    assert_eq!(
        graph.cycles(),
        vec![vec!["A".to_string(), "B".to_string(), "C".to_string()]]
    );
}

#[test]
fn cloned_nodes_are_independent_of_the_graph() {
    let journal = Journal::new();
    let (graph, [x, ..]) = chain_graph(&journal);

    let mut clone = graph.clone_nodes();
    assert_eq!(clone.len(), graph.len() + 1, "clone includes the root");

    clone.remove(&x.id());
    clone.clear();

    assert!(graph.contains(&x));
    assert_eq!(graph.node(&x).unwrap().dependents().len(), 2);
    assert!(graph.node_by_id(TaskId::ROOT).is_none(), "root is never exposed");
}

#[test]
fn config_sets_default_context_for_registrations() {
    let cfg = ConfigFile::from_toml_str(
        r#"
[launcher]
default_context = "blocking"
"#,
    )
    .unwrap();

    let a = TaskHandle::new("A", || {});
    let b = TaskHandle::new("B", || {});
    let c = TaskHandle::new("C", || {});
    let mut graph = TaskGraph::from_config(&cfg);
    graph
        .add_after(&b, [&a])
        .add_on(&c, ExecutionContext::Worker, std::iter::empty());

    assert!(matches!(graph.default_context(), ExecutionContext::Blocking));
    assert!(matches!(graph.node(&a).unwrap().context(), ExecutionContext::Blocking));
    assert!(matches!(graph.node(&b).unwrap().context(), ExecutionContext::Blocking));
    assert!(matches!(graph.node(&c).unwrap().context(), ExecutionContext::Worker));
}
