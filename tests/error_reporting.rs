// tests/error_reporting.rs

use dagstart::errors::DagstartError;
use dagstart::{TaskFailure, TaskHandle, TaskId};

#[test]
fn fatal_launch_errors_name_what_went_missing() {
    let task = TaskHandle::new("fetch", || {});

    let node = DagstartError::NodeNotFound(task.id().to_string()).to_string();
    assert!(node.contains(&format!("#{}", task.id().as_u64())), "{node}");

    let unit = DagstartError::MissingUnit(task.to_string()).to_string();
    assert!(unit.contains("fetch"), "{unit}");

    let root = DagstartError::RootMissing.to_string();
    assert!(root.contains("Root"), "{root}");

    assert_eq!(TaskId::ROOT.to_string(), "#0");
}

#[test]
fn task_failure_is_transparent_through_launch_errors() {
    let failure = TaskFailure::Panicked {
        task: "parse".to_string(),
        message: "bad input".to_string(),
    };
    let err: DagstartError = failure.clone().into();

    assert_eq!(err.to_string(), failure.to_string());
    assert!(err.to_string().contains("parse"));
    assert!(err.to_string().contains("bad input"));
    match err {
        DagstartError::Task(inner) => {
            assert_eq!(inner.task(), "parse");
            assert!(!inner.is_cancelled());
        }
        other => panic!("Expected Task error, got: {:?}", other),
    }
}
