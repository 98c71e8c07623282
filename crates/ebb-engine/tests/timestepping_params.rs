//! Scenario: domains must agree on their timestepping parameters.
//!
//! `nts` and the phase count are read from the first domain; any other
//! domain reporting different values fails project startup before a
//! single worker is spawned.

use ebb_engine::{ConcurrencyConfig, Domain, EngineError, Project};
use ebb_test_utils::{EventLog, ScriptedModel};

fn nested_project(
    parent: ScriptedModel,
    child: ScriptedModel,
) -> Project<ScriptedModel> {
    let mut project = Project::new("p");
    project
        .add_domain(Domain::new("A", "/a", "/oA", parent))
        .unwrap();
    project
        .add_child_domain(Domain::new("B", "/b", "/oB", child), "A")
        .unwrap();
    project
}

#[test]
fn phase_count_mismatch_fails_startup() {
    let log = EventLog::new();
    let parent = ScriptedModel::new("A", 2, 2, log.sender());
    let child = ScriptedModel::new("B", 2, 3, log.sender());

    let err = nested_project(parent, child)
        .run(ConcurrencyConfig::default())
        .unwrap_err();
    match err {
        EngineError::TimesteppingMismatch {
            domain,
            param,
            expected,
            actual,
        } => {
            assert_eq!(domain, "B");
            assert_eq!(param, "nPhases");
            assert_eq!((expected, actual), (2, 3));
        }
        other => panic!("expected TimesteppingMismatch, got {other}"),
    }

    // Startup failed before timestepping: no phase ever ran.
    assert!(log.drain().is_empty());
}

#[test]
fn nts_mismatch_fails_startup() {
    let log = EventLog::new();
    let parent = ScriptedModel::new("A", 2, 2, log.sender());
    let child = ScriptedModel::new("B", 5, 2, log.sender());

    let err = nested_project(parent, child)
        .run(ConcurrencyConfig::default())
        .unwrap_err();
    assert!(matches!(
        err,
        EngineError::TimesteppingMismatch { param: "nts", .. }
    ));
    assert!(log.drain().is_empty());
}
