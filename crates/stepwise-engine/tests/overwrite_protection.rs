//! A run must not touch an existing, non-empty output directory unless
//! overwriting is enabled.

use std::path::Path;

use stepwise_engine::{Controller, ErrorKind, OutputStyle, RunConfig, RunContext, RunError};
use stepwise_test_utils::{ConstFunctional, MockSolution, MockSolver};

fn config(overwrite: bool) -> RunConfig {
    RunConfig {
        style: OutputStyle::uniform(2, 1.0),
        overwrite,
        ..RunConfig::default()
    }
}

fn snapshot(dir: &Path) -> Vec<(String, Vec<u8>)> {
    let mut entries: Vec<(String, Vec<u8>)> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| {
            let e = e.unwrap();
            (
                e.file_name().to_string_lossy().into_owned(),
                std::fs::read(e.path()).unwrap(),
            )
        })
        .collect();
    entries.sort();
    entries
}

#[test]
fn refuses_non_empty_outdir_and_touches_nothing() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("0.ascii"), "old frame").unwrap();
    std::fs::write(dir.path().join("notes.txt"), "keep me").unwrap();
    let before = snapshot(dir.path());

    let solver = MockSolver::new("mock");
    let probe = solver.probe();
    let mut c = Controller::new(config(false), RunContext::new(dir.path())).unwrap();
    c.attach_solver(solver);
    c.attach_solution(MockSolution::new(1, 2).with_gauge("1", 0.5));
    c.attach_functional(ConstFunctional::new(&[1.0]));

    let err = c.run().unwrap_err();
    match &err {
        RunError::OverwriteProtected { outdir } => assert_eq!(outdir, dir.path()),
        other => panic!("expected OverwriteProtected, got {other:?}"),
    }
    assert_eq!(err.kind(), ErrorKind::OverwriteProtection);
    assert_eq!(snapshot(dir.path()), before);
    assert_eq!(probe.setup_calls(), 0);
    assert_eq!(probe.teardown_calls(), 0);
    assert_eq!(probe.evolve_calls(), 0);
}

#[test]
fn default_config_refuses_non_empty_outdir() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("1.ascii"), "precious").unwrap();
    let config = RunConfig {
        style: OutputStyle::uniform(2, 1.0),
        ..RunConfig::default()
    };
    assert!(!config.overwrite);
    let mut c = Controller::new(config, RunContext::new(dir.path())).unwrap();
    c.attach_solver(MockSolver::new("mock"));
    c.attach_solution(MockSolution::new(1, 2));
    match c.run() {
        Err(RunError::OverwriteProtected { .. }) => {}
        other => panic!("expected OverwriteProtected, got {other:?}"),
    }
    assert_eq!(
        std::fs::read_to_string(dir.path().join("1.ascii")).unwrap(),
        "precious"
    );
}

#[test]
fn empty_existing_outdir_is_accepted() {
    let dir = tempfile::tempdir().unwrap();
    let mut c = Controller::new(config(false), RunContext::new(dir.path())).unwrap();
    c.attach_solver(MockSolver::new("mock"));
    c.attach_solution(MockSolution::new(1, 2));
    c.run().unwrap();
    assert!(dir.path().join("2.ascii").exists());
}

#[test]
fn overwrite_replaces_previous_frames() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("1.ascii"), "stale").unwrap();
    let mut c = Controller::new(config(true), RunContext::new(dir.path())).unwrap();
    c.attach_solver(MockSolver::new("mock"));
    c.attach_solution(MockSolution::new(1, 2));
    c.run().unwrap();
    let text = std::fs::read_to_string(dir.path().join("1.ascii")).unwrap();
    assert!(text.starts_with("    1                  frame\n"));
}

#[test]
fn gauges_keep_the_check_with_output_disabled() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("gauge1.txt"), "old gauge\n").unwrap();
    let config = RunConfig {
        output_format: None,
        ..config(false)
    };
    let solver = MockSolver::new("mock");
    let probe = solver.probe();
    let mut c = Controller::new(config, RunContext::new(dir.path())).unwrap();
    c.attach_solver(solver);
    c.attach_solution(MockSolution::new(1, 2).with_gauge("1", 0.5));
    match c.run() {
        Err(RunError::OverwriteProtected { .. }) => {}
        other => panic!("expected OverwriteProtected, got {other:?}"),
    }
    assert_eq!(
        std::fs::read_to_string(dir.path().join("gauge1.txt")).unwrap(),
        "old gauge\n"
    );
    assert_eq!(probe.setup_calls(), 0);
}

#[test]
fn disabled_output_without_gauges_skips_the_check() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("0.ascii"), "old frame").unwrap();
    let config = RunConfig {
        output_format: None,
        ..config(false)
    };
    let mut c = Controller::new(config, RunContext::new(dir.path())).unwrap();
    c.attach_solver(MockSolver::new("mock"));
    c.attach_solution(MockSolution::new(1, 2));
    c.run().unwrap();
    assert_eq!(
        std::fs::read_to_string(dir.path().join("0.ascii")).unwrap(),
        "old frame"
    );
}
