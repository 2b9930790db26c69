//! The functional file gets one line per frame, initial frame included.
//! Fresh runs start it over; restarts append to it.

use stepwise_engine::{Controller, OutputStyle, RunConfig, RunContext};
use stepwise_test_utils::{ConstFunctional, MockSolution, MockSolver};

#[test]
fn three_functionals_over_four_steps() {
    let dir = tempfile::tempdir().unwrap();
    let config = RunConfig {
        style: OutputStyle::uniform(4, 1.0),
        ..RunConfig::default()
    };
    let mut c = Controller::new(config, RunContext::new(dir.path())).unwrap();
    c.attach_solver(MockSolver::new("mock"));
    c.attach_solution(MockSolution::new(1, 2));
    c.attach_functional(ConstFunctional::new(&[1.0, 2.5, -3.0]));
    c.run().unwrap();

    let text = std::fs::read_to_string(dir.path().join("functionals.txt")).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        lines,
        [
            "0 1 2.5 -3",
            "0.25 1 2.5 -3",
            "0.5 1 2.5 -3",
            "0.75 1 2.5 -3",
            "1 1 2.5 -3",
        ]
    );
    assert!(lines.iter().all(|l| l.split(' ').count() == 4));
}

#[test]
fn fresh_run_truncates_custom_prefix_file() {
    let dir = tempfile::tempdir().unwrap();
    let context = RunContext {
        functional_prefix: "energy".to_string(),
        ..RunContext::new(dir.path())
    };
    std::fs::write(dir.path().join("energy.txt"), "stale\n").unwrap();
    let config = RunConfig {
        style: OutputStyle::uniform(1, 2.0),
        overwrite: true,
        ..RunConfig::default()
    };
    let mut c = Controller::new(config, context).unwrap();
    c.attach_solver(MockSolver::new("mock"));
    c.attach_solution(MockSolution::new(1, 1));
    c.attach_functional(ConstFunctional::new(&[7.0]));
    c.run().unwrap();
    let text = std::fs::read_to_string(dir.path().join("energy.txt")).unwrap();
    assert_eq!(text, "0 7\n2 7\n");
}

#[test]
fn restart_appends_to_earlier_records() {
    let dir = tempfile::tempdir().unwrap();
    let first = RunConfig {
        style: OutputStyle::uniform(2, 2.0),
        ..RunConfig::default()
    };
    let mut c = Controller::new(first, RunContext::new(dir.path())).unwrap();
    c.attach_solver(MockSolver::new("mock"));
    c.attach_solution(MockSolution::new(1, 1));
    c.attach_functional(ConstFunctional::new(&[1.0]));
    c.run().unwrap();
    let path = dir.path().join("functionals.txt");
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "0 1\n1 1\n2 1\n");

    let restart = RunConfig {
        style: OutputStyle::uniform(4, 4.0),
        start_frame: 2,
        overwrite: true,
        ..RunConfig::default()
    };
    let mut c = Controller::new(restart, RunContext::new(dir.path())).unwrap();
    c.attach_solver(MockSolver::new("mock"));
    c.attach_solution(MockSolution::new(1, 1).at_time(2.0));
    c.attach_functional(ConstFunctional::new(&[1.0]));
    c.run().unwrap();
    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        "0 1\n1 1\n2 1\n2 1\n3 1\n4 1\n"
    );
}

#[test]
fn no_functional_file_when_output_disabled() {
    let dir = tempfile::tempdir().unwrap();
    let config = RunConfig {
        style: OutputStyle::uniform(2, 1.0),
        output_format: None,
        ..RunConfig::default()
    };
    let mut c = Controller::new(config, RunContext::new(dir.path())).unwrap();
    c.attach_solver(MockSolver::new("mock"));
    c.attach_solution(MockSolution::new(1, 1));
    c.attach_functional(ConstFunctional::new(&[1.0]));
    c.run().unwrap();
    assert!(!dir.path().join("functionals.txt").exists());
}
