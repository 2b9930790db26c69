//! Output style 3: one frame per block of `nstepout` raw steps.

use stepwise_engine::{Controller, ErrorKind, OutputStyle, RunConfig, RunContext};
use stepwise_test_utils::{FailingSolver, MockSolution, MockSolver};

fn cadence(num_output_times: u32, nstepout: u32, start_frame: u32) -> RunConfig {
    RunConfig {
        style: OutputStyle::step_cadence(num_output_times, nstepout),
        start_frame,
        ..RunConfig::default()
    }
}

#[test]
fn one_frame_per_block() {
    let dir = tempfile::tempdir().unwrap();
    let solver = MockSolver::new("stepper").with_single_step(0.25);
    let probe = solver.probe();
    let mut c = Controller::new(cadence(4, 3, 0), RunContext::new(dir.path())).unwrap();
    c.attach_solver(solver);
    c.attach_solution(MockSolution::new(1, 2));
    let outcome = c.run().unwrap();

    assert_eq!(probe.step_calls(), 12);
    assert_eq!(probe.evolve_calls(), 0);
    assert_eq!(outcome.frames, 5);
    assert_eq!(outcome.status.map(|s| s.num_steps), Some(12));
    for (frame, t) in [(1, "7.50000000e-01"), (2, "1.50000000e+00"), (4, "3.00000000e+00")] {
        let text = std::fs::read_to_string(dir.path().join(format!("{frame}.ascii"))).unwrap();
        let t_line = text.lines().nth(3).unwrap();
        assert_eq!(t_line.trim(), format!("{t}     t"));
    }
}

#[test]
fn start_frame_reduces_block_count() {
    let dir = tempfile::tempdir().unwrap();
    let solver = MockSolver::new("stepper").with_single_step(1.0);
    let probe = solver.probe();
    let mut c = Controller::new(cadence(4, 2, 2), RunContext::new(dir.path())).unwrap();
    c.attach_solver(solver);
    c.attach_solution(MockSolution::new(1, 1));
    let outcome = c.run().unwrap();
    assert_eq!(probe.step_calls(), 4);
    assert_eq!(outcome.frames, 3);
    assert!(dir.path().join("4.ascii").exists());
    assert!(!dir.path().join("1.ascii").exists());
}

#[test]
fn failure_mid_block_stops_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let solver = FailingSolver::new("flaky", 4).with_single_step(0.5);
    let probe = solver.probe();
    let mut c = Controller::new(cadence(3, 3, 0), RunContext::new(dir.path())).unwrap();
    c.attach_solver(solver);
    c.attach_solution(MockSolution::new(1, 1));
    let err = c.run().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Solver);
    assert_eq!(probe.step_calls(), 4);
    assert_eq!(probe.teardown_calls(), 1);
    assert!(dir.path().join("1.ascii").exists());
    assert!(!dir.path().join("2.ascii").exists());
}
