//! Teardown runs exactly once however a run ends.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use ndarray::{ArrayD, IxDyn};
use stepwise_core::{Solver, SolverError, SolverStatus, ValidityError};
use stepwise_engine::{Controller, ErrorKind, OutputStyle, RunConfig, RunContext, RunError};
use stepwise_test_utils::{FailingSolver, MockSolution};

// ── Misbehaving solvers ─────────────────────────────────────────

/// Moves time backwards on its second call.
struct BackwardsSolver {
    calls: usize,
    teardowns: Arc<AtomicUsize>,
}

impl Solver<MockSolution> for BackwardsSolver {
    fn name(&self) -> &str {
        "backwards"
    }

    fn is_valid(&self) -> bool {
        true
    }

    fn setup(&mut self, _solution: &mut MockSolution) {}

    fn evolve_to_time(
        &mut self,
        solution: &mut MockSolution,
        t_end: f64,
    ) -> Result<SolverStatus, SolverError> {
        self.calls += 1;
        solution.t = if self.calls == 2 { -1.0 } else { t_end };
        Ok(SolverStatus::default())
    }

    fn teardown(&mut self) {
        self.teardowns.fetch_add(1, Ordering::Relaxed);
    }
}

/// Panics inside its first stepping call.
struct PanickingSolver {
    teardowns: Arc<AtomicUsize>,
}

impl Solver<MockSolution> for PanickingSolver {
    fn name(&self) -> &str {
        "panicking"
    }

    fn is_valid(&self) -> bool {
        true
    }

    fn setup(&mut self, _solution: &mut MockSolution) {}

    fn evolve_to_time(
        &mut self,
        _solution: &mut MockSolution,
        _t_end: f64,
    ) -> Result<SolverStatus, SolverError> {
        panic!("solver blew up");
    }

    fn teardown(&mut self) {
        self.teardowns.fetch_add(1, Ordering::Relaxed);
    }
}

fn controller(outdir: &std::path::Path) -> Controller<MockSolution> {
    let config = RunConfig {
        style: OutputStyle::uniform(5, 5.0),
        ..RunConfig::default()
    };
    Controller::new(config, RunContext::new(outdir)).unwrap()
}

// ── Tests ───────────────────────────────────────────────────────

#[test]
fn solver_failure_propagates_after_teardown() {
    let dir = tempfile::tempdir().unwrap();
    let solver = FailingSolver::new("flaky", 2);
    let probe = solver.probe();
    let mut c = controller(dir.path());
    c.attach_solver(solver);
    c.attach_solution(MockSolution::new(1, 2).with_gauge("1", 0.5));

    let err = c.run().unwrap_err();
    match &err {
        RunError::Solver(SolverError::StepFailed { reason }) => {
            assert!(reason.contains("after 2 successful calls"));
        }
        other => panic!("expected Solver(StepFailed), got {other:?}"),
    }
    assert_eq!(err.kind(), ErrorKind::Solver);
    assert_eq!(probe.setup_calls(), 1);
    assert_eq!(probe.teardown_calls(), 1);

    // Frames before the failure are complete; nothing after it exists.
    assert!(dir.path().join("2.ascii").exists());
    assert!(!dir.path().join("3.ascii").exists());
    // Gauge records written before the failure were flushed and closed.
    let gauge = std::fs::read_to_string(dir.path().join("gauge1.txt")).unwrap();
    assert_eq!(gauge.lines().count(), 3);
}

#[test]
fn time_reversal_is_a_validity_error() {
    let dir = tempfile::tempdir().unwrap();
    let teardowns = Arc::new(AtomicUsize::new(0));
    let mut c = controller(dir.path());
    c.attach_solver(BackwardsSolver {
        calls: 0,
        teardowns: Arc::clone(&teardowns),
    });
    c.attach_solution(MockSolution::new(1, 1));

    match c.run() {
        Err(RunError::Validity(ValidityError::TimeReversed { before, after })) => {
            assert_eq!(before, 1.0);
            assert_eq!(after, -1.0);
        }
        other => panic!("expected TimeReversed, got {other:?}"),
    }
    assert_eq!(teardowns.load(Ordering::Relaxed), 1);
}

#[test]
fn panic_in_solver_still_tears_down() {
    let dir = tempfile::tempdir().unwrap();
    let teardowns = Arc::new(AtomicUsize::new(0));
    let mut c = controller(dir.path());
    c.attach_solver(PanickingSolver {
        teardowns: Arc::clone(&teardowns),
    });
    c.attach_solution(MockSolution::new(1, 1));

    let result = panic::catch_unwind(AssertUnwindSafe(|| c.run()));
    assert!(result.is_err());
    assert_eq!(teardowns.load(Ordering::Relaxed), 1);
}

#[test]
fn format_error_tears_down_and_leaves_no_frame() {
    let dir = tempfile::tempdir().unwrap();
    let solver = FailingSolver::new("never-fails", usize::MAX);
    let probe = solver.probe();
    let mut solution = MockSolution::new(1, 1);
    solution.q = ArrayD::zeros(IxDyn(&[1, 1, 1, 1, 1]));
    let mut c = controller(dir.path());
    c.attach_solver(solver);
    c.attach_solution(solution);

    let err = c.run().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Format);
    assert_eq!(probe.teardown_calls(), 1);
    assert_eq!(probe.evolve_calls(), 0);
    assert!(!dir.path().join("0.ascii").exists());
}
