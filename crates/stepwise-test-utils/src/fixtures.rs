//! Reusable solver and diagnostic fixtures.
//!
//! - [`MockSolver`]: moves time exactly to each target and adds the
//!   elapsed time to every cell of `q`.
//! - [`FailingSolver`]: succeeds a fixed number of stepping calls, then
//!   fails deterministically.
//! - [`ConstFunctional`] / [`ScaledField`]: trivial diagnostics.
//!
//! Solvers record their calls in a shared [`CallProbe`], so tests can
//! still inspect them after the solver has been moved into a controller.

use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use ndarray::ArrayD;
use smallvec::SmallVec;
use stepwise_core::{
    DerivedField, Functional, FunctionalValues, GaugeSink, Solution, Solver, SolverError,
    SolverStatus,
};

use crate::MockSolution;

/// Shared record of every collaborator call a solver received.
#[derive(Debug, Default)]
pub struct CallProbe {
    setup: AtomicUsize,
    teardown: AtomicUsize,
    evolve: AtomicUsize,
    step: AtomicUsize,
    gauge_writes: AtomicUsize,
    targets: Mutex<Vec<f64>>,
}

impl CallProbe {
    pub fn setup_calls(&self) -> usize {
        self.setup.load(Ordering::Relaxed)
    }

    pub fn teardown_calls(&self) -> usize {
        self.teardown.load(Ordering::Relaxed)
    }

    pub fn evolve_calls(&self) -> usize {
        self.evolve.load(Ordering::Relaxed)
    }

    pub fn step_calls(&self) -> usize {
        self.step.load(Ordering::Relaxed)
    }

    pub fn gauge_writes(&self) -> usize {
        self.gauge_writes.load(Ordering::Relaxed)
    }

    /// Every `t_end` passed to `evolve_to_time`, in call order.
    pub fn targets(&self) -> Vec<f64> {
        match self.targets.lock() {
            Ok(t) => t.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn record_target(&self, t_end: f64) {
        match self.targets.lock() {
            Ok(mut t) => t.push(t_end),
            Err(poisoned) => poisoned.into_inner().push(t_end),
        }
    }
}

/// Well-behaved solver over [`MockSolution`].
#[derive(Debug)]
pub struct MockSolver {
    pub name: String,
    pub dt: f64,
    pub single_step: bool,
    pub ready: bool,
    num_steps: u64,
    probe: Arc<CallProbe>,
}

impl MockSolver {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dt: 0.1,
            single_step: false,
            ready: true,
            num_steps: 0,
            probe: Arc::new(CallProbe::default()),
        }
    }

    /// Enable `step()` with a fixed time step.
    pub fn with_single_step(mut self, dt: f64) -> Self {
        self.single_step = true;
        self.dt = dt;
        self
    }

    /// Make `is_valid()` report false.
    pub fn not_ready(mut self) -> Self {
        self.ready = false;
        self
    }

    /// Handle to this solver's call log.
    pub fn probe(&self) -> Arc<CallProbe> {
        Arc::clone(&self.probe)
    }

    fn status(&self) -> SolverStatus {
        SolverStatus {
            num_steps: self.num_steps,
            cfl_max: 0.9,
            dt_min: self.dt,
            dt_max: self.dt,
        }
    }
}

impl Solver<MockSolution> for MockSolver {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_valid(&self) -> bool {
        self.ready
    }

    fn setup(&mut self, _solution: &mut MockSolution) {
        self.probe.setup.fetch_add(1, Ordering::Relaxed);
    }

    fn evolve_to_time(
        &mut self,
        solution: &mut MockSolution,
        t_end: f64,
    ) -> Result<SolverStatus, SolverError> {
        self.probe.evolve.fetch_add(1, Ordering::Relaxed);
        self.probe.record_target(t_end);
        if t_end < solution.t {
            return Err(SolverError::InvalidTime {
                current: solution.t,
                requested: t_end,
            });
        }
        let elapsed = t_end - solution.t;
        solution.q.mapv_inplace(|v| v + elapsed);
        solution.t = t_end;
        self.num_steps += 1;
        Ok(self.status())
    }

    fn supports_single_step(&self) -> bool {
        self.single_step
    }

    fn step(&mut self, solution: &mut MockSolution) -> Result<SolverStatus, SolverError> {
        if !self.single_step {
            return Err(SolverError::Unsupported { operation: "step" });
        }
        self.probe.step.fetch_add(1, Ordering::Relaxed);
        let dt = self.dt;
        solution.q.mapv_inplace(|v| v + dt);
        solution.t += dt;
        self.num_steps += 1;
        Ok(self.status())
    }

    fn write_gauge_values(
        &mut self,
        solution: &MockSolution,
        gauges: &mut dyn GaugeSink,
    ) -> Result<(), SolverError> {
        for g in &solution.gauges {
            let Some(w) = gauges.writer(&g.name) else {
                continue;
            };
            writeln!(w, "{} {}", solution.t, solution.q.sum()).map_err(|e| {
                SolverError::StepFailed {
                    reason: format!("gauge {}: {e}", g.name),
                }
            })?;
            self.probe.gauge_writes.fetch_add(1, Ordering::Relaxed);
        }
        Ok(())
    }

    fn teardown(&mut self) {
        self.probe.teardown.fetch_add(1, Ordering::Relaxed);
    }
}

/// Fails deterministically after a configurable number of stepping calls.
///
/// Counts `evolve_to_time` and `step` together. Setup and teardown are
/// recorded in the same [`CallProbe`] as a [`MockSolver`].
#[derive(Debug)]
pub struct FailingSolver {
    inner: MockSolver,
    pub succeed_count: usize,
    calls: usize,
}

impl FailingSolver {
    /// Create a solver that succeeds `succeed_count` times then fails.
    pub fn new(name: impl Into<String>, succeed_count: usize) -> Self {
        Self {
            inner: MockSolver::new(name),
            succeed_count,
            calls: 0,
        }
    }

    /// Enable `step()` with a fixed time step.
    pub fn with_single_step(mut self, dt: f64) -> Self {
        self.inner = self.inner.with_single_step(dt);
        self
    }

    pub fn probe(&self) -> Arc<CallProbe> {
        self.inner.probe()
    }

    fn check(&mut self) -> Result<(), SolverError> {
        self.calls += 1;
        if self.calls > self.succeed_count {
            return Err(SolverError::StepFailed {
                reason: format!(
                    "deliberate failure after {} successful calls",
                    self.succeed_count
                ),
            });
        }
        Ok(())
    }
}

impl Solver<MockSolution> for FailingSolver {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn is_valid(&self) -> bool {
        self.inner.is_valid()
    }

    fn setup(&mut self, solution: &mut MockSolution) {
        self.inner.setup(solution);
    }

    fn evolve_to_time(
        &mut self,
        solution: &mut MockSolution,
        t_end: f64,
    ) -> Result<SolverStatus, SolverError> {
        self.check()?;
        self.inner.evolve_to_time(solution, t_end)
    }

    fn supports_single_step(&self) -> bool {
        self.inner.supports_single_step()
    }

    fn step(&mut self, solution: &mut MockSolution) -> Result<SolverStatus, SolverError> {
        self.check()?;
        self.inner.step(solution)
    }

    fn write_gauge_values(
        &mut self,
        solution: &MockSolution,
        gauges: &mut dyn GaugeSink,
    ) -> Result<(), SolverError> {
        self.inner.write_gauge_values(solution, gauges)
    }

    fn teardown(&mut self) {
        self.inner.teardown();
    }
}

/// Returns the same values at every output step.
#[derive(Clone, Debug)]
pub struct ConstFunctional {
    pub values: Vec<f64>,
}

impl ConstFunctional {
    pub fn new(values: &[f64]) -> Self {
        Self {
            values: values.to_vec(),
        }
    }
}

impl<S: Solution> Functional<S> for ConstFunctional {
    fn compute(&mut self, _solution: &S) -> FunctionalValues {
        SmallVec::from_slice(&self.values)
    }
}

/// Derived field `p = factor * q`.
#[derive(Clone, Copy, Debug)]
pub struct ScaledField {
    pub factor: f64,
}

impl<S: Solution> DerivedField<S> for ScaledField {
    fn compute(&mut self, solution: &S) -> ArrayD<f64> {
        let factor = self.factor;
        solution.q().mapv(|v| factor * v)
    }
}
