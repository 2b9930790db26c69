//! Capability traits for the controller's external collaborators.
//!
//! The controller drives a run through these traits only. Numerics,
//! mesh description and problem setup live behind them and are opaque
//! to the rest of the workspace.

use ndarray::{ArrayD, ArrayViewD};
use smallvec::SmallVec;

use crate::error::SolverError;
use crate::gauge::{GaugeProbe, GaugeSink};
use crate::status::SolverStatus;

/// Values of all functionals at one output step.
pub type FunctionalValues = SmallVec<[f64; 8]>;

/// The evolving simulation state plus its domain.
///
/// The controller reads `t`, hands the arrays to a formatter, and passes
/// the whole object to the solver. The solver mutates it in place.
pub trait Solution {
    /// Current simulation time.
    fn t(&self) -> f64;

    /// Self-consistency check, run once before any stepping.
    fn is_valid(&self) -> bool;

    /// Conserved quantities, shape `(num_eqn, n_1, ...)`.
    fn q(&self) -> ArrayViewD<'_, f64>;

    /// Auxiliary coefficient fields, shape `(num_aux, n_1, ...)`, if any.
    fn aux(&self) -> Option<ArrayViewD<'_, f64>> {
        None
    }

    /// Probes declared by the domain.
    fn gauges(&self) -> &[GaugeProbe] {
        &[]
    }
}

/// The numerical solver: an opaque "advance state to time T" capability.
///
/// The controller calls [`setup`](Solver::setup) exactly once before
/// stepping and [`teardown`](Solver::teardown) exactly once afterwards,
/// including when a stepping call fails.
pub trait Solver<S: Solution> {
    /// Human-readable solver name, used in logs and errors.
    fn name(&self) -> &str;

    /// Whether the solver is ready to run.
    fn is_valid(&self) -> bool;

    /// Prepare internal work arrays for `solution`.
    fn setup(&mut self, solution: &mut S);

    /// Advance `solution` in place until `solution.t() == t_end`.
    fn evolve_to_time(&mut self, solution: &mut S, t_end: f64)
        -> Result<SolverStatus, SolverError>;

    /// Whether [`step`](Solver::step) is implemented.
    ///
    /// Fixed-cadence output (one frame every N raw steps) requires it.
    fn supports_single_step(&self) -> bool {
        false
    }

    /// Take one raw time step with the solver's own choice of `dt`.
    fn step(&mut self, _solution: &mut S) -> Result<SolverStatus, SolverError> {
        Err(SolverError::Unsupported { operation: "step" })
    }

    /// Append the current gauge values to the open gauge files.
    ///
    /// Called once per output step. The line format is owned by the
    /// solver and domain.
    fn write_gauge_values(
        &mut self,
        _solution: &S,
        _gauges: &mut dyn GaugeSink,
    ) -> Result<(), SolverError> {
        Ok(())
    }

    /// Release resources acquired in [`setup`](Solver::setup).
    fn teardown(&mut self);
}

/// A set of scalar diagnostics computed from the full state.
///
/// The number of values returned must not change during a run.
pub trait Functional<S: Solution> {
    /// Evaluate every functional at the current state.
    fn compute(&mut self, solution: &S) -> FunctionalValues;
}

/// A derived quantity written to its own frame file next to `q`.
pub trait DerivedField<S: Solution> {
    /// Compute the derived array, shape `(num_p, n_1, ...)`.
    fn compute(&mut self, solution: &S) -> ArrayD<f64>;
}
