//! Solver status returned by each stepping call.

/// Summary of one stepping call, as reported by the solver.
///
/// The controller never inspects or modifies this value: the status of
/// the final stepping call of a run is handed back to the caller as is.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SolverStatus {
    /// Number of internal time steps taken.
    pub num_steps: u64,
    /// Largest CFL number observed.
    pub cfl_max: f64,
    /// Smallest time step used.
    pub dt_min: f64,
    /// Largest time step used.
    pub dt_max: f64,
}
