//! Error types raised by collaborators and by the pre-run validity check.
//!
//! [`SolverError`] is what a [`Solver`](crate::Solver) returns from its
//! stepping methods. [`ValidityError`] is raised by the controller when a
//! collaborator fails its self-check or breaks the time invariant.

use std::error::Error;
use std::fmt;

/// Errors returned by a solver while stepping.
#[derive(Clone, Debug, PartialEq)]
pub enum SolverError {
    /// The solver's step function failed.
    StepFailed {
        /// Human-readable description of the failure.
        reason: String,
    },
    /// The solver does not implement the requested operation.
    Unsupported {
        /// Name of the missing operation (e.g. `"step"`).
        operation: &'static str,
    },
    /// The requested target time cannot be reached from the current time.
    InvalidTime {
        /// Current simulation time.
        current: f64,
        /// Requested target time.
        requested: f64,
    },
}

impl fmt::Display for SolverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StepFailed { reason } => write!(f, "step failed: {reason}"),
            Self::Unsupported { operation } => {
                write!(f, "solver does not support '{operation}'")
            }
            Self::InvalidTime { current, requested } => {
                write!(f, "cannot evolve from t={current} to t={requested}")
            }
        }
    }
}

impl Error for SolverError {}

/// Errors from the validity check that runs before any stepping.
#[derive(Clone, Debug, PartialEq)]
pub enum ValidityError {
    /// The solver reported itself not ready.
    SolverNotReady {
        /// Name of the solver.
        solver: String,
    },
    /// The initial solution failed its self-consistency check.
    InvalidSolution,
    /// The solver moved simulation time backwards.
    TimeReversed {
        /// Time before the stepping call.
        before: f64,
        /// Time after the stepping call.
        after: f64,
    },
}

impl fmt::Display for ValidityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SolverNotReady { solver } => {
                write!(f, "solver '{solver}' failed to initialize properly")
            }
            Self::InvalidSolution => write!(f, "initial solution is not valid"),
            Self::TimeReversed { before, after } => {
                write!(f, "simulation time moved backwards: {before} -> {after}")
            }
        }
    }
}

impl Error for ValidityError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solver_error_display_names_operation() {
        let err = SolverError::Unsupported { operation: "step" };
        assert_eq!(err.to_string(), "solver does not support 'step'");
    }

    #[test]
    fn time_reversed_display_shows_both_times() {
        let err = ValidityError::TimeReversed {
            before: 2.0,
            after: 1.5,
        };
        let msg = err.to_string();
        assert!(msg.contains("2"));
        assert!(msg.contains("1.5"));
    }
}
