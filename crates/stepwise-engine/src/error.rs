//! The error returned by a run, and its coarse taxonomy.

use std::error::Error;
use std::fmt;
use std::path::PathBuf;

use stepwise_core::{SolverError, ValidityError};
use stepwise_output::OutputError;

use crate::config::ConfigError;

/// Coarse classification of a [`RunError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Bad or incomplete configuration; nothing was run.
    Configuration,
    /// A collaborator failed its self-check or broke the time invariant.
    Validity,
    /// The output directory holds data and overwriting is disabled.
    OverwriteProtection,
    /// A file or directory operation failed.
    Io,
    /// Content could not be serialized.
    Format,
    /// The solver failed while stepping.
    Solver,
}

/// Errors from [`Controller::run`](crate::Controller::run).
#[derive(Debug)]
pub enum RunError {
    /// Configuration or schedule error.
    Config(ConfigError),
    /// Validity check failure.
    Validity(ValidityError),
    /// Refused to write into a non-empty output directory.
    OverwriteProtected {
        /// The existing output directory.
        outdir: PathBuf,
    },
    /// Frame, functional or gauge output failed.
    Output(OutputError),
    /// A stepping call failed.
    Solver(SolverError),
}

impl RunError {
    /// Which bucket of the taxonomy this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Config(_) => ErrorKind::Configuration,
            Self::Validity(_) => ErrorKind::Validity,
            Self::OverwriteProtected { .. } => ErrorKind::OverwriteProtection,
            Self::Output(OutputError::Io { .. }) => ErrorKind::Io,
            Self::Output(OutputError::Format(_)) => ErrorKind::Format,
            Self::Solver(_) => ErrorKind::Solver,
        }
    }
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "configuration: {e}"),
            Self::Validity(e) => write!(f, "validity: {e}"),
            Self::OverwriteProtected { outdir } => write!(
                f,
                "refusing to overwrite existing output data in {}; \
                 delete or move the directory, or enable overwrite",
                outdir.display()
            ),
            Self::Output(e) => write!(f, "output: {e}"),
            Self::Solver(e) => write!(f, "solver: {e}"),
        }
    }
}

impl Error for RunError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Validity(e) => Some(e),
            Self::OverwriteProtected { .. } => None,
            Self::Output(e) => Some(e),
            Self::Solver(e) => Some(e),
        }
    }
}

impl From<ConfigError> for RunError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<ValidityError> for RunError {
    fn from(e: ValidityError) -> Self {
        Self::Validity(e)
    }
}

impl From<OutputError> for RunError {
    fn from(e: OutputError) -> Self {
        Self::Output(e)
    }
}

impl From<SolverError> for RunError {
    fn from(e: SolverError) -> Self {
        Self::Solver(e)
    }
}
