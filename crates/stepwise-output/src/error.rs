//! Error types for frame serialization and output sinks.

use std::error::Error;
use std::fmt;
use std::io;
use std::path::PathBuf;

/// Errors in the content being serialized, independent of the medium.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FormatError {
    /// Arrays must have rank 2, 3 or 4.
    UnsupportedRank {
        /// Rank of the rejected array.
        rank: usize,
    },
    /// A `view_*` or `close` call was made without a preceding `open`.
    NotOpen,
    /// `open` was called while a frame was already being written.
    AlreadyOpen {
        /// Path of the frame still open.
        path: PathBuf,
    },
    /// A functional record has a different number of values than the first.
    FunctionalArity {
        /// Number of values fixed by the first record.
        expected: usize,
        /// Number of values in the rejected record.
        found: usize,
    },
    /// The named output format is not one of the known variants.
    UnknownFormat {
        /// The unrecognized name.
        name: String,
    },
    /// A binary frame could not be decoded.
    Malformed {
        /// Human-readable description of what went wrong.
        detail: String,
    },
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedRank { rank } => {
                write!(f, "unsupported array rank {rank} (expected 2, 3 or 4)")
            }
            Self::NotOpen => write!(f, "formatter is not open"),
            Self::AlreadyOpen { path } => {
                write!(f, "formatter already open on {}", path.display())
            }
            Self::FunctionalArity { expected, found } => {
                write!(f, "functional record has {found} values, expected {expected}")
            }
            Self::UnknownFormat { name } => write!(f, "unknown output format '{name}'"),
            Self::Malformed { detail } => write!(f, "malformed frame: {detail}"),
        }
    }
}

impl Error for FormatError {}

/// Errors from writing frames, functionals or gauge files.
#[derive(Debug)]
pub enum OutputError {
    /// A file or directory operation failed.
    Io {
        /// The path being opened, written or renamed.
        path: PathBuf,
        /// The underlying I/O error.
        source: io::Error,
    },
    /// The content could not be serialized.
    Format(FormatError),
}

impl OutputError {
    /// Build an I/O error for `path`, logging it at the point of detection.
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        let path = path.into();
        log::error!(target: "stepwise::io", "I/O error on {}: {source}", path.display());
        Self::Io { path, source }
    }
}

impl fmt::Display for OutputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "I/O error on {}: {source}", path.display()),
            Self::Format(e) => write!(f, "format: {e}"),
        }
    }
}

impl Error for OutputError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Format(e) => Some(e),
        }
    }
}

impl From<FormatError> for OutputError {
    fn from(e: FormatError) -> Self {
        Self::Format(e)
    }
}
