//! The formatter capability and the closed set of on-disk formats.
//!
//! A [`Formatter`] encodes one frame at a time: `open` → any number of
//! `view_*` calls → `close`. Every variant buffers the frame in memory
//! and only materializes it on `close`, by writing a sibling temporary
//! file and renaming it over the destination. A frame that is never
//! closed therefore leaves the destination untouched.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use ndarray::{ArrayViewD, Ix2, Ix3, Ix4};

use crate::ascii::AsciiFormatter;
use crate::binary::BinaryFormatter;
use crate::error::{FormatError, OutputError};

/// Serialization strategy for one on-disk representation.
pub trait Formatter {
    /// Which variant this is.
    fn kind(&self) -> FormatKind;

    /// Begin a frame destined for `path`, creating its directory if needed.
    fn open(&mut self, path: &Path) -> Result<(), OutputError>;

    /// Whether a frame is currently open.
    fn is_open(&self) -> bool;

    /// Append a labelled integer.
    fn view_int(&mut self, value: i64, name: &str) -> Result<(), OutputError>;

    /// Append a labelled double.
    fn view_double(&mut self, value: f64, name: &str) -> Result<(), OutputError>;

    /// Append an array of rank 2, 3 or 4.
    ///
    /// Any other rank fails with [`FormatError::UnsupportedRank`] and
    /// appends nothing.
    fn view_array(&mut self, array: ArrayViewD<'_, f64>, name: &str) -> Result<(), OutputError>;

    /// Write the buffered frame to its destination and release it.
    ///
    /// Closing a formatter that is not open is a no-op.
    fn close(&mut self) -> Result<(), OutputError>;

    /// Drop the buffered frame without writing anything.
    fn abort(&mut self);
}

/// The known output formats, selected at configuration time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum FormatKind {
    /// Fixed-width text, extension `ascii`.
    #[default]
    Ascii,
    /// Little-endian tagged records, extension `bin`.
    Binary,
}

impl FormatKind {
    /// File extension of frames written in this format.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Ascii => "ascii",
            Self::Binary => "bin",
        }
    }

    /// Construct a fresh formatter of this kind.
    pub fn create(self) -> Box<dyn Formatter> {
        match self {
            Self::Ascii => Box::new(AsciiFormatter::new()),
            Self::Binary => Box::new(BinaryFormatter::new()),
        }
    }
}

impl fmt::Display for FormatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ascii => write!(f, "ascii"),
            Self::Binary => write!(f, "binary"),
        }
    }
}

impl FromStr for FormatKind {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ascii" => Ok(Self::Ascii),
            "binary" | "bin" => Ok(Self::Binary),
            other => Err(FormatError::UnknownFormat {
                name: other.to_string(),
            }),
        }
    }
}

// ── Frame buffering ─────────────────────────────────────────────

/// A frame being assembled in memory for a destination path.
#[derive(Debug)]
pub(crate) struct PendingFrame {
    path: PathBuf,
    pub(crate) buf: Vec<u8>,
}

impl PendingFrame {
    /// Start a frame, creating the destination directory if absent.
    pub(crate) fn begin(path: &Path) -> Result<Self, OutputError> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|e| OutputError::io(dir, e))?;
        }
        Ok(Self {
            path: path.to_path_buf(),
            buf: Vec::with_capacity(4096),
        })
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    /// Write the whole frame next to the destination, then rename it in.
    pub(crate) fn commit(self) -> Result<(), OutputError> {
        let staging = staging_path(&self.path);
        fs::write(&staging, &self.buf).map_err(|e| OutputError::io(&staging, e))?;
        if let Err(e) = fs::rename(&staging, &self.path) {
            let _ = fs::remove_file(&staging);
            return Err(OutputError::io(&self.path, e));
        }
        Ok(())
    }
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".partial");
    path.with_file_name(name)
}

/// Guard shared by every variant's `open`.
pub(crate) fn begin_frame(
    pending: &Option<PendingFrame>,
    path: &Path,
) -> Result<PendingFrame, OutputError> {
    if let Some(open) = pending {
        return Err(FormatError::AlreadyOpen {
            path: open.path().to_path_buf(),
        }
        .into());
    }
    PendingFrame::begin(path)
}

// ── Array traversal ─────────────────────────────────────────────

/// One event of the canonical array traversal.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Walk {
    /// The next scalar, first axis varying fastest.
    Value(f64),
    /// The innermost (first-axis) sweep finished.
    EndLine,
    /// A 2-D plane (rank 3) or 3-D volume (rank 4) finished.
    EndBlock,
}

/// Check that `array` has a serializable rank.
pub(crate) fn check_rank(array: &ArrayViewD<'_, f64>) -> Result<(), FormatError> {
    match array.ndim() {
        2..=4 => Ok(()),
        rank => Err(FormatError::UnsupportedRank { rank }),
    }
}

/// Visit `array` in the interchange order shared by all formats.
///
/// For `(d0, d1)`: lines over `k < d1`, values over `m < d0`. Rank 3
/// wraps that in blocks over `j < d2`; rank 4 wraps rank 3 in blocks
/// over `l < d3`, each followed by one more block end.
pub(crate) fn walk_array(
    array: &ArrayViewD<'_, f64>,
    mut visit: impl FnMut(Walk),
) -> Result<(), FormatError> {
    check_rank(array)?;
    let malformed = |e: ndarray::ShapeError| FormatError::Malformed {
        detail: e.to_string(),
    };
    match array.ndim() {
        2 => {
            let q = array.view().into_dimensionality::<Ix2>().map_err(malformed)?;
            let (d0, d1) = q.dim();
            for k in 0..d1 {
                for m in 0..d0 {
                    visit(Walk::Value(q[[m, k]]));
                }
                visit(Walk::EndLine);
            }
        }
        3 => {
            let q = array.view().into_dimensionality::<Ix3>().map_err(malformed)?;
            let (d0, d1, d2) = q.dim();
            for j in 0..d2 {
                for k in 0..d1 {
                    for m in 0..d0 {
                        visit(Walk::Value(q[[m, k, j]]));
                    }
                    visit(Walk::EndLine);
                }
                visit(Walk::EndBlock);
            }
        }
        _ => {
            let q = array.view().into_dimensionality::<Ix4>().map_err(malformed)?;
            let (d0, d1, d2, d3) = q.dim();
            for l in 0..d3 {
                for j in 0..d2 {
                    for k in 0..d1 {
                        for m in 0..d0 {
                            visit(Walk::Value(q[[m, k, j, l]]));
                        }
                        visit(Walk::EndLine);
                    }
                    visit(Walk::EndBlock);
                }
                visit(Walk::EndBlock);
            }
        }
    }
    Ok(())
}
