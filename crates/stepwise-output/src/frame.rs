//! Frame naming and the record layout of one frame file.
//!
//! Every frame, whatever its format, carries the same sequence of
//! records: a small header followed by the arrays that were requested.

use std::path::{Path, PathBuf};

use ndarray::ArrayViewD;
use stepwise_core::FrameIndex;

use crate::error::OutputError;
use crate::formatter::Formatter;

/// Path of frame `frame` under `outdir`: `<outdir>/<prefix><frame>.<ext>`.
///
/// ```
/// use std::path::Path;
/// use stepwise_core::FrameIndex;
/// use stepwise_output::frame::frame_path;
///
/// let p = frame_path(Path::new("_output"), "fort.q", FrameIndex(12), "ascii");
/// assert_eq!(p, Path::new("_output/fort.q12.ascii"));
/// ```
pub fn frame_path(outdir: &Path, prefix: &str, frame: FrameIndex, extension: &str) -> PathBuf {
    outdir.join(format!("{prefix}{frame}.{extension}"))
}

/// The state arrays of one frame.
#[derive(Debug)]
pub struct FrameContents<'a> {
    /// Frame index.
    pub frame: FrameIndex,
    /// Simulation time.
    pub t: f64,
    /// Conserved quantities, first axis = equation.
    pub q: ArrayViewD<'a, f64>,
    /// Auxiliary arrays, written only when present.
    pub aux: Option<ArrayViewD<'a, f64>>,
}

/// Write one state frame to `path` through `formatter`.
///
/// Layout: `frame`, `num_eqn`, `num_aux`, `t`, then array `q` and, if
/// present, array `aux`. On any error the partially buffered frame is
/// discarded and the destination is left as it was.
pub fn write_frame(
    formatter: &mut dyn Formatter,
    path: &Path,
    contents: &FrameContents<'_>,
) -> Result<(), OutputError> {
    formatter.open(path)?;
    let result = write_state_records(formatter, contents).and_then(|()| formatter.close());
    if result.is_err() {
        formatter.abort();
    }
    result
}

fn write_state_records(
    formatter: &mut dyn Formatter,
    contents: &FrameContents<'_>,
) -> Result<(), OutputError> {
    let num_eqn = contents.q.shape().first().copied().unwrap_or(0);
    let num_aux = contents
        .aux
        .as_ref()
        .and_then(|a| a.shape().first().copied())
        .unwrap_or(0);
    formatter.view_int(i64::from(contents.frame.0), "frame")?;
    formatter.view_int(num_eqn as i64, "num_eqn")?;
    formatter.view_int(num_aux as i64, "num_aux")?;
    formatter.view_double(contents.t, "t")?;
    formatter.view_array(contents.q.view(), "q")?;
    if let Some(aux) = &contents.aux {
        formatter.view_array(aux.view(), "aux")?;
    }
    Ok(())
}

/// Write one derived-quantity frame: `frame`, `t`, then array `p`.
pub fn write_derived_frame(
    formatter: &mut dyn Formatter,
    path: &Path,
    frame: FrameIndex,
    t: f64,
    p: ArrayViewD<'_, f64>,
) -> Result<(), OutputError> {
    formatter.open(path)?;
    let result = formatter
        .view_int(i64::from(frame.0), "frame")
        .and_then(|()| formatter.view_double(t, "t"))
        .and_then(|()| formatter.view_array(p, "p"))
        .and_then(|()| formatter.close());
    if result.is_err() {
        formatter.abort();
    }
    result
}
