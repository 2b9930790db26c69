//! Fixed-width text formatter.
//!
//! Layout, byte for byte:
//!
//! ```text
//!     3                  frame          <- "%5i" + 18 spaces + label
//!     1.50000000e+00     t              <- "%18.8e" + 5 spaces + label
//!     1.00000000e+00    2.00000000e+00  <- arrays: "%18.8e" per value, no separator
//! ```
//!
//! Arrays are emitted one line per sweep of the first axis, with a blank
//! line closing every 2-D plane (rank 3) and an extra blank line closing
//! every 3-D volume (rank 4).

use std::path::Path;

use ndarray::ArrayViewD;

use crate::error::{FormatError, OutputError};
use crate::formatter::{begin_frame, check_rank, walk_array, FormatKind, Formatter, PendingFrame, Walk};

/// Width of one scientific-notation field.
pub const FIELD_WIDTH: usize = 18;

/// Significant digits after the decimal point.
pub const FIELD_PRECISION: usize = 8;

/// Render `value` the way C's `%18.8e` does.
///
/// Rust's `{:e}` prints the bare exponent (`1e0`); C always prints a sign
/// and at least two exponent digits (`1e+00`). Non-finite values use C's
/// lowercase spellings.
///
/// ```
/// use stepwise_output::ascii::format_scientific;
///
/// assert_eq!(format_scientific(1.0), "    1.00000000e+00");
/// assert_eq!(format_scientific(-0.00012345), "   -1.23450000e-04");
/// assert_eq!(format_scientific(6.02e123), "   6.02000000e+123");
/// ```
pub fn format_scientific(value: f64) -> String {
    let body = if value.is_nan() {
        "nan".to_string()
    } else if value == f64::INFINITY {
        "inf".to_string()
    } else if value == f64::NEG_INFINITY {
        "-inf".to_string()
    } else {
        let raw = format!("{value:.prec$e}", prec = FIELD_PRECISION);
        match raw.split_once('e') {
            Some((mantissa, exp)) => {
                let exp: i32 = exp.parse().unwrap_or(0);
                let sign = if exp < 0 { '-' } else { '+' };
                format!("{mantissa}e{sign}{:02}", exp.unsigned_abs())
            }
            None => raw,
        }
    };
    format!("{body:>width$}", width = FIELD_WIDTH)
}

/// Formatter producing the fixed-width `.ascii` frame files.
#[derive(Debug, Default)]
pub struct AsciiFormatter {
    pending: Option<PendingFrame>,
}

impl AsciiFormatter {
    /// Create a closed formatter.
    pub fn new() -> Self {
        Self::default()
    }

    fn buffer(&mut self) -> Result<&mut Vec<u8>, FormatError> {
        self.pending
            .as_mut()
            .map(|p| &mut p.buf)
            .ok_or(FormatError::NotOpen)
    }
}

impl Formatter for AsciiFormatter {
    fn kind(&self) -> FormatKind {
        FormatKind::Ascii
    }

    fn open(&mut self, path: &Path) -> Result<(), OutputError> {
        self.pending = Some(begin_frame(&self.pending, path)?);
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.pending.is_some()
    }

    fn view_int(&mut self, value: i64, name: &str) -> Result<(), OutputError> {
        let line = format!("{value:>5}                  {name}\n");
        self.buffer()?.extend_from_slice(line.as_bytes());
        Ok(())
    }

    fn view_double(&mut self, value: f64, name: &str) -> Result<(), OutputError> {
        let line = format!("{}     {name}\n", format_scientific(value));
        self.buffer()?.extend_from_slice(line.as_bytes());
        Ok(())
    }

    fn view_array(&mut self, array: ArrayViewD<'_, f64>, _name: &str) -> Result<(), OutputError> {
        check_rank(&array)?;
        let buf = self.buffer()?;
        walk_array(&array, |w| match w {
            Walk::Value(v) => buf.extend_from_slice(format_scientific(v).as_bytes()),
            Walk::EndLine | Walk::EndBlock => buf.push(b'\n'),
        })?;
        Ok(())
    }

    fn close(&mut self) -> Result<(), OutputError> {
        match self.pending.take() {
            Some(frame) => frame.commit(),
            None => Ok(()),
        }
    }

    fn abort(&mut self) {
        self.pending = None;
    }
}
