//! Gauge probe declarations and the sink solvers record into.

use std::io::Write;

use smallvec::SmallVec;

/// A fixed spatial probe whose time series is recorded every output step.
///
/// The domain declares probes; the output layer opens one file per
/// probe under the run's output directory. The file name and the per-line
/// content belong to the domain, not to the controller.
#[derive(Clone, Debug, PartialEq)]
pub struct GaugeProbe {
    /// Unique probe name.
    pub name: String,
    /// Probe location in physical coordinates (one entry per dimension).
    pub location: SmallVec<[f64; 3]>,
    /// File name of the probe's time series, relative to the output directory.
    pub file_name: String,
}

impl GaugeProbe {
    /// Declare a probe using the conventional `gauge<name>.txt` file name.
    pub fn new(name: impl Into<String>, location: &[f64]) -> Self {
        let name = name.into();
        let file_name = format!("gauge{name}.txt");
        Self {
            name,
            location: SmallVec::from_slice(location),
            file_name,
        }
    }
}

/// Write access to open gauge files, keyed by probe name.
///
/// Implemented by the output layer's gauge set and handed to
/// [`Solver::write_gauge_values`](crate::Solver::write_gauge_values).
pub trait GaugeSink {
    /// The open writer for `probe`, or `None` if no such probe is open.
    fn writer(&mut self, probe: &str) -> Option<&mut dyn Write>;
}
