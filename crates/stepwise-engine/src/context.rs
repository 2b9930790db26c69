//! Explicit run context: where output goes and how it is logged.
//!
//! Nothing in a run reads the working directory or global state; every
//! path and the log target come from a [`RunContext`].

use std::path::{Path, PathBuf};

use log::LevelFilter;
use stepwise_core::FrameIndex;
use stepwise_output::{frame_path, FormatKind};

/// Output locations and logging target of one run.
#[derive(Clone, Debug, PartialEq)]
pub struct RunContext {
    /// Directory receiving every output file. Default: `_output`.
    pub outdir: PathBuf,
    /// Prefix of state frame files. Default: empty.
    pub output_file_prefix: String,
    /// Stem of the functional file. Default: `functionals`.
    pub functional_prefix: String,
    /// Prefix of derived-field frame files. Default: `derived`.
    pub derived_file_prefix: String,
    /// Target of every log record emitted by the run. Default: `stepwise`.
    pub log_target: String,
}

impl Default for RunContext {
    fn default() -> Self {
        Self {
            outdir: PathBuf::from("_output"),
            output_file_prefix: String::new(),
            functional_prefix: "functionals".to_string(),
            derived_file_prefix: "derived".to_string(),
            log_target: "stepwise".to_string(),
        }
    }
}

impl RunContext {
    /// Default context writing into `outdir`.
    pub fn new(outdir: impl Into<PathBuf>) -> Self {
        Self {
            outdir: outdir.into(),
            ..Self::default()
        }
    }

    /// Path of state frame `frame` in format `kind`.
    pub fn frame_path(&self, frame: FrameIndex, kind: FormatKind) -> PathBuf {
        frame_path(&self.outdir, &self.output_file_prefix, frame, kind.extension())
    }

    /// Path of derived-field frame `frame` in format `kind`.
    pub fn derived_path(&self, frame: FrameIndex, kind: FormatKind) -> PathBuf {
        frame_path(&self.outdir, &self.derived_file_prefix, frame, kind.extension())
    }

    /// Path of the functional file.
    pub fn functional_path(&self) -> PathBuf {
        self.outdir.join(format!("{}.txt", self.functional_prefix))
    }

    /// The output directory.
    pub fn outdir(&self) -> &Path {
        &self.outdir
    }

    /// Log level a host should enable for `verbosity`.
    pub fn level_filter(verbosity: u8) -> LevelFilter {
        match verbosity {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}
