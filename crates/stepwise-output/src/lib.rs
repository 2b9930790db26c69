//! Output layer for Stepwise runs.
//!
//! - [`formatter`]: the [`Formatter`] capability and [`FormatKind`] selector.
//! - [`ascii`] / [`binary`]: the two on-disk frame formats.
//! - [`frame`]: frame naming and the per-frame record layout.
//! - [`functional`]: the append-only functional time series.
//! - [`gauge`]: per-probe gauge files held open for a run.
//!
//! Frames are written atomically: a failed or abandoned frame never
//! leaves a partial file at its destination.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod ascii;
pub mod binary;
pub mod codec;
pub mod error;
pub mod formatter;
pub mod frame;
pub mod functional;
pub mod gauge;

pub use ascii::AsciiFormatter;
pub use binary::BinaryFormatter;
pub use error::{FormatError, OutputError};
pub use formatter::{FormatKind, Formatter};
pub use frame::{frame_path, write_derived_frame, write_frame, FrameContents};
pub use functional::FunctionalSink;
pub use gauge::GaugeSet;
