//! Run controller and output scheduling for Stepwise simulations.
//!
//! Provides the [`Controller`] that drives an opaque solver through an
//! [`OutputSchedule`], writing a frame at every scheduled output, plus
//! the configuration surface ([`RunConfig`], [`RunContext`]) and the
//! run error taxonomy ([`RunError`], [`ErrorKind`]).

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod context;
pub mod controller;
pub mod error;
pub mod history;
pub mod metrics;
pub mod schedule;

pub use config::{
    ConfigError, ExplicitOutput, OutputStyle, RunConfig, RunConfigBuilder, StepCadenceOutput,
    UniformOutput,
};
pub use context::RunContext;
pub use controller::{Controller, RunOutcome};
pub use error::{ErrorKind, RunError};
pub use history::FrameHistory;
pub use metrics::RunMetrics;
pub use schedule::{OutputSchedule, OutputTarget};
