//! Stepwise: run-time orchestration for time-stepping PDE solvers.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all Stepwise sub-crates. For most users, adding `stepwise` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use ndarray::{ArrayD, ArrayViewD, IxDyn};
//! use stepwise::prelude::*;
//!
//! // State: one equation on four cells.
//! #[derive(Clone)]
//! struct Decay {
//!     t: f64,
//!     q: ArrayD<f64>,
//! }
//!
//! impl Solution for Decay {
//!     fn t(&self) -> f64 { self.t }
//!     fn is_valid(&self) -> bool { true }
//!     fn q(&self) -> ArrayViewD<'_, f64> { self.q.view() }
//! }
//!
//! // Exact solver for dq/dt = -q.
//! struct Exact;
//!
//! impl Solver<Decay> for Exact {
//!     fn name(&self) -> &str { "exact" }
//!     fn is_valid(&self) -> bool { true }
//!     fn setup(&mut self, _s: &mut Decay) {}
//!     fn evolve_to_time(&mut self, s: &mut Decay, t_end: f64) -> Result<SolverStatus, SolverError> {
//!         let factor = (s.t - t_end).exp();
//!         s.q.mapv_inplace(|v| v * factor);
//!         s.t = t_end;
//!         Ok(SolverStatus { num_steps: 1, ..SolverStatus::default() })
//!     }
//!     fn teardown(&mut self) {}
//! }
//!
//! let dir = tempfile::tempdir().unwrap();
//! let config = RunConfig::builder()
//!     .output_style(1)
//!     .num_output_times(4)
//!     .tfinal(1.0)
//!     .build()
//!     .unwrap();
//! let mut controller = Controller::new(config, RunContext::new(dir.path())).unwrap();
//! controller.attach_solver(Exact);
//! controller.attach_solution(Decay { t: 0.0, q: ArrayD::ones(IxDyn(&[1, 4])) });
//!
//! let outcome = controller.run().unwrap();
//! assert_eq!(outcome.frames, 5);
//! assert!(dir.path().join("4.ascii").exists());
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `stepwise-core` | Frame counter, solver status, collaborator traits, errors |
//! | [`output`] | `stepwise-output` | Formatters, frame layout, functional and gauge sinks |
//! | [`engine`] | `stepwise-engine` | Run configuration, output schedule, controller |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types and collaborator traits (`stepwise-core`).
///
/// Contains the frame counter, the solver status record, and the traits
/// an external solver implements ([`types::Solver`], [`types::Solution`],
/// [`types::Functional`], [`types::DerivedField`]).
pub use stepwise_core as types;

/// Frame formatters and output sinks (`stepwise-output`).
///
/// [`output::AsciiFormatter`] and [`output::BinaryFormatter`] implement
/// [`output::Formatter`]; [`output::FunctionalSink`] and
/// [`output::GaugeSet`] hold the per-run text files.
pub use stepwise_output as output;

/// Run controller and output scheduling (`stepwise-engine`).
///
/// [`engine::Controller`] drives a run; [`engine::OutputSchedule`]
/// resolves an [`engine::OutputStyle`] into output targets.
pub use stepwise_engine as engine;

/// Common imports for typical Stepwise usage.
///
/// ```rust
/// use stepwise::prelude::*;
///
/// let style = OutputStyle::uniform(10, 1.0);
/// assert_eq!(style.code(), 1);
/// assert_eq!(FormatKind::default(), FormatKind::Ascii);
/// ```
pub mod prelude {
    // Core types
    pub use stepwise_core::{
        DerivedField, FrameCounter, FrameIndex, Functional, FunctionalValues, GaugeProbe,
        GaugeSink, Solution, Solver, SolverError, SolverStatus, ValidityError,
    };

    // Output
    pub use stepwise_output::{FormatError, FormatKind, Formatter, OutputError};

    // Engine
    pub use stepwise_engine::{
        ConfigError, Controller, ErrorKind, OutputSchedule, OutputStyle, RunConfig, RunContext,
        RunError, RunMetrics, RunOutcome,
    };
}
