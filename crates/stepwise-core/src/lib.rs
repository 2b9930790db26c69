//! Core types and traits for the Stepwise run controller.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the frame counter, the solver status record, the error types shared
//! by every crate, and the capability traits through which the
//! controller talks to an external solver and simulation state.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod frame;
pub mod gauge;
pub mod status;
pub mod traits;

pub use error::{SolverError, ValidityError};
pub use frame::{FrameCounter, FrameIndex};
pub use gauge::{GaugeProbe, GaugeSink};
pub use status::SolverStatus;
pub use traits::{DerivedField, Functional, FunctionalValues, Solution, Solver};
