//! Benchmark profiles and utilities for the Stepwise run controller.
//!
//! Provides pre-built run profiles for benchmarking and examples:
//!
//! - [`reference_profile`]: 3 equations x 10K cells, 10 ASCII frames
//! - [`stress_profile`]: 8 equations x 100K cells, 50 binary frames
//! - [`ramp_solution`]: deterministic non-trivial initial state

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::path::Path;

use ndarray::{ArrayD, IxDyn};
use stepwise_engine::{ConfigError, Controller, RunConfig, RunContext};
use stepwise_output::FormatKind;
use stepwise_test_utils::{ConstFunctional, MockSolution, MockSolver, ScaledField};

/// Build a reference benchmark profile: 3 equations x 10K cells.
///
/// Uniform output, 10 frames to `t = 1`, ASCII frames plus one
/// functional, one derived field and one gauge.
pub fn reference_profile(outdir: &Path) -> Result<Controller<MockSolution>, ConfigError> {
    let config = RunConfig::builder()
        .num_output_times(10)
        .tfinal(1.0)
        .output_format(Some(FormatKind::Ascii))
        .build()?;
    let mut controller = Controller::new(config, RunContext::new(outdir))?;
    controller.attach_solution(ramp_solution(3, 10_000).with_gauge("1", 0.5));
    controller.attach_solver(MockSolver::new("reference"));
    controller.attach_functional(ConstFunctional::new(&[1.0, 2.0]));
    controller.attach_derived_field(ScaledField { factor: 0.5 });
    Ok(controller)
}

/// Build a stress benchmark profile: 8 equations x 100K cells.
///
/// Same collaborators as [`reference_profile`], binary frames, 50
/// outputs and an aux array written into every frame.
pub fn stress_profile(outdir: &Path) -> Result<Controller<MockSolution>, ConfigError> {
    let config = RunConfig::builder()
        .num_output_times(50)
        .tfinal(5.0)
        .write_aux_init(true)
        .write_aux_always(true)
        .output_format(Some(FormatKind::Binary))
        .build()?;
    let mut controller = Controller::new(config, RunContext::new(outdir))?;
    controller.attach_solution(ramp_solution(8, 100_000).with_aux(2));
    controller.attach_solver(MockSolver::new("stress"));
    controller.attach_functional(ConstFunctional::new(&[1.0, 2.0]));
    controller.attach_derived_field(ScaledField { factor: 0.5 });
    Ok(controller)
}

/// A `(num_eqn, cells)` solution whose entries are `eqn + cell / cells`.
///
/// Gives the formatters values with varied mantissas and exponents
/// rather than a block of zeros.
pub fn ramp_solution(num_eqn: usize, cells: usize) -> MockSolution {
    let mut solution = MockSolution::new(num_eqn, cells);
    let denom = cells.max(1) as f64;
    solution.q = ArrayD::from_shape_fn(IxDyn(&[num_eqn, cells]), |ix| {
        ix[0] as f64 + ix[1] as f64 / denom
    });
    solution
}
