//! Test utilities and mock collaborators for Stepwise development.
//!
//! Provides a cloneable [`MockSolution`], solvers whose calls can be
//! observed after they have been moved into a controller
//! ([`MockSolver`], [`FailingSolver`]), and small [`Functional`] /
//! [`DerivedField`] fixtures.
//!
//! [`Functional`]: stepwise_core::Functional
//! [`DerivedField`]: stepwise_core::DerivedField

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use ndarray::{ArrayD, ArrayViewD, IxDyn};
use stepwise_core::{GaugeProbe, Solution};

pub use fixtures::{CallProbe, ConstFunctional, FailingSolver, MockSolver, ScaledField};

/// In-memory simulation state implementing [`Solution`].
///
/// `q` has shape `(num_eqn, cells)`; every field is public so tests can
/// set up and inspect state directly.
#[derive(Clone, Debug)]
pub struct MockSolution {
    pub t: f64,
    pub q: ArrayD<f64>,
    pub aux: Option<ArrayD<f64>>,
    pub gauges: Vec<GaugeProbe>,
    pub valid: bool,
}

impl MockSolution {
    /// A valid state at `t = 0` with `q` all zeros.
    pub fn new(num_eqn: usize, cells: usize) -> Self {
        Self {
            t: 0.0,
            q: ArrayD::zeros(IxDyn(&[num_eqn, cells])),
            aux: None,
            gauges: Vec::new(),
            valid: true,
        }
    }

    /// Start from time `t` instead of zero.
    pub fn at_time(mut self, t: f64) -> Self {
        self.t = t;
        self
    }

    /// Attach an all-ones aux array with `num_aux` rows.
    pub fn with_aux(mut self, num_aux: usize) -> Self {
        let cells = self.q.shape().get(1).copied().unwrap_or(0);
        self.aux = Some(ArrayD::ones(IxDyn(&[num_aux, cells])));
        self
    }

    /// Declare a gauge probe.
    pub fn with_gauge(mut self, name: &str, x: f64) -> Self {
        self.gauges.push(GaugeProbe::new(name, &[x]));
        self
    }

    /// Make `is_valid()` report false.
    pub fn invalid(mut self) -> Self {
        self.valid = false;
        self
    }
}

impl Solution for MockSolution {
    fn t(&self) -> f64 {
        self.t
    }

    fn is_valid(&self) -> bool {
        self.valid
    }

    fn q(&self) -> ArrayViewD<'_, f64> {
        self.q.view()
    }

    fn aux(&self) -> Option<ArrayViewD<'_, f64>> {
        self.aux.as_ref().map(|a| a.view())
    }

    fn gauges(&self) -> &[GaugeProbe] {
        &self.gauges
    }
}
