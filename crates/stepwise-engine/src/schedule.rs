//! Resolution of an [`OutputStyle`] into concrete output targets.
//!
//! The schedule is computed once per run from the style parameters,
//! the solution's initial time and the start frame. It is a pure
//! function of those inputs: computing it twice gives the same result.

use crate::config::{ConfigError, OutputStyle};

/// What the controller advances to before writing the next frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum OutputTarget {
    /// Evolve the solution exactly to this time.
    Time(f64),
    /// Take this many raw solver steps.
    Steps(u32),
}

/// The immutable list of post-initial output targets of one run.
///
/// Frame `start_frame` is the initial condition at
/// [`initial_time`](OutputSchedule::initial_time); target `i` produces
/// frame `start_frame + 1 + i`.
#[derive(Clone, Debug, PartialEq)]
pub struct OutputSchedule {
    initial_time: f64,
    targets: Vec<OutputTarget>,
}

impl OutputSchedule {
    /// Resolve `style` against the run's initial time and start frame.
    ///
    /// ```
    /// use stepwise_engine::{OutputSchedule, OutputStyle, OutputTarget};
    ///
    /// let s = OutputSchedule::compute(&OutputStyle::uniform(5, 10.0), 0.0, 0).unwrap();
    /// assert_eq!(s.times(), vec![0.0, 2.0, 4.0, 6.0, 8.0, 10.0]);
    /// assert_eq!(s.targets()[0], OutputTarget::Time(2.0));
    /// ```
    pub fn compute(
        style: &OutputStyle,
        t_initial: f64,
        start_frame: u32,
    ) -> Result<Self, ConfigError> {
        if !t_initial.is_finite() {
            return Err(ConfigError::NonFiniteTime { value: t_initial });
        }
        let targets = match style {
            OutputStyle::Uniform(u) => {
                let n = remaining_outputs(start_frame, u.num_output_times)?;
                let t_final = u.t_final.ok_or(ConfigError::MissingFinalTime)?;
                if !t_final.is_finite() {
                    return Err(ConfigError::NonFiniteTime { value: t_final });
                }
                if n == 0 {
                    Vec::new()
                } else {
                    if t_final <= t_initial {
                        return Err(ConfigError::FinalTimeNotAfterInitial { t_initial, t_final });
                    }
                    let times = linspace_tail(t_initial, t_final, n);
                    check_increasing(t_initial, &times)?;
                    times.into_iter().map(OutputTarget::Time).collect()
                }
            }
            OutputStyle::Explicit(e) => {
                if let Some(&value) = e.out_times.iter().find(|t| !t.is_finite()) {
                    return Err(ConfigError::NonFiniteTime { value });
                }
                // A leading T_0 equal to the initial time needs no stepping.
                let times = match e.out_times.split_first() {
                    Some((&first, rest)) if first == t_initial => rest,
                    _ => e.out_times.as_slice(),
                };
                check_increasing(t_initial, times)?;
                times.iter().copied().map(OutputTarget::Time).collect()
            }
            OutputStyle::StepCadence(s) => {
                if s.nstepout == 0 {
                    return Err(ConfigError::ZeroStepInterval);
                }
                let n = remaining_outputs(start_frame, s.num_output_times)?;
                vec![OutputTarget::Steps(s.nstepout); n as usize]
            }
        };
        Ok(Self {
            initial_time: t_initial,
            targets,
        })
    }

    /// Time of the initial frame.
    pub fn initial_time(&self) -> f64 {
        self.initial_time
    }

    /// Post-initial targets, in order.
    pub fn targets(&self) -> &[OutputTarget] {
        &self.targets
    }

    /// Number of frames written after the initial one.
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Whether only the initial frame is written.
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// `T_0 … T_n` for time-based styles: the initial time followed by
    /// every target time. Step targets contribute nothing.
    pub fn times(&self) -> Vec<f64> {
        std::iter::once(self.initial_time)
            .chain(self.targets.iter().filter_map(|t| match t {
                OutputTarget::Time(t) => Some(*t),
                OutputTarget::Steps(_) => None,
            }))
            .collect()
    }
}

fn remaining_outputs(start_frame: u32, num_output_times: u32) -> Result<u32, ConfigError> {
    num_output_times
        .checked_sub(start_frame)
        .ok_or(ConfigError::StartFrameBeyondOutputs {
            start_frame,
            num_output_times,
        })
}

/// `linspace(t0, t1, n + 1)` without its first point; the last point is
/// exactly `t1`.
fn linspace_tail(t0: f64, t1: f64, n: u32) -> Vec<f64> {
    let span = t1 - t0;
    let mut times: Vec<f64> = (1..=n)
        .map(|i| t0 + span * f64::from(i) / f64::from(n))
        .collect();
    if let Some(last) = times.last_mut() {
        *last = t1;
    }
    times
}

fn check_increasing(t_initial: f64, times: &[f64]) -> Result<(), ConfigError> {
    let mut previous = t_initial;
    for (i, &value) in times.iter().enumerate() {
        if value <= previous {
            return Err(ConfigError::TimesNotIncreasing {
                index: i + 1,
                previous,
                value,
            });
        }
        previous = value;
    }
    Ok(())
}
