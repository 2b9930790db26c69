//! Run configuration, validation, and error types.
//!
//! [`RunConfig`] is the input for constructing a
//! [`Controller`](crate::Controller). [`validate()`](RunConfig::validate)
//! checks every invariant that does not depend on the initial state;
//! the schedule itself is resolved at run start against the solution's
//! time (see [`OutputSchedule`](crate::OutputSchedule)).
//!
//! [`RunConfigBuilder`] accepts the classic numeric `output_style`
//! surface (1, 2 or 3) and maps it onto the [`OutputStyle`] sum type.

use std::error::Error;
use std::fmt;

use stepwise_output::FormatKind;

// ── OutputStyle ────────────────────────────────────────────────────

/// Evenly spaced output times ending at `t_final` (style 1).
#[derive(Clone, Debug, PartialEq)]
pub struct UniformOutput {
    /// Index of the last frame written. Default: 10.
    pub num_output_times: u32,
    /// Final simulation time. Required before a run.
    pub t_final: Option<f64>,
}

/// Caller-supplied output times (style 2).
///
/// The initial condition is always frame `start_frame`. The list may
/// start with the initial time itself, as a full schedule `T_0 … T_n`;
/// that entry is already satisfied and skipped. Every other listed time
/// is a later output and must exceed the one before it.
#[derive(Clone, Debug, PartialEq)]
pub struct ExplicitOutput {
    /// Strictly increasing output times, optionally led by the initial time.
    pub out_times: Vec<f64>,
}

/// One frame every `nstepout` raw solver steps (style 3).
#[derive(Clone, Debug, PartialEq)]
pub struct StepCadenceOutput {
    /// Index of the last frame written.
    pub num_output_times: u32,
    /// Raw steps between consecutive frames. Must be at least 1.
    pub nstepout: u32,
}

/// When frames are written.
#[derive(Clone, Debug, PartialEq)]
pub enum OutputStyle {
    /// Style 1.
    Uniform(UniformOutput),
    /// Style 2.
    Explicit(ExplicitOutput),
    /// Style 3.
    StepCadence(StepCadenceOutput),
}

impl OutputStyle {
    /// The classic numeric code of this style.
    pub fn code(&self) -> u8 {
        match self {
            Self::Uniform(_) => 1,
            Self::Explicit(_) => 2,
            Self::StepCadence(_) => 3,
        }
    }

    /// Style 1 with `num_output_times` frames ending at `t_final`.
    pub fn uniform(num_output_times: u32, t_final: f64) -> Self {
        Self::Uniform(UniformOutput {
            num_output_times,
            t_final: Some(t_final),
        })
    }

    /// Style 2 with the given output times.
    pub fn explicit(out_times: impl Into<Vec<f64>>) -> Self {
        Self::Explicit(ExplicitOutput {
            out_times: out_times.into(),
        })
    }

    /// Style 3 with `num_output_times` frames every `nstepout` steps.
    pub fn step_cadence(num_output_times: u32, nstepout: u32) -> Self {
        Self::StepCadence(StepCadenceOutput {
            num_output_times,
            nstepout,
        })
    }
}

impl Default for OutputStyle {
    fn default() -> Self {
        Self::Uniform(UniformOutput {
            num_output_times: 10,
            t_final: None,
        })
    }
}

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected while configuring a run or computing its schedule.
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    /// `run()` was called before a collaborator was attached.
    MissingAttachment {
        /// `"solver"` or `"solution"`.
        what: &'static str,
    },
    /// The numeric output style is not 1, 2 or 3.
    UnsupportedStyle {
        /// The rejected code.
        code: u8,
    },
    /// Explicit output times were given for a style other than 2.
    OutTimesWithoutExplicitStyle {
        /// The configured style code.
        style: u8,
    },
    /// Style 1 needs a final time.
    MissingFinalTime,
    /// `start_frame` is past the last output frame.
    StartFrameBeyondOutputs {
        /// The configured start frame.
        start_frame: u32,
        /// The configured number of output times.
        num_output_times: u32,
    },
    /// A schedule time is NaN or infinite.
    NonFiniteTime {
        /// The invalid value.
        value: f64,
    },
    /// Schedule times are not strictly increasing.
    TimesNotIncreasing {
        /// Position of the offending time in the schedule.
        index: usize,
        /// The preceding time.
        previous: f64,
        /// The offending time.
        value: f64,
    },
    /// The final time does not lie after the initial time.
    FinalTimeNotAfterInitial {
        /// Solution time at run start.
        t_initial: f64,
        /// Configured final time.
        t_final: f64,
    },
    /// Step cadence of zero steps per frame.
    ZeroStepInterval,
    /// The fixed-cadence style needs a solver that supports single steps.
    SingleStepUnsupported {
        /// Name of the attached solver.
        solver: String,
    },
    /// A kept-frame cap of zero would keep nothing.
    KeepCopyLimitZero,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingAttachment { what } => write!(f, "no {what} attached"),
            Self::UnsupportedStyle { code } => {
                write!(f, "invalid output style {code} (expected 1, 2 or 3)")
            }
            Self::OutTimesWithoutExplicitStyle { style } => {
                write!(f, "out_times given but output style is {style}, not 2")
            }
            Self::MissingFinalTime => write!(f, "output style 1 requires a final time"),
            Self::StartFrameBeyondOutputs {
                start_frame,
                num_output_times,
            } => write!(
                f,
                "start_frame {start_frame} exceeds num_output_times {num_output_times}"
            ),
            Self::NonFiniteTime { value } => {
                write!(f, "output time must be finite, got {value}")
            }
            Self::TimesNotIncreasing {
                index,
                previous,
                value,
            } => write!(
                f,
                "output times must be strictly increasing: time[{index}] = {value} \
                 does not exceed {previous}"
            ),
            Self::FinalTimeNotAfterInitial { t_initial, t_final } => write!(
                f,
                "final time {t_final} must exceed initial time {t_initial}"
            ),
            Self::ZeroStepInterval => write!(f, "nstepout must be at least 1"),
            Self::SingleStepUnsupported { solver } => write!(
                f,
                "output style 3 needs single-step support, which solver '{solver}' lacks"
            ),
            Self::KeepCopyLimitZero => write!(f, "keep_copy_limit must be at least 1"),
        }
    }
}

impl Error for ConfigError {}

// ── RunConfig ──────────────────────────────────────────────────────

/// Complete configuration of one run.
#[derive(Clone, Debug, PartialEq)]
pub struct RunConfig {
    /// When frames are written.
    pub style: OutputStyle,
    /// Index of the initial frame. Default: 0.
    pub start_frame: u32,
    /// Allow writing into a non-empty output directory. Default: false,
    /// so replacing earlier results is always an explicit opt-in.
    pub overwrite: bool,
    /// Keep an in-memory copy of the state at every frame. Default: false.
    pub keep_copy: bool,
    /// Maximum number of kept copies, oldest evicted first. `None` = unbounded.
    pub keep_copy_limit: Option<usize>,
    /// Write `aux` into the initial frame. Default: false.
    pub write_aux_init: bool,
    /// Write `aux` into every later frame. Default: false.
    pub write_aux_always: bool,
    /// On-disk format; `None` disables frame, derived and functional files.
    pub output_format: Option<FormatKind>,
    /// Suggested log verbosity for the host. The controller never reads
    /// it; pass it to [`RunContext::level_filter`](crate::RunContext::level_filter)
    /// when installing a logger.
    pub verbosity: u8,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            style: OutputStyle::default(),
            start_frame: 0,
            overwrite: false,
            keep_copy: false,
            keep_copy_limit: None,
            write_aux_init: false,
            write_aux_always: false,
            output_format: Some(FormatKind::Ascii),
            verbosity: 0,
        }
    }
}

impl RunConfig {
    /// Start a builder from the defaults.
    pub fn builder() -> RunConfigBuilder {
        RunConfigBuilder::default()
    }

    /// Validate every invariant that does not depend on the initial state.
    pub fn validate(&self) -> Result<(), ConfigError> {
        // 1. Per-style parameters.
        match &self.style {
            OutputStyle::Uniform(u) => {
                let t_final = u.t_final.ok_or(ConfigError::MissingFinalTime)?;
                if !t_final.is_finite() {
                    return Err(ConfigError::NonFiniteTime { value: t_final });
                }
                check_start_frame(self.start_frame, u.num_output_times)?;
            }
            OutputStyle::Explicit(e) => {
                if let Some(&value) = e.out_times.iter().find(|t| !t.is_finite()) {
                    return Err(ConfigError::NonFiniteTime { value });
                }
                for (i, pair) in e.out_times.windows(2).enumerate() {
                    if pair[1] <= pair[0] {
                        return Err(ConfigError::TimesNotIncreasing {
                            index: i + 1,
                            previous: pair[0],
                            value: pair[1],
                        });
                    }
                }
            }
            OutputStyle::StepCadence(s) => {
                if s.nstepout == 0 {
                    return Err(ConfigError::ZeroStepInterval);
                }
                check_start_frame(self.start_frame, s.num_output_times)?;
            }
        }
        // 2. Kept-frame cap.
        if self.keep_copy_limit == Some(0) {
            return Err(ConfigError::KeepCopyLimitZero);
        }
        Ok(())
    }
}

fn check_start_frame(start_frame: u32, num_output_times: u32) -> Result<(), ConfigError> {
    if start_frame > num_output_times {
        return Err(ConfigError::StartFrameBeyondOutputs {
            start_frame,
            num_output_times,
        });
    }
    Ok(())
}

impl fmt::Display for RunConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  output_style = {}", self.style.code())?;
        match &self.style {
            OutputStyle::Uniform(u) => {
                writeln!(f, "  num_output_times = {}", u.num_output_times)?;
                match u.t_final {
                    Some(t) => writeln!(f, "  tfinal = {t}")?,
                    None => writeln!(f, "  tfinal = (unset)")?,
                }
            }
            OutputStyle::Explicit(e) => writeln!(f, "  out_times = {:?}", e.out_times)?,
            OutputStyle::StepCadence(s) => {
                writeln!(f, "  num_output_times = {}", s.num_output_times)?;
                writeln!(f, "  nstepout = {}", s.nstepout)?;
            }
        }
        writeln!(f, "  start_frame = {}", self.start_frame)?;
        writeln!(f, "  overwrite = {}", self.overwrite)?;
        writeln!(f, "  keep_copy = {}", self.keep_copy)?;
        match self.output_format {
            Some(kind) => writeln!(f, "  output_format = {kind}")?,
            None => writeln!(f, "  output_format = none")?,
        }
        write!(f, "  verbosity = {}", self.verbosity)
    }
}

// ── RunConfigBuilder ───────────────────────────────────────────────

/// Builder accepting the numeric `output_style` surface.
///
/// ```
/// use stepwise_engine::{OutputStyle, RunConfig};
///
/// let config = RunConfig::builder()
///     .output_style(1)
///     .num_output_times(5)
///     .tfinal(10.0)
///     .build()
///     .unwrap();
/// assert_eq!(config.style, OutputStyle::uniform(5, 10.0));
/// ```
#[derive(Clone, Debug)]
pub struct RunConfigBuilder {
    output_style: u8,
    num_output_times: u32,
    tfinal: Option<f64>,
    out_times: Option<Vec<f64>>,
    nstepout: u32,
    config: RunConfig,
}

impl Default for RunConfigBuilder {
    fn default() -> Self {
        Self {
            output_style: 1,
            num_output_times: 10,
            tfinal: None,
            out_times: None,
            nstepout: 1,
            config: RunConfig::default(),
        }
    }
}

impl RunConfigBuilder {
    /// Numeric output style: 1, 2 or 3.
    pub fn output_style(mut self, code: u8) -> Self {
        self.output_style = code;
        self
    }

    /// Index of the last frame (styles 1 and 3).
    pub fn num_output_times(mut self, n: u32) -> Self {
        self.num_output_times = n;
        self
    }

    /// Final time (style 1).
    pub fn tfinal(mut self, t: f64) -> Self {
        self.tfinal = Some(t);
        self
    }

    /// Post-initial output times (style 2 only).
    pub fn out_times(mut self, times: impl Into<Vec<f64>>) -> Self {
        self.out_times = Some(times.into());
        self
    }

    /// Raw steps per frame (style 3).
    pub fn nstepout(mut self, n: u32) -> Self {
        self.nstepout = n;
        self
    }

    /// Index of the initial frame.
    pub fn start_frame(mut self, frame: u32) -> Self {
        self.config.start_frame = frame;
        self
    }

    /// Allow writing into a non-empty output directory.
    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.config.overwrite = overwrite;
        self
    }

    /// Keep an in-memory copy of the state at every frame.
    pub fn keep_copy(mut self, keep: bool) -> Self {
        self.config.keep_copy = keep;
        self
    }

    /// Cap the number of kept copies.
    pub fn keep_copy_limit(mut self, limit: usize) -> Self {
        self.config.keep_copy_limit = Some(limit);
        self
    }

    /// Write `aux` into the initial frame.
    pub fn write_aux_init(mut self, write: bool) -> Self {
        self.config.write_aux_init = write;
        self
    }

    /// Write `aux` into every later frame.
    pub fn write_aux_always(mut self, write: bool) -> Self {
        self.config.write_aux_always = write;
        self
    }

    /// On-disk format, or `None` to disable file output.
    pub fn output_format(mut self, format: Option<FormatKind>) -> Self {
        self.config.output_format = format;
        self
    }

    /// Suggested log verbosity for the host.
    pub fn verbosity(mut self, level: u8) -> Self {
        self.config.verbosity = level;
        self
    }

    /// Resolve the numeric style and validate the result.
    pub fn build(self) -> Result<RunConfig, ConfigError> {
        if self.out_times.is_some() && self.output_style != 2 {
            return Err(ConfigError::OutTimesWithoutExplicitStyle {
                style: self.output_style,
            });
        }
        let style = match self.output_style {
            1 => OutputStyle::Uniform(UniformOutput {
                num_output_times: self.num_output_times,
                t_final: self.tfinal,
            }),
            2 => OutputStyle::explicit(self.out_times.unwrap_or_default()),
            3 => OutputStyle::step_cadence(self.num_output_times, self.nstepout),
            code => return Err(ConfigError::UnsupportedStyle { code }),
        };
        let config = RunConfig {
            style,
            ..self.config
        };
        config.validate()?;
        Ok(config)
    }
}
