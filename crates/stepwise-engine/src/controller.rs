//! The run controller: drives a solver through an output schedule.
//!
//! [`Controller`] owns the run configuration and context plus its
//! attached collaborators. [`run()`](Controller::run) executes the whole
//! run synchronously on the caller's thread:
//!
//! 1. Resolve the schedule and check every collaborator.
//! 2. Refuse to clobber existing output unless overwriting is enabled.
//! 3. `setup` the solver, write the initial frame.
//! 4. For each schedule entry: advance the solver, then write a frame.
//! 5. Close gauge files and `teardown` the solver.
//!
//! Once `setup` has returned, `teardown` runs exactly once on every exit
//! path, including error returns and unwinding panics.

use std::fmt;
use std::fs;
use std::io;
use std::path::Path;
use std::time::Instant;

use stepwise_core::{
    DerivedField, FrameCounter, FrameIndex, Functional, Solution, Solver, SolverStatus,
    ValidityError,
};
use stepwise_output::{
    write_derived_frame, write_frame, Formatter, FrameContents, FunctionalSink, GaugeSet,
    OutputError,
};

use crate::config::{ConfigError, OutputStyle, RunConfig};
use crate::context::RunContext;
use crate::error::RunError;
use crate::history::FrameHistory;
use crate::metrics::RunMetrics;
use crate::schedule::{OutputSchedule, OutputTarget};

/// Result of a successful run.
#[derive(Clone, Debug, PartialEq)]
pub struct RunOutcome {
    /// Status of the last stepping call, unmodified. `None` if the
    /// schedule had no post-initial entries.
    pub status: Option<SolverStatus>,
    /// Frames produced, including the initial frame.
    pub frames: u32,
    /// Index of the last frame produced.
    pub last_frame: FrameIndex,
    /// Wall-clock breakdown of the run.
    pub metrics: RunMetrics,
}

// ── Teardown guard ─────────────────────────────────────────────────

/// Calls `teardown` on drop unless [`finish`](SolverSession::finish) did.
struct SolverSession<'a, S: Solution> {
    solver: &'a mut Box<dyn Solver<S>>,
    active: bool,
}

impl<'a, S: Solution> SolverSession<'a, S> {
    fn begin(solver: &'a mut Box<dyn Solver<S>>, solution: &mut S) -> Self {
        solver.setup(solution);
        Self {
            solver,
            active: true,
        }
    }

    fn solver(&mut self) -> &mut Box<dyn Solver<S>> {
        &mut *self.solver
    }

    fn finish(mut self) {
        self.active = false;
        self.solver.teardown();
    }
}

impl<S: Solution> Drop for SolverSession<'_, S> {
    fn drop(&mut self) {
        if self.active {
            self.active = false;
            self.solver.teardown();
        }
    }
}

// ── Per-frame output ───────────────────────────────────────────────

/// Everything written at an output step.
struct FrameSinks<'c, S: Solution> {
    context: &'c RunContext,
    formatter: Option<Box<dyn Formatter>>,
    functional_sink: Option<FunctionalSink>,
    functional: Option<&'c mut Box<dyn Functional<S>>>,
    derived: Option<&'c mut Box<dyn DerivedField<S>>>,
    gauges: GaugeSet,
}

impl<S: Solution> FrameSinks<'_, S> {
    fn emit(
        &mut self,
        frame: FrameIndex,
        solution: &S,
        solver: &mut Box<dyn Solver<S>>,
        write_aux: bool,
    ) -> Result<(), RunError> {
        if !self.gauges.is_empty() {
            solver.write_gauge_values(solution, &mut self.gauges)?;
        }

        if let Some(formatter) = self.formatter.as_mut() {
            let kind = formatter.kind();
            if let Some(derived) = self.derived.as_mut() {
                let p = derived.compute(solution);
                let path = self.context.derived_path(frame, kind);
                write_derived_frame(formatter.as_mut(), &path, frame, solution.t(), p.view())?;
            }
            let contents = FrameContents {
                frame,
                t: solution.t(),
                q: solution.q(),
                aux: if write_aux { solution.aux() } else { None },
            };
            let path = self.context.frame_path(frame, kind);
            write_frame(formatter.as_mut(), &path, &contents)?;
        }

        if let (Some(sink), Some(functional)) =
            (self.functional_sink.as_mut(), self.functional.as_mut())
        {
            let values = functional.compute(solution);
            sink.append(solution.t(), &values)?;
        }

        self.gauges.flush_all()?;
        Ok(())
    }
}

fn has_existing_output(outdir: &Path) -> Result<bool, OutputError> {
    match fs::read_dir(outdir) {
        Ok(mut entries) => Ok(entries.next().is_some()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(OutputError::io(outdir, e)),
    }
}

fn elapsed_us(since: Instant) -> u64 {
    u64::try_from(since.elapsed().as_micros()).unwrap_or(u64::MAX)
}

// ── Controller ─────────────────────────────────────────────────────

/// Drives an attached [`Solver`] over an attached [`Solution`].
///
/// # Examples
///
/// ```
/// use stepwise_engine::{Controller, OutputStyle, RunConfig, RunContext};
/// use stepwise_test_utils::{MockSolution, MockSolver};
///
/// let dir = tempfile::tempdir().unwrap();
/// let config = RunConfig {
///     style: OutputStyle::uniform(5, 10.0),
///     ..RunConfig::default()
/// };
/// let mut controller = Controller::new(config, RunContext::new(dir.path())).unwrap();
/// controller.attach_solver(MockSolver::new("mock"));
/// controller.attach_solution(MockSolution::new(1, 4));
///
/// let outcome = controller.run().unwrap();
/// assert_eq!(outcome.frames, 6);
/// assert!(dir.path().join("5.ascii").exists());
/// ```
pub struct Controller<S: Solution + Clone> {
    config: RunConfig,
    context: RunContext,
    solver: Option<Box<dyn Solver<S>>>,
    solution: Option<S>,
    functional: Option<Box<dyn Functional<S>>>,
    derived: Option<Box<dyn DerivedField<S>>>,
    counter: FrameCounter,
    history: FrameHistory<S>,
}

impl<S: Solution + Clone> Controller<S> {
    /// Create a controller after validating `config`.
    pub fn new(config: RunConfig, context: RunContext) -> Result<Self, ConfigError> {
        config.validate()?;
        let counter = FrameCounter::new(config.start_frame);
        let history = FrameHistory::new(config.keep_copy_limit);
        Ok(Self {
            config,
            context,
            solver: None,
            solution: None,
            functional: None,
            derived: None,
            counter,
            history,
        })
    }

    /// Attach the solver, replacing any previous one.
    pub fn attach_solver(&mut self, solver: impl Solver<S> + 'static) {
        self.solver = Some(Box::new(solver));
    }

    /// Attach the initial solution, replacing any previous one.
    pub fn attach_solution(&mut self, solution: S) {
        self.solution = Some(solution);
    }

    /// Attach functionals written to the functional file each frame.
    pub fn attach_functional(&mut self, functional: impl Functional<S> + 'static) {
        self.functional = Some(Box::new(functional));
    }

    /// Attach a derived field written to its own frame files.
    pub fn attach_derived_field(&mut self, field: impl DerivedField<S> + 'static) {
        self.derived = Some(Box::new(field));
    }

    /// The run configuration.
    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// The run context.
    pub fn context(&self) -> &RunContext {
        &self.context
    }

    /// The attached solution, in its current state.
    pub fn solution(&self) -> Option<&S> {
        self.solution.as_ref()
    }

    /// Detach and return the solution.
    pub fn take_solution(&mut self) -> Option<S> {
        self.solution.take()
    }

    /// Name of the attached solver.
    pub fn solver_name(&self) -> Option<&str> {
        self.solver.as_ref().map(|s| s.name())
    }

    /// Index of the most recent frame.
    pub fn frame(&self) -> FrameIndex {
        self.counter.get()
    }

    /// Copies kept during the last run (empty unless `keep_copy`).
    pub fn frames(&self) -> &FrameHistory<S> {
        &self.history
    }

    /// Run from the attached solution's current time to the end of the
    /// schedule.
    pub fn run(&mut self) -> Result<RunOutcome, RunError> {
        let started = Instant::now();
        let Self {
            config,
            context,
            solver,
            solution,
            functional,
            derived,
            counter,
            history,
        } = self;
        let target = context.log_target.as_str();

        // 1. Configuration.
        let solver = solver
            .as_mut()
            .ok_or(ConfigError::MissingAttachment { what: "solver" })?;
        let solution = solution
            .as_mut()
            .ok_or(ConfigError::MissingAttachment { what: "solution" })?;
        let schedule = OutputSchedule::compute(&config.style, solution.t(), config.start_frame)?;
        if matches!(config.style, OutputStyle::StepCadence(_)) && !solver.supports_single_step() {
            return Err(ConfigError::SingleStepUnsupported {
                solver: solver.name().to_string(),
            }
            .into());
        }
        log::debug!(
            target: target,
            "schedule: style {}, {} outputs after t={}",
            config.style.code(),
            schedule.len(),
            schedule.initial_time()
        );

        // 2. Validity.
        if !solver.is_valid() {
            return Err(ValidityError::SolverNotReady {
                solver: solver.name().to_string(),
            }
            .into());
        }
        if !solution.is_valid() {
            return Err(ValidityError::InvalidSolution.into());
        }

        // 3. Overwrite protection, whenever any file will be created.
        let creates_files = config.output_format.is_some() || !solution.gauges().is_empty();
        if creates_files && has_existing_output(&context.outdir)? {
            if !config.overwrite {
                return Err(RunError::OverwriteProtected {
                    outdir: context.outdir.clone(),
                });
            }
            log::warn!(
                target: target,
                "overwriting existing output in {}",
                context.outdir.display()
            );
        }

        // 4. Setup; teardown is guaranteed from here on.
        let mut session = SolverSession::begin(solver, solution);
        log::debug!(target: target, "solver '{}' set up", session.solver().name());

        // 5. Sinks.
        let gauges = GaugeSet::open(&context.outdir, solution.gauges())?;
        // A restart continues the functional file of the earlier run.
        let functional_sink = match (config.output_format, functional.is_some()) {
            (Some(_), true) if config.start_frame == 0 => {
                Some(FunctionalSink::create(&context.functional_path())?)
            }
            (Some(_), true) => Some(FunctionalSink::open_append(&context.functional_path())?),
            _ => None,
        };
        let mut sinks = FrameSinks {
            context,
            formatter: config.output_format.map(|kind| kind.create()),
            functional_sink,
            functional: functional.as_mut(),
            derived: derived.as_mut(),
            gauges,
        };
        *history = FrameHistory::new(config.keep_copy_limit);
        counter.set(config.start_frame);
        let mut metrics = RunMetrics::default();

        // 6. Initial frame.
        let write_started = Instant::now();
        let frame = counter.get();
        if config.keep_copy {
            history.push(frame, solution.clone());
        }
        sinks.emit(frame, solution, session.solver(), config.write_aux_init)?;
        metrics.write_us += elapsed_us(write_started);
        metrics.frames_written += 1;
        log::info!(target: target, "frame {frame} computed for time t={}", solution.t());

        // 7. Main loop.
        let mut status = None;
        for entry in schedule.targets() {
            let step_started = Instant::now();
            match *entry {
                OutputTarget::Time(t_end) => {
                    let before = solution.t();
                    status = Some(session.solver().evolve_to_time(solution, t_end)?);
                    metrics.solver_calls += 1;
                    check_time(before, solution.t())?;
                }
                OutputTarget::Steps(n) => {
                    for _ in 0..n {
                        let before = solution.t();
                        status = Some(session.solver().step(solution)?);
                        metrics.solver_calls += 1;
                        check_time(before, solution.t())?;
                    }
                }
            }
            metrics.step_us += elapsed_us(step_started);

            let write_started = Instant::now();
            let frame = counter.increment();
            if config.keep_copy {
                if let Some(evicted) = history.push(frame, solution.clone()) {
                    log::warn!(target: target, "kept copy of frame {evicted} evicted");
                }
            }
            sinks.emit(frame, solution, session.solver(), config.write_aux_always)?;
            metrics.write_us += elapsed_us(write_started);
            metrics.frames_written += 1;
            log::info!(target: target, "frame {frame} computed for time t={}", solution.t());
        }

        // 8. Teardown.
        sinks.gauges.close()?;
        drop(sinks);
        session.finish();
        metrics.total_us = elapsed_us(started);
        Ok(RunOutcome {
            status,
            frames: metrics.frames_written,
            last_frame: counter.get(),
            metrics,
        })
    }
}

fn check_time(before: f64, after: f64) -> Result<(), ValidityError> {
    if after < before {
        return Err(ValidityError::TimeReversed { before, after });
    }
    Ok(())
}

impl<S: Solution + Clone> fmt::Display for Controller<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Controller attributes:")?;
        writeln!(f, "{}", self.config)?;
        writeln!(f, "  outdir = {}", self.context.outdir.display())?;
        writeln!(f, "  output_file_prefix = {}", self.context.output_file_prefix)?;
        if let Some(name) = self.solver_name() {
            writeln!(f, "  Solver {name}")?;
        }
        if !self.history.is_empty() {
            writeln!(f, "  Frames")?;
            for (frame, state) in self.history.iter() {
                writeln!(f, "    {frame}: t = {}", state.t())?;
            }
        }
        Ok(())
    }
}

impl<S: Solution + Clone> fmt::Debug for Controller<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Controller")
            .field("config", &self.config)
            .field("context", &self.context)
            .field("solver", &self.solver_name())
            .field("has_solution", &self.solution.is_some())
            .field("has_functional", &self.functional.is_some())
            .field("has_derived_field", &self.derived.is_some())
            .field("frame", &self.counter.get())
            .field("kept_frames", &self.history.len())
            .finish()
    }
}
