//! Wall-clock metrics for a completed run.

/// Timing collected by the controller during one run.
///
/// All durations are in microseconds.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RunMetrics {
    /// Wall-clock time for the entire run.
    pub total_us: u64,
    /// Time spent inside solver stepping calls.
    pub step_us: u64,
    /// Time spent writing frames, functionals and gauges.
    pub write_us: u64,
    /// Number of frames produced, including the initial frame.
    pub frames_written: u32,
    /// Number of stepping calls made (`evolve_to_time` or `step`).
    pub solver_calls: u64,
}
