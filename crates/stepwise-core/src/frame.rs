//! Frame identifiers and the run's frame counter.

use std::fmt;

/// Index of one persisted output snapshot.
///
/// Frame `n` is written to `<prefix><n>.<ext>`. Indices are assigned
/// in strictly increasing order, one per output step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct FrameIndex(pub u32);

impl fmt::Display for FrameIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for FrameIndex {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Monotonically increasing counter identifying the current frame.
///
/// Starts at the run's `start_frame` and only moves forward. Only the
/// controller mutates it, once per completed output step.
///
/// # Examples
///
/// ```
/// use stepwise_core::{FrameCounter, FrameIndex};
///
/// let mut counter = FrameCounter::new(3);
/// assert_eq!(counter.get(), FrameIndex(3));
/// counter.increment();
/// assert_eq!(counter.get(), FrameIndex(4));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FrameCounter {
    index: u32,
}

impl FrameCounter {
    /// Create a counter positioned at `start_frame`.
    pub fn new(start_frame: u32) -> Self {
        Self { index: start_frame }
    }

    /// Reposition the counter. Used once, before the run starts.
    pub fn set(&mut self, index: u32) {
        self.index = index;
    }

    /// Current frame index.
    pub fn get(&self) -> FrameIndex {
        FrameIndex(self.index)
    }

    /// Advance to the next frame and return the new index.
    pub fn increment(&mut self) -> FrameIndex {
        self.index += 1;
        FrameIndex(self.index)
    }
}

impl fmt::Display for FrameCounter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.index)
    }
}
