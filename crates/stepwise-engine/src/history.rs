//! In-memory copies of the state at each output frame.

use std::collections::VecDeque;

use stepwise_core::FrameIndex;

/// Kept copies of the solution, oldest first.
///
/// With a capacity, the history behaves as a ring: pushing onto a full
/// history evicts the oldest copy.
#[derive(Clone, Debug)]
pub struct FrameHistory<S> {
    frames: VecDeque<(FrameIndex, S)>,
    capacity: Option<usize>,
    evicted: usize,
}

impl<S> FrameHistory<S> {
    /// An empty history; `capacity = None` keeps every copy.
    pub fn new(capacity: Option<usize>) -> Self {
        Self {
            frames: VecDeque::new(),
            capacity,
            evicted: 0,
        }
    }

    /// Append a copy, evicting the oldest one if the history is full.
    ///
    /// Returns the index of the evicted frame, if any.
    pub fn push(&mut self, frame: FrameIndex, state: S) -> Option<FrameIndex> {
        let mut dropped = None;
        if let Some(cap) = self.capacity {
            if cap > 0 && self.frames.len() >= cap {
                dropped = self.frames.pop_front().map(|(f, _)| f);
                self.evicted += 1;
            }
        }
        self.frames.push_back((frame, state));
        dropped
    }

    /// The copy taken at `frame`, if still held.
    pub fn get(&self, frame: FrameIndex) -> Option<&S> {
        self.frames
            .iter()
            .find(|(f, _)| *f == frame)
            .map(|(_, s)| s)
    }

    /// The most recent copy.
    pub fn latest(&self) -> Option<&S> {
        self.frames.back().map(|(_, s)| s)
    }

    /// Iterate over `(frame, state)` pairs, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = (FrameIndex, &S)> {
        self.frames.iter().map(|(f, s)| (*f, s))
    }

    /// Number of copies held.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Whether no copies are held.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Number of copies evicted since creation or the last `clear`.
    pub fn evicted(&self) -> usize {
        self.evicted
    }

    /// Drop every copy.
    pub fn clear(&mut self) {
        self.frames.clear();
        self.evicted = 0;
    }
}

impl<S> Default for FrameHistory<S> {
    fn default() -> Self {
        Self::new(None)
    }
}
