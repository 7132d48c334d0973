#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Fixed-step simulation clock for Place Replay.
//!
//! Playback speed is defined purely in simulated milliseconds per frame:
//! the clock advances by the same step every tick regardless of how long
//! the frame took to render, so wall-clock frame rate only changes how fast
//! the animation plays, never which events land in which frame.

use place_replay_core::SimTime;

/// Default starting offset into the dataset. The r/place 2022 image data
/// begins roughly 47,000 seconds into April 1st UTC.
pub const DEFAULT_EPOCH_OFFSET_MS: u32 = 47_000_000;

/// Default simulated milliseconds advanced per rendered frame.
pub const DEFAULT_STEP_MS: u32 = 60_000;

/// Monotonically advancing simulation timestamp with a fixed per-frame step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlaybackClock {
    current: SimTime,
    step_ms: u32,
}

impl PlaybackClock {
    /// Creates a clock starting at `epoch` that advances by `step_ms` per
    /// tick.
    #[must_use]
    pub const fn new(epoch: SimTime, step_ms: u32) -> Self {
        Self {
            current: epoch,
            step_ms,
        }
    }

    /// Current simulation timestamp.
    #[must_use]
    pub const fn current(&self) -> SimTime {
        self.current
    }

    /// Simulated milliseconds advanced per tick.
    #[must_use]
    pub const fn step_ms(&self) -> u32 {
        self.step_ms
    }

    /// Advances the clock by one step and returns the new timestamp.
    pub fn advance(&mut self) -> SimTime {
        self.current = self.current.saturating_add_millis(self.step_ms);
        self.current
    }

    /// Jumps the clock to an arbitrary timestamp (scrubbing).
    pub fn seek(&mut self, target: SimTime) {
        self.current = target;
    }
}

impl Default for PlaybackClock {
    fn default() -> Self {
        Self::new(SimTime::from_millis(DEFAULT_EPOCH_OFFSET_MS), DEFAULT_STEP_MS)
    }
}
