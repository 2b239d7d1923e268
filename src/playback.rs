//! Playback controller: owns the tracker and the current frame sequence.
//!
//! Start always resets statistics and regenerates the sequence from the
//! years current at that moment; stop pauses without clearing anything.

use crate::ephem;
use crate::timeline::{RangeError, SimRange, TimeSequence};
use crate::tracker::{DistanceTracker, FrameReport, PositionSource};

pub struct Playback {
    tracker: DistanceTracker,
    sequence: TimeSequence,
    cursor: usize,
    running: bool,
}

impl Default for Playback {
    fn default() -> Self {
        Playback {
            tracker: DistanceTracker::default(),
            sequence: TimeSequence::empty(),
            cursor: 0,
            running: false,
        }
    }
}

impl Playback {
    /// Validate the range, then reset statistics, rebuild the sequence and
    /// begin from the first frame. An invalid range changes nothing.
    pub fn start(&mut self, range: SimRange) -> Result<(), RangeError> {
        let sequence = TimeSequence::generate(range)?;
        self.tracker.reset();
        self.sequence = sequence;
        self.cursor = 0;
        self.running = true;
        Ok(())
    }

    /// Pause. Statistics and the cursor stay where they are.
    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Process the next frame, if any. Returns `None` when stopped or when
    /// the sequence is exhausted (which also stops playback).
    pub fn tick(&mut self, source: &mut dyn PositionSource) -> Option<ephem::Result<FrameReport>> {
        if !self.running {
            return None;
        }
        let Some(jd) = self.sequence.get(self.cursor) else {
            self.running = false;
            return None;
        };
        self.cursor += 1;
        Some(self.tracker.process_frame(source, jd))
    }

    /// Simulated days since the run began, for the header readout.
    pub fn elapsed_days(&self) -> i64 {
        self.cursor.saturating_sub(1) as i64 * self.sequence.step_days()
    }

    pub fn tracker(&self) -> &DistanceTracker {
        &self.tracker
    }
}
