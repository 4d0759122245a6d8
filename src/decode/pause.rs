//! Implicit pause detection from sealed samples.

use chrono::{DateTime, Utc};

use crate::types::{PauseInterval, Sample};

/// A fresh track segment starting later than this after the previous sample counts
/// as a pause.
pub const TRACK_GAP_THRESHOLD_MS: i64 = 1000;

/// Classifies samples as observations or pauses and keeps the resulting intervals.
#[derive(Debug, Default)]
pub struct PauseInferencer {
    intervals: Vec<PauseInterval>,
    previous_was_pause: bool,
}

impl PauseInferencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Observe a sealed sample with a real time.
    ///
    /// `previous` is the time of the last sample already in the tour, if any.
    /// `track_gap_candidate` is set for the first trackpoint of a track segment that
    /// does not also start a lap.
    pub fn observe(
        &mut self,
        sample: &Sample,
        previous: Option<DateTime<Utc>>,
        track_gap_candidate: bool,
    ) {
        if sample.is_pause() {
            if !self.previous_was_pause {
                self.intervals.push(PauseInterval::open(sample.time));
                self.previous_was_pause = true;
            }
            return;
        }

        if self.previous_was_pause {
            if let Some(open) = self.intervals.iter_mut().rev().find(|pause| pause.is_open()) {
                open.end = Some(sample.time);
            }
            self.previous_was_pause = false;
        } else if track_gap_candidate {
            if let Some(previous) = previous {
                if (sample.time - previous).num_milliseconds() > TRACK_GAP_THRESHOLD_MS {
                    self.intervals.push(PauseInterval::closed(previous, sample.time));
                }
            }
        }
    }

    pub fn intervals(&self) -> &[PauseInterval] {
        &self.intervals
    }

    pub fn into_intervals(self) -> Vec<PauseInterval> {
        self.intervals
    }
}
