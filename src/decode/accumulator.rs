//! Per-lap and per-tour running state.

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use super::context::TourKind;
use super::pause::PauseInferencer;
use super::sample_builder::SampleBuilder;
use crate::types::{DeviceInfo, ImportMessage, Sample, SchemaVersion};

/// State of the lap that is currently open
#[derive(Debug, Clone, PartialEq)]
pub struct LapAccumulator {
    /// 1-based, monotonic within a tour
    pub index: u32,
    /// Summed `Calories` leaves in kilocalories
    pub calories_kcal: f32,
    /// Summed `AverageWatts` leaves
    pub average_watts: f32,
    /// Trackpoints sealed since the lap opened
    pub trackpoints: u32,
}

impl LapAccumulator {
    fn new(index: u32) -> Self {
        Self { index, calories_kcal: 0.0, average_watts: 0.0, trackpoints: 0 }
    }
}

/// One activity or course in progress
#[derive(Debug)]
pub struct TourAccumulator {
    pub kind: TourKind,
    pub version: SchemaVersion,
    pub sport: Option<String>,
    pub title: Option<String>,
    pub notes: Option<String>,
    pub device: DeviceInfo,
    pub samples: Vec<Sample>,
    pub pauses: PauseInferencer,
    pub lap_start_times: Vec<DateTime<Utc>>,
    /// Folded calories of laps that had trackpoints
    pub calories_kcal: f32,
    /// Folded `AverageWatts` of laps that had trackpoints
    pub lap_watts_sum: f32,
    /// Laps opened so far, including empty ones
    pub lap_count: u32,
    /// No lap reported `AverageWatts`; derive the average from samples
    pub compute_average_power: bool,
    pub distance_from_sensor: bool,
    pub stride_sensor: bool,
    lap: Option<LapAccumulator>,
    builder: Option<SampleBuilder>,
    pending_marker: bool,
    pending_lap_start: bool,
    first_in_track: bool,
}

impl TourAccumulator {
    pub fn new(kind: TourKind, version: SchemaVersion, sport: Option<String>) -> Self {
        Self {
            kind,
            version,
            sport,
            title: None,
            notes: None,
            device: DeviceInfo::default(),
            samples: Vec::new(),
            pauses: PauseInferencer::new(),
            lap_start_times: Vec::new(),
            calories_kcal: 0.0,
            lap_watts_sum: 0.0,
            lap_count: 0,
            compute_average_power: true,
            distance_from_sensor: false,
            stride_sensor: false,
            lap: None,
            builder: None,
            pending_marker: false,
            pending_lap_start: false,
            first_in_track: false,
        }
    }

    pub fn lap(&self) -> Option<&LapAccumulator> {
        self.lap.as_ref()
    }

    pub fn builder_mut(&mut self) -> Option<&mut SampleBuilder> {
        self.builder.as_mut()
    }

    pub fn open_lap(&mut self) {
        self.lap_count += 1;
        self.lap = Some(LapAccumulator::new(self.lap_count));
        if self.lap_count > 1 {
            self.pending_marker = true;
        }
        self.pending_lap_start = true;
    }

    /// Fold the open lap into the tour totals unless it never received a trackpoint.
    pub fn close_lap(&mut self, messages: &mut Vec<ImportMessage>) {
        let Some(lap) = self.lap.take() else {
            return;
        };

        if lap.trackpoints > 0 {
            self.calories_kcal += lap.calories_kcal;
            self.lap_watts_sum += lap.average_watts;
            return;
        }

        if lap.calories_kcal > 0.0 || lap.average_watts > 0.0 {
            let text = format!(
                "Lap {} has no trackpoints; its {} kcal and {} W were discarded",
                lap.index, lap.calories_kcal, lap.average_watts
            );
            warn!(lap = lap.index, "{}", text);
            messages.push(ImportMessage::warning(text));
        }
    }

    pub fn add_lap_calories(&mut self, kcal: f32) {
        if let Some(lap) = self.lap.as_mut() {
            lap.calories_kcal += kcal;
        }
    }

    pub fn add_lap_average_watts(&mut self, watts: f32) {
        if let Some(lap) = self.lap.as_mut() {
            lap.average_watts += watts;
        }
        self.compute_average_power = false;
    }

    pub fn open_track(&mut self) {
        self.first_in_track = true;
    }

    pub fn open_trackpoint(&mut self) {
        self.builder = Some(SampleBuilder::new());
    }

    /// Seal the open trackpoint and append it to the tour.
    ///
    /// `current_time` is the document's last parsed time, recorded as the lap start
    /// when this is the first trackpoint of a lap.
    pub fn seal_trackpoint(&mut self, current_time: Option<DateTime<Utc>>) {
        let Some(builder) = self.builder.take() else {
            return;
        };

        let timed = builder.has_time();
        let mut sample = builder.build();

        if timed {
            let previous = self.samples.last().map(|sample| sample.time);
            let gap_candidate = self.first_in_track && !self.pending_marker;
            self.pauses.observe(&sample, previous, gap_candidate);
        }

        if self.pending_marker {
            self.pending_marker = false;
            sample.marker = Some((self.lap_count - 1).to_string());
        }

        self.samples.push(sample);
        if let Some(lap) = self.lap.as_mut() {
            lap.trackpoints += 1;
        }
        self.first_in_track = false;

        if self.pending_lap_start {
            self.pending_lap_start = false;
            if let Some(time) = current_time {
                self.lap_start_times.push(time);
            }
        }
    }

    /// Record the tour title. Every course `Name` overwrites the previous one.
    pub fn set_title(&mut self, title: String) {
        debug!(%title, previous = ?self.title, "Course title");
        self.title = Some(title);
    }
}
