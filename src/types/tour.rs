//! Finalized tour records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::{PauseInterval, Sample, SchemaVersion};

/// Recording device as named by the document's `Creator` element
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub creator_name: Option<String>,
    pub version_major: Option<String>,
    pub version_minor: Option<String>,
}

impl DeviceInfo {
    /// `major.minor`, `major` alone, or empty when no major version was recorded.
    pub fn firmware_version(&self) -> String {
        match (&self.version_major, &self.version_minor) {
            (None, _) => String::new(),
            (Some(major), None) => major.clone(),
            (Some(major), Some(minor)) => format!("{}.{}", major, minor),
        }
    }

    /// Device name shown to users: `prefix` followed by the creator name, if any.
    pub fn display_name(&self, prefix: &str) -> String {
        match &self.creator_name {
            Some(name) => format!("{} {}", prefix, name),
            None => prefix.to_string(),
        }
    }
}

/// One immutable, repaired activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tour {
    /// Time of the first sample, after start-date repair
    pub start_time: DateTime<Utc>,
    /// Ordered, deduplicated, distance-repaired samples
    pub samples: Vec<Sample>,
    /// Pauses starting at or after `start_time`
    pub pauses: Vec<PauseInterval>,
    /// Time current when the first trackpoint of each lap was sealed
    pub lap_start_times: Vec<DateTime<Utc>>,
    /// Tour total in calories (lap kilocalories scaled by 1000)
    pub calories: u32,
    /// Average power in watts, if any power was recorded
    pub average_power: Option<f32>,
    /// Activity `Sport` attribute
    pub sport: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub device: DeviceInfo,
    /// Distance came from a foot pod or speed sensor rather than GPS
    pub distance_from_sensor: bool,
    /// Cadence came from a stride sensor
    pub stride_sensor_present: bool,
    pub schema_version: SchemaVersion,
    /// Document the tour was decoded from, when known
    pub import_file: Option<PathBuf>,
}

impl Tour {
    /// Time of the last sample
    pub fn end_time(&self) -> DateTime<Utc> {
        self.samples.last().map_or(self.start_time, |sample| sample.time)
    }

    /// Last recorded cumulative distance in meters
    pub fn total_distance(&self) -> Option<f32> {
        self.samples.iter().rev().find_map(|sample| sample.distance)
    }

    /// Samples carrying a lap marker
    pub fn markers(&self) -> impl Iterator<Item = &Sample> {
        self.samples.iter().filter(|sample| sample.marker.is_some())
    }
}
