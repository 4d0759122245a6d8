//! Builds one [`Sample`] from the leaves of a trackpoint.

use chrono::{DateTime, Utc};

use crate::types::{Sample, device_default_time};

/// Parse a single-precision measurement; non-numeric or non-finite text is `None`.
pub fn parse_f32(text: &str) -> Option<f32> {
    text.trim().parse::<f32>().ok().filter(|value| value.is_finite())
}

/// Parse a coordinate; non-numeric or non-finite text is `None`.
pub fn parse_f64(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|value| value.is_finite())
}

/// The trackpoint currently being populated
#[derive(Debug, Default)]
pub struct SampleBuilder {
    pub time: Option<DateTime<Utc>>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub altitude: Option<f32>,
    pub distance: Option<f32>,
    pub heart_rate: Option<f32>,
    pub cadence: Option<f32>,
    pub speed: Option<f32>,
    pub power: Option<f32>,
}

impl SampleBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when a time was assigned, stale or not.
    pub fn has_time(&self) -> bool {
        self.time.is_some()
    }

    /// Seal the trackpoint. A trackpoint without a time gets the device default date.
    pub fn build(self) -> Sample {
        Sample {
            time: self.time.unwrap_or_else(device_default_time),
            latitude: self.latitude,
            longitude: self.longitude,
            altitude: self.altitude,
            distance: self.distance,
            heart_rate: self.heart_rate,
            cadence: self.cadence,
            speed: self.speed,
            power: self.power,
            marker: None,
        }
    }
}
