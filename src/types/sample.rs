//! Time-series samples reconstructed from trackpoints

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

/// Epoch milliseconds of 2007-04-01T00:00:00Z, the date some devices stamp on
/// trackpoints recorded before their clock was set.
pub const DEVICE_DEFAULT_EPOCH_MS: i64 = 1_175_385_600_000;

/// Time assigned to trackpoints that never received a parsed time.
pub fn device_default_time() -> DateTime<Utc> {
    DateTime::from_timestamp_millis(DEVICE_DEFAULT_EPOCH_MS).unwrap_or_default()
}

/// True when `time` falls on the device default date (2007-04-01, UTC).
pub fn is_device_default_date(time: &DateTime<Utc>) -> bool {
    time.year() == 2007 && time.month() == 4 && time.day() == 1
}

/// One reconstructed instant of a tour.
///
/// Every measurement is optional: `None` means "not recorded", which is distinct
/// from a recorded zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Absolute time
    pub time: DateTime<Utc>,
    /// Latitude in degrees
    pub latitude: Option<f64>,
    /// Longitude in degrees
    pub longitude: Option<f64>,
    /// Altitude in meters
    pub altitude: Option<f32>,
    /// Cumulative distance in meters
    pub distance: Option<f32>,
    /// Heart rate in bpm
    pub heart_rate: Option<f32>,
    /// Cadence (rpm or steps/min)
    pub cadence: Option<f32>,
    /// Device speed in m/s
    pub speed: Option<f32>,
    /// Power in watts
    pub power: Option<f32>,
    /// Lap marker label, set on the first sample of the second and later laps
    pub marker: Option<String>,
}

impl Sample {
    /// Create a sample with only a time.
    pub fn at(time: DateTime<Utc>) -> Self {
        Self {
            time,
            latitude: None,
            longitude: None,
            altitude: None,
            distance: None,
            heart_rate: None,
            cadence: None,
            speed: None,
            power: None,
            marker: None,
        }
    }

    /// True when nothing but the time was recorded.
    pub fn is_pause(&self) -> bool {
        self.latitude.is_none()
            && self.longitude.is_none()
            && self.altitude.is_none()
            && self.distance.is_none()
            && self.heart_rate.is_none()
            && self.cadence.is_none()
            && self.speed.is_none()
            && self.power.is_none()
    }

    /// Both coordinates, when recorded.
    pub fn position(&self) -> Option<(f64, f64)> {
        Some((self.latitude?, self.longitude?))
    }
}
