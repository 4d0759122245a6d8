//! Leaf-field accumulation
//!
//! Exactly one leaf element is open at a time. Character data is buffered only
//! while a recognized leaf is open and handed out once when it closes.

use super::tags::*;

/// Which vendor extension a speed or power leaf came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extension {
    Ns2,
    Ns3,
    Tpx,
}

/// Leaf elements whose text is collected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeafField {
    Time,
    Latitude,
    Longitude,
    Altitude,
    Distance,
    /// v1: heart rate as direct text of `HeartRateBpm`
    HeartRate,
    /// v2: heart rate in `HeartRateBpm/Value`
    HeartRateValue,
    Cadence,
    RunCadence,
    SensorState,
    Speed(Extension),
    Power(Extension),
    Calories,
    AverageWatts,
    Notes,
    CreatorName,
    VersionMajor,
    VersionMinor,
    CourseName,
}

impl LeafField {
    /// Element name that opens and closes this leaf
    pub fn tag(self) -> &'static str {
        match self {
            LeafField::Time => TAG_TIME,
            LeafField::Latitude => TAG_LATITUDE_DEGREES,
            LeafField::Longitude => TAG_LONGITUDE_DEGREES,
            LeafField::Altitude => TAG_ALTITUDE_METERS,
            LeafField::Distance => TAG_DISTANCE_METERS,
            LeafField::HeartRate => TAG_HEART_RATE_BPM,
            LeafField::HeartRateValue => TAG_VALUE,
            LeafField::Cadence => TAG_CADENCE,
            LeafField::RunCadence => TAG_RUN_CADENCE,
            LeafField::SensorState => TAG_SENSOR_STATE,
            LeafField::Speed(Extension::Ns2) => TAG_NS2_SPEED,
            LeafField::Speed(Extension::Ns3) => TAG_NS3_SPEED,
            LeafField::Speed(Extension::Tpx) => TAG_TPX_SPEED,
            LeafField::Power(Extension::Ns2) => TAG_NS2_WATTS,
            LeafField::Power(Extension::Ns3) => TAG_NS3_WATTS,
            LeafField::Power(Extension::Tpx) => TAG_TPX_WATTS,
            LeafField::Calories => TAG_CALORIES,
            LeafField::AverageWatts => TAG_TPX_AVERAGE_WATTS,
            LeafField::Notes => TAG_NOTES,
            LeafField::CreatorName | LeafField::CourseName => TAG_NAME,
            LeafField::VersionMajor => TAG_CREATOR_VERSION_MAJOR,
            LeafField::VersionMinor => TAG_CREATOR_VERSION_MINOR,
        }
    }
}

/// Text buffer for the single open leaf
#[derive(Debug, Default)]
pub struct LeafAccumulator {
    open: Option<LeafField>,
    buffer: String,
}

impl LeafAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start collecting for `field`, discarding anything buffered before.
    pub fn open(&mut self, field: LeafField) {
        self.buffer.clear();
        self.open = Some(field);
    }

    /// Append character data if a leaf is open.
    pub fn push(&mut self, text: &str) {
        if self.open.is_some() {
            self.buffer.push_str(text);
        }
    }

    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    /// Close the open leaf if `name` is its tag, returning the field and its text.
    pub fn close(&mut self, name: &str) -> Option<(LeafField, String)> {
        let field = self.open.filter(|field| field.tag() == name)?;
        self.open = None;
        Some((field, std::mem::take(&mut self.buffer)))
    }
}
