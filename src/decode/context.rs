//! Context tracking: where in the document the decoder currently is.
//!
//! The document region is kept as a small stack of [`Region`]s. Only elements
//! that change what is legal below them are pushed (tour, lap, track, trackpoint and
//! a few sub-blocks); everything else is either a recognized leaf or ignored. Which
//! pushes are legal depends on the [`SchemaVersion`] detected from the root element.
//!
//! ```text
//! v1:  History|Course ─► Lap? ─► Trackpoint ─► leaf
//! v2:  Activity ─► Lap ─► Track ─► Trackpoint ─► leaf
//!      Course ─────────────────► Trackpoint ─► leaf
//! ```

use super::leaf::{Extension, LeafField};
use super::tags::*;
use crate::types::SchemaVersion;

/// Element that opened the current tour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TourKind {
    Activity,
    Course,
    History,
}

impl TourKind {
    pub fn tag(self) -> &'static str {
        match self {
            TourKind::Activity => TAG_ACTIVITY,
            TourKind::Course => TAG_COURSE,
            TourKind::History => TAG_HISTORY,
        }
    }
}

/// One open document region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    Tour(TourKind),
    Lap,
    Track,
    Trackpoint,
    /// v2 `HeartRateBpm` wrapping a `Value` leaf
    HeartRate,
    Tpx,
    Creator,
}

impl Region {
    pub fn tag(self) -> &'static str {
        match self {
            Region::Tour(kind) => kind.tag(),
            Region::Lap => TAG_LAP,
            Region::Track => TAG_TRACK,
            Region::Trackpoint => TAG_TRACKPOINT,
            Region::HeartRate => TAG_HEART_RATE_BPM,
            Region::Tpx => TAG_TPX,
            Region::Creator => TAG_CREATOR,
        }
    }
}

/// Progress of namespace detection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentState {
    /// No element seen yet
    Prolog,
    /// Root element did not carry a known namespace; the rest is ignored
    Unrecognized,
    Recognized(SchemaVersion),
}

/// What an element-open event means at the current position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartAction {
    Open(Region),
    Leaf(LeafField),
    Ignore,
}

/// Region stack for one document
#[derive(Debug)]
pub struct ContextTracker {
    state: DocumentState,
    stack: Vec<Region>,
}

impl Default for ContextTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl ContextTracker {
    pub fn new() -> Self {
        Self { state: DocumentState::Prolog, stack: Vec::with_capacity(8) }
    }

    pub fn state(&self) -> DocumentState {
        self.state
    }

    pub fn version(&self) -> Option<SchemaVersion> {
        match self.state {
            DocumentState::Recognized(version) => Some(version),
            _ => None,
        }
    }

    /// Scan the root element. Must be called for the first element only.
    ///
    /// Any attribute value equal (ignoring case) to a known namespace literal selects
    /// the grammar for the remainder of the document.
    pub fn detect<'a>(
        &mut self,
        name: &str,
        mut attribute_values: impl Iterator<Item = &'a str>,
    ) -> DocumentState {
        let version = if name == TAG_DATABASE {
            attribute_values.find_map(SchemaVersion::from_namespace)
        } else {
            None
        };

        self.state = match version {
            Some(version) => DocumentState::Recognized(version),
            None => DocumentState::Unrecognized,
        };
        self.state
    }

    pub fn current(&self) -> Option<Region> {
        self.stack.last().copied()
    }

    pub fn tour_kind(&self) -> Option<TourKind> {
        match self.stack.first() {
            Some(Region::Tour(kind)) => Some(*kind),
            _ => None,
        }
    }

    pub fn is_in(&self, region: Region) -> bool {
        self.stack.contains(&region)
    }

    /// Decide what opening `name` means here. Does not change the stack.
    pub fn classify_start(&self, name: &str) -> StartAction {
        let Some(version) = self.version() else {
            return StartAction::Ignore;
        };

        let Some(kind) = self.tour_kind() else {
            return match (version, name) {
                (SchemaVersion::V1, TAG_COURSE) => StartAction::Open(Region::Tour(TourKind::Course)),
                (SchemaVersion::V1, TAG_HISTORY) => {
                    StartAction::Open(Region::Tour(TourKind::History))
                }
                (SchemaVersion::V2, TAG_ACTIVITY) => {
                    StartAction::Open(Region::Tour(TourKind::Activity))
                }
                (SchemaVersion::V2, TAG_COURSE) => StartAction::Open(Region::Tour(TourKind::Course)),
                _ => StartAction::Ignore,
            };
        };

        if self.is_in(Region::Trackpoint) {
            return self.classify_in_trackpoint(version, name);
        }

        if self.current() == Some(Region::Creator) {
            return match name {
                TAG_NAME => StartAction::Leaf(LeafField::CreatorName),
                TAG_CREATOR_VERSION_MAJOR => StartAction::Leaf(LeafField::VersionMajor),
                TAG_CREATOR_VERSION_MINOR => StartAction::Leaf(LeafField::VersionMinor),
                _ => StartAction::Ignore,
            };
        }

        match name {
            TAG_CREATOR => return StartAction::Open(Region::Creator),
            TAG_NOTES => return StartAction::Leaf(LeafField::Notes),
            _ => {}
        }

        let current = self.current();
        match (version, kind) {
            (SchemaVersion::V2, TourKind::Activity) => match (current, name) {
                (Some(Region::Tour(_)), TAG_LAP) => StartAction::Open(Region::Lap),
                (Some(Region::Lap), TAG_TRACK) => StartAction::Open(Region::Track),
                (Some(Region::Lap), TAG_CALORIES) => StartAction::Leaf(LeafField::Calories),
                (Some(Region::Lap), TAG_TPX_AVERAGE_WATTS) => {
                    StartAction::Leaf(LeafField::AverageWatts)
                }
                (Some(Region::Track), TAG_TRACKPOINT) => StartAction::Open(Region::Trackpoint),
                _ => StartAction::Ignore,
            },
            (SchemaVersion::V2, _) => match name {
                TAG_TRACKPOINT => StartAction::Open(Region::Trackpoint),
                TAG_NAME => StartAction::Leaf(LeafField::CourseName),
                _ => StartAction::Ignore,
            },
            (SchemaVersion::V1, _) => match (current, name) {
                (_, TAG_TRACKPOINT) => StartAction::Open(Region::Trackpoint),
                (Some(Region::Tour(_)), TAG_LAP) => StartAction::Open(Region::Lap),
                (Some(Region::Lap), TAG_CALORIES) => StartAction::Leaf(LeafField::Calories),
                _ => StartAction::Ignore,
            },
        }
    }

    fn classify_in_trackpoint(&self, version: SchemaVersion, name: &str) -> StartAction {
        let current = self.current();

        match (current, name) {
            (Some(Region::HeartRate), TAG_VALUE) => {
                return StartAction::Leaf(LeafField::HeartRateValue);
            }
            (Some(Region::Tpx), TAG_TPX_SPEED) => {
                return StartAction::Leaf(LeafField::Speed(Extension::Tpx));
            }
            (Some(Region::Tpx), TAG_TPX_WATTS) => {
                return StartAction::Leaf(LeafField::Power(Extension::Tpx));
            }
            _ => {}
        }

        match name {
            TAG_HEART_RATE_BPM => match version {
                SchemaVersion::V1 => StartAction::Leaf(LeafField::HeartRate),
                SchemaVersion::V2 => StartAction::Open(Region::HeartRate),
            },
            TAG_TPX => StartAction::Open(Region::Tpx),
            TAG_TIME => StartAction::Leaf(LeafField::Time),
            TAG_LATITUDE_DEGREES => StartAction::Leaf(LeafField::Latitude),
            TAG_LONGITUDE_DEGREES => StartAction::Leaf(LeafField::Longitude),
            TAG_ALTITUDE_METERS => StartAction::Leaf(LeafField::Altitude),
            TAG_DISTANCE_METERS => StartAction::Leaf(LeafField::Distance),
            TAG_CADENCE => StartAction::Leaf(LeafField::Cadence),
            TAG_RUN_CADENCE => StartAction::Leaf(LeafField::RunCadence),
            TAG_SENSOR_STATE => StartAction::Leaf(LeafField::SensorState),
            TAG_NS2_SPEED => StartAction::Leaf(LeafField::Speed(Extension::Ns2)),
            TAG_NS3_SPEED => StartAction::Leaf(LeafField::Speed(Extension::Ns3)),
            TAG_NS2_WATTS => StartAction::Leaf(LeafField::Power(Extension::Ns2)),
            TAG_NS3_WATTS => StartAction::Leaf(LeafField::Power(Extension::Ns3)),
            _ => StartAction::Ignore,
        }
    }

    pub fn push(&mut self, region: Region) {
        self.stack.push(region);
    }

    /// Pop the innermost region if `name` closes it.
    pub fn close(&mut self, name: &str) -> Option<Region> {
        let current = self.current().filter(|region| region.tag() == name)?;
        self.stack.pop();
        Some(current)
    }

    /// Regions still open, innermost last
    pub fn open_regions(&self) -> &[Region] {
        &self.stack
    }
}
