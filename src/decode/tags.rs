//! Element and attribute names of the Training Center grammars.
//!
//! Names are compared as written in the document (qualified names), so the
//! vendor extension leaves are matched with their customary `ns2:`/`ns3:` prefixes
//! while the `TPX` extension block is matched unprefixed.

pub const TAG_DATABASE: &str = "TrainingCenterDatabase";

pub const TAG_ACTIVITY: &str = "Activity";
pub const TAG_COURSE: &str = "Course";
pub const TAG_HISTORY: &str = "History";

pub const TAG_LAP: &str = "Lap";
pub const TAG_TRACK: &str = "Track";
pub const TAG_TRACKPOINT: &str = "Trackpoint";

pub const TAG_CREATOR: &str = "Creator";
pub const TAG_CREATOR_VERSION_MAJOR: &str = "VersionMajor";
pub const TAG_CREATOR_VERSION_MINOR: &str = "VersionMinor";
pub const TAG_NAME: &str = "Name";
pub const TAG_NOTES: &str = "Notes";
pub const TAG_CALORIES: &str = "Calories";

pub const TAG_TIME: &str = "Time";
pub const TAG_LATITUDE_DEGREES: &str = "LatitudeDegrees";
pub const TAG_LONGITUDE_DEGREES: &str = "LongitudeDegrees";
pub const TAG_ALTITUDE_METERS: &str = "AltitudeMeters";
pub const TAG_DISTANCE_METERS: &str = "DistanceMeters";
pub const TAG_HEART_RATE_BPM: &str = "HeartRateBpm";
pub const TAG_VALUE: &str = "Value";
pub const TAG_CADENCE: &str = "Cadence";
pub const TAG_RUN_CADENCE: &str = "RunCadence";
pub const TAG_SENSOR_STATE: &str = "SensorState";

pub const TAG_NS2_SPEED: &str = "ns2:Speed";
pub const TAG_NS2_WATTS: &str = "ns2:Watts";
pub const TAG_NS3_SPEED: &str = "ns3:Speed";
pub const TAG_NS3_WATTS: &str = "ns3:Watts";

pub const TAG_TPX: &str = "TPX";
pub const TAG_TPX_SPEED: &str = "Speed";
pub const TAG_TPX_WATTS: &str = "Watts";
pub const TAG_TPX_AVERAGE_WATTS: &str = "AverageWatts";

pub const ATTR_SPORT: &str = "Sport";

pub const SENSOR_STATE_PRESENT: &str = "Present";
