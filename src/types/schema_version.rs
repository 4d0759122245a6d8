//! Training Center schema versions

use serde::{Deserialize, Serialize};
use std::fmt;

/// Namespace literal of the version 1 grammar.
pub const TRAINING_CENTER_DATABASE_V1: &str =
    "http://www.garmin.com/xmlschemas/TrainingCenterDatabase/v1";

/// Namespace literal of the version 2 grammar.
pub const TRAINING_CENTER_DATABASE_V2: &str =
    "http://www.garmin.com/xmlschemas/TrainingCenterDatabase/v2";

/// Document grammar detected from the root element's attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SchemaVersion {
    /// `History`/`Course` roots, no `Track` region tracking, heart rate as direct text
    V1,

    /// `Activity`/`Course` roots, laps wrap tracks, heart rate in a `Value` child
    V2,
}

impl SchemaVersion {
    /// Match an attribute value against the known namespace literals (case-insensitive).
    pub fn from_namespace(value: &str) -> Option<Self> {
        if value.eq_ignore_ascii_case(TRAINING_CENTER_DATABASE_V1) {
            Some(SchemaVersion::V1)
        } else if value.eq_ignore_ascii_case(TRAINING_CENTER_DATABASE_V2) {
            Some(SchemaVersion::V2)
        } else {
            None
        }
    }

    /// Namespace literal for this version
    pub fn namespace(self) -> &'static str {
        match self {
            SchemaVersion::V1 => TRAINING_CENTER_DATABASE_V1,
            SchemaVersion::V2 => TRAINING_CENTER_DATABASE_V2,
        }
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaVersion::V1 => f.write_str("v1"),
            SchemaVersion::V2 => f.write_str("v2"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn namespace_detection_ignores_case() {
        assert_eq!(
            SchemaVersion::from_namespace(
                "HTTP://WWW.GARMIN.COM/xmlschemas/TrainingCenterDatabase/V2"
            ),
            Some(SchemaVersion::V2)
        );
        assert_eq!(
            SchemaVersion::from_namespace(TRAINING_CENTER_DATABASE_V1),
            Some(SchemaVersion::V1)
        );
        assert_eq!(SchemaVersion::from_namespace("http://www.topografix.com/GPX/1/1"), None);
    }

    #[test]
    fn namespace_round_trips() {
        for version in [SchemaVersion::V1, SchemaVersion::V2] {
            assert_eq!(SchemaVersion::from_namespace(version.namespace()), Some(version));
        }
    }
}
