//! Synthetic TCX documents for tests and benches.
//!
//! [`ActivityBuilder`] writes small but structurally faithful documents in either
//! grammar, so tests can describe exactly the trackpoints they need.

#![cfg(any(test, feature = "benchmark"))]

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use std::fmt::Write;

use crate::config::ImportOptions;
use crate::tcx::TcxReader;
use crate::types::{SchemaVersion, Tour};

/// 2024-06-01T08:00:00Z, the start of every generated activity
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).single().unwrap_or_default()
}

/// `base_time()` plus `seconds`
pub fn at_offset(seconds: i64) -> DateTime<Utc> {
    base_time() + TimeDelta::seconds(seconds)
}

/// One trackpoint to write. `None` fields are left out of the document.
#[derive(Debug, Clone, Default)]
pub struct TrackpointSpec {
    /// Raw `Time` text; lets tests write corrupt or sentinel times
    pub time: Option<String>,
    pub position: Option<(f64, f64)>,
    pub altitude: Option<f32>,
    pub distance: Option<f32>,
    pub heart_rate: Option<u32>,
    pub cadence: Option<u32>,
    pub speed: Option<f32>,
    pub power: Option<f32>,
}

impl TrackpointSpec {
    /// Trackpoint at `time` with nothing else recorded
    pub fn time_only(time: DateTime<Utc>) -> Self {
        Self { time: Some(format_time(time)), ..Self::default() }
    }

    /// Trackpoint at `time` with heart rate and distance
    pub fn at(time: DateTime<Utc>, distance: f32) -> Self {
        Self { distance: Some(distance), heart_rate: Some(120), ..Self::time_only(time) }
    }

    pub fn raw_time(text: impl Into<String>) -> Self {
        Self { time: Some(text.into()), ..Self::default() }
    }

    pub fn with_distance(mut self, distance: f32) -> Self {
        self.distance = Some(distance);
        self
    }

    pub fn with_power(mut self, watts: f32) -> Self {
        self.power = Some(watts);
        self
    }

    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = Some(speed);
        self
    }

    pub fn with_position(mut self, latitude: f64, longitude: f64) -> Self {
        self.position = Some((latitude, longitude));
        self
    }
}

#[derive(Debug, Clone, Default)]
struct LapSpec {
    calories: Option<f32>,
    average_watts: Option<f32>,
    tracks: Vec<Vec<TrackpointSpec>>,
}

/// Writes a single-activity TCX document
#[derive(Debug, Clone)]
pub struct ActivityBuilder {
    version: SchemaVersion,
    sport: String,
    notes: Option<String>,
    creator: Option<(String, u32, u32)>,
    laps: Vec<LapSpec>,
}

impl ActivityBuilder {
    pub fn new(version: SchemaVersion) -> Self {
        Self { version, sport: "Biking".to_string(), notes: None, creator: None, laps: Vec::new() }
    }

    pub fn v2() -> Self {
        Self::new(SchemaVersion::V2)
    }

    pub fn v1() -> Self {
        Self::new(SchemaVersion::V1)
    }

    pub fn sport(mut self, sport: &str) -> Self {
        self.sport = sport.to_string();
        self
    }

    pub fn notes(mut self, notes: &str) -> Self {
        self.notes = Some(notes.to_string());
        self
    }

    pub fn creator(mut self, name: &str, major: u32, minor: u32) -> Self {
        self.creator = Some((name.to_string(), major, minor));
        self
    }

    /// Start a new lap with one empty track.
    pub fn lap(mut self, calories: Option<f32>) -> Self {
        self.laps.push(LapSpec { calories, average_watts: None, tracks: vec![Vec::new()] });
        self
    }

    /// Set `AverageWatts` on the current lap.
    pub fn lap_average_watts(mut self, watts: f32) -> Self {
        if let Some(lap) = self.laps.last_mut() {
            lap.average_watts = Some(watts);
        }
        self
    }

    /// Start a new track in the current lap.
    pub fn track(mut self) -> Self {
        if let Some(lap) = self.laps.last_mut() {
            lap.tracks.push(Vec::new());
        }
        self
    }

    /// Append a trackpoint to the current track, opening a lap if needed.
    pub fn point(mut self, point: TrackpointSpec) -> Self {
        if self.laps.is_empty() {
            self = self.lap(None);
        }
        if let Some(track) = self.laps.last_mut().and_then(|lap| lap.tracks.last_mut()) {
            track.push(point);
        }
        self
    }

    pub fn points(self, points: impl IntoIterator<Item = TrackpointSpec>) -> Self {
        points.into_iter().fold(self, Self::point)
    }

    pub fn build(&self) -> String {
        let mut xml = String::with_capacity(256 + self.point_count() * 256);
        let _ = writeln!(xml, r#"<?xml version="1.0" encoding="UTF-8" standalone="no" ?>"#);
        let _ = writeln!(
            xml,
            r#"<TrainingCenterDatabase xmlns="{}" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xmlns:ns3="http://www.garmin.com/xmlschemas/ActivityExtension/v2">"#,
            self.version.namespace()
        );

        match self.version {
            SchemaVersion::V2 => {
                let _ = writeln!(xml, r#"<Activities><Activity Sport="{}">"#, self.sport);
                let _ = writeln!(xml, "<Id>{}</Id>", format_time(base_time()));
                self.write_laps(&mut xml);
                self.write_trailer(&mut xml);
                let _ = writeln!(xml, "</Activity></Activities>");
            }
            SchemaVersion::V1 => {
                let _ = writeln!(xml, r#"<History><{0} Name="{0}"><Run>"#, self.sport);
                self.write_laps(&mut xml);
                self.write_trailer(&mut xml);
                let _ = writeln!(xml, "</Run></{}></History>", self.sport);
            }
        }

        xml.push_str("</TrainingCenterDatabase>\n");
        xml
    }

    fn point_count(&self) -> usize {
        self.laps.iter().flat_map(|lap| &lap.tracks).map(Vec::len).sum()
    }

    fn write_laps(&self, xml: &mut String) {
        for lap in &self.laps {
            let _ = writeln!(xml, r#"<Lap StartTime="{}">"#, format_time(base_time()));
            if let Some(calories) = lap.calories {
                let _ = writeln!(xml, "<Calories>{}</Calories>", calories);
            }
            for track in &lap.tracks {
                xml.push_str("<Track>\n");
                for point in track {
                    self.write_point(xml, point);
                }
                xml.push_str("</Track>\n");
            }
            if let Some(watts) = lap.average_watts {
                let _ = writeln!(
                    xml,
                    "<Extensions><LX><AverageWatts>{}</AverageWatts></LX></Extensions>",
                    watts
                );
            }
            xml.push_str("</Lap>\n");
        }
    }

    fn write_point(&self, xml: &mut String, point: &TrackpointSpec) {
        xml.push_str("<Trackpoint>");
        if let Some(time) = &point.time {
            let _ = write!(xml, "<Time>{}</Time>", time);
        }
        if let Some((lat, lon)) = point.position {
            let _ = write!(
                xml,
                "<Position><LatitudeDegrees>{}</LatitudeDegrees><LongitudeDegrees>{}</LongitudeDegrees></Position>",
                lat, lon
            );
        }
        if let Some(altitude) = point.altitude {
            let _ = write!(xml, "<AltitudeMeters>{}</AltitudeMeters>", altitude);
        }
        if let Some(distance) = point.distance {
            let _ = write!(xml, "<DistanceMeters>{}</DistanceMeters>", distance);
        }
        if let Some(bpm) = point.heart_rate {
            match self.version {
                SchemaVersion::V1 => {
                    let _ = write!(xml, "<HeartRateBpm>{}</HeartRateBpm>", bpm);
                }
                SchemaVersion::V2 => {
                    let _ = write!(xml, "<HeartRateBpm><Value>{}</Value></HeartRateBpm>", bpm);
                }
            }
        }
        if let Some(cadence) = point.cadence {
            let _ = write!(xml, "<Cadence>{}</Cadence>", cadence);
        }
        if point.speed.is_some() || point.power.is_some() {
            xml.push_str("<Extensions><ns3:TPX>");
            if let Some(speed) = point.speed {
                let _ = write!(xml, "<ns3:Speed>{}</ns3:Speed>", speed);
            }
            if let Some(power) = point.power {
                let _ = write!(xml, "<ns3:Watts>{}</ns3:Watts>", power);
            }
            xml.push_str("</ns3:TPX></Extensions>");
        }
        xml.push_str("</Trackpoint>\n");
    }

    fn write_trailer(&self, xml: &mut String) {
        if let Some(notes) = &self.notes {
            let _ = writeln!(xml, "<Notes>{}</Notes>", notes);
        }
        if let Some((name, major, minor)) = &self.creator {
            let _ = writeln!(
                xml,
                "<Creator><Name>{}</Name><Version><VersionMajor>{}</VersionMajor><VersionMinor>{}</VersionMinor></Version></Creator>",
                name, major, minor
            );
        }
    }
}

/// `YYYY-MM-DDTHH:MM:SSZ`
pub fn format_time(time: DateTime<Utc>) -> String {
    time.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// One lap of `samples` trackpoints at 1 s cadence with distance, heart rate and power.
pub fn steady_activity(samples: usize) -> String {
    let points = (0..samples).map(|i| {
        TrackpointSpec::at(at_offset(i as i64), i as f32 * 4.0)
            .with_position(47.0 + i as f64 * 1e-5, 8.5)
            .with_power(200.0)
    });
    ActivityBuilder::v2().lap(Some(0.1)).points(points).build()
}

/// Decoded tour of [`steady_activity`]
pub fn sample_tour(samples: usize) -> Tour {
    let reader = TcxReader::from_bytes(steady_activity(samples.max(1)));
    reader
        .decode(ImportOptions::default())
        .ok()
        .and_then(|output| output.tours.into_iter().next())
        .unwrap_or_else(|| panic!("steady activity of {} samples must decode", samples))
}
