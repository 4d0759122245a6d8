//! The push-driven decode state machine.

use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tracing::{debug, error, trace, warn};

use super::accumulator::TourAccumulator;
use super::context::{ContextTracker, DocumentState, Region, StartAction};
use super::event::{Attribute, EventSink, XmlEvent};
use super::finalize::finalize_tour;
use super::leaf::{LeafAccumulator, LeafField};
use super::sample_builder::{parse_f32, parse_f64};
use super::tags::{ATTR_SPORT, SENSOR_STATE_PRESENT};
use super::timestamp::parse_timestamp;
use crate::config::ImportOptions;
use crate::types::{ImportMessage, MessageLevel, SchemaVersion, Tour};

/// Everything one document produced
#[derive(Debug, Clone, Default)]
pub struct DecodeOutput {
    pub tours: Vec<Tour>,
    pub messages: Vec<ImportMessage>,
    /// Grammar detected from the root element, `None` when unrecognized
    pub schema_version: Option<SchemaVersion>,
}

impl DecodeOutput {
    /// At least one tour was produced.
    pub fn has_valid_data(&self) -> bool {
        !self.tours.is_empty()
    }

    /// Messages at or above `level`
    pub fn messages_at_least(&self, level: MessageLevel) -> impl Iterator<Item = &ImportMessage> {
        self.messages.iter().filter(move |message| message.level >= level)
    }
}

/// Decoder for one TCX document.
///
/// Feed it events through [`EventSink`] and call [`TcxDecoder::finish`] once the
/// tokenizer reaches the end of the document. All state lives in the value itself,
/// so concurrent documents need one decoder each.
///
/// # Example
///
/// ```rust
/// use tcxtour::decode::{Attribute, EventSink, TcxDecoder};
/// use tcxtour::types::TRAINING_CENTER_DATABASE_V2;
/// use tcxtour::ImportOptions;
///
/// let mut decoder = TcxDecoder::new(ImportOptions::default());
/// decoder.start_element(
///     "TrainingCenterDatabase",
///     &[Attribute::new("xmlns", TRAINING_CENTER_DATABASE_V2)],
/// );
/// decoder.end_element("TrainingCenterDatabase");
///
/// let output = decoder.finish();
/// assert!(!output.has_valid_data());
/// ```
#[derive(Debug)]
pub struct TcxDecoder {
    options: ImportOptions,
    source: Option<PathBuf>,
    context: ContextTracker,
    leaf: LeafAccumulator,
    tour: Option<TourAccumulator>,
    /// Last successfully parsed time of the document
    current_time: Option<DateTime<Utc>>,
    tours: Vec<Tour>,
    messages: Vec<ImportMessage>,
}

impl TcxDecoder {
    pub fn new(options: ImportOptions) -> Self {
        Self {
            options,
            source: None,
            context: ContextTracker::new(),
            leaf: LeafAccumulator::new(),
            tour: None,
            current_time: None,
            tours: Vec::new(),
            messages: Vec::new(),
        }
    }

    /// Label tours and messages with the document they came from.
    pub fn with_source(mut self, source: impl Into<PathBuf>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn state(&self) -> DocumentState {
        self.context.state()
    }

    /// Tours finalized so far, leaving the decoder ready for more.
    pub fn take_tours(&mut self) -> Vec<Tour> {
        std::mem::take(&mut self.tours)
    }

    /// Feed a whole event sequence and finish.
    pub fn run<'a, I>(mut self, events: I) -> DecodeOutput
    where
        I: IntoIterator<Item = XmlEvent<'a>>,
    {
        for event in events {
            self.handle(event);
        }
        self.finish()
    }

    /// End of document.
    pub fn finish(mut self) -> DecodeOutput {
        if let Some(tour) = self.tour.take() {
            let text = format!(
                "{}: document ended inside an open {:?}; {} samples discarded",
                self.label(),
                tour.kind,
                tour.samples.len()
            );
            warn!("{}", text);
            self.messages.push(ImportMessage::warning(text));
        }

        if self.context.state() == DocumentState::Unrecognized {
            debug!(source = %self.label(), "Root element has no known namespace; no tours decoded");
        }

        DecodeOutput {
            tours: self.tours,
            messages: self.messages,
            schema_version: self.context.version(),
        }
    }

    fn label(&self) -> String {
        self.source.as_ref().map_or_else(|| "<memory>".to_string(), |p| p.display().to_string())
    }

    fn open_region(&mut self, region: Region, attributes: &[Attribute]) {
        match region {
            Region::Tour(kind) => {
                let Some(version) = self.context.version() else {
                    return;
                };
                let sport = attributes
                    .iter()
                    .find(|attribute| attribute.name == ATTR_SPORT)
                    .map(|attribute| attribute.value.clone());
                debug!(?kind, %version, ?sport, "Tour opened");
                self.tour = Some(TourAccumulator::new(kind, version, sport));
            }
            Region::Lap => {
                if let Some(tour) = self.tour.as_mut() {
                    tour.open_lap();
                }
            }
            Region::Track => {
                if let Some(tour) = self.tour.as_mut() {
                    tour.open_track();
                }
            }
            Region::Trackpoint => {
                if let Some(tour) = self.tour.as_mut() {
                    tour.open_trackpoint();
                }
            }
            Region::HeartRate | Region::Tpx | Region::Creator => {}
        }
        self.context.push(region);
    }

    fn close_region(&mut self, region: Region) {
        match region {
            Region::Tour(kind) => {
                let Some(acc) = self.tour.take() else {
                    return;
                };
                debug!(?kind, samples = acc.samples.len(), laps = acc.lap_count, "Tour closed");
                let tour =
                    finalize_tour(acc, &self.options, self.source.as_deref(), &mut self.messages);
                if let Some(tour) = tour {
                    self.tours.push(tour);
                }
            }
            Region::Lap => {
                if let Some(tour) = self.tour.as_mut() {
                    tour.close_lap(&mut self.messages);
                }
            }
            Region::Trackpoint => {
                if let Some(tour) = self.tour.as_mut() {
                    tour.seal_trackpoint(self.current_time);
                }
            }
            Region::Track | Region::HeartRate | Region::Tpx | Region::Creator => {}
        }
    }

    fn apply_time(&mut self, text: &str) {
        match parse_timestamp(text) {
            Some(time) => self.current_time = Some(time),
            None => {
                let text = format!(
                    "{}: cannot parse time '{}', keeping previous time",
                    self.label(),
                    text.trim()
                );
                error!(previous = ?self.current_time, "{}", text);
                self.messages.push(ImportMessage::error(text));
            }
        }

        let current = self.current_time;
        if let Some(builder) = self.tour.as_mut().and_then(TourAccumulator::builder_mut) {
            if current.is_some() {
                builder.time = current;
            }
        }
    }

    fn apply_leaf(&mut self, field: LeafField, text: &str) {
        if field == LeafField::Time {
            self.apply_time(text);
            return;
        }

        let ignore_device_speed = self.options.ignore_device_speed;
        let Some(tour) = self.tour.as_mut() else {
            return;
        };

        match field {
            LeafField::Calories => {
                if let Some(kcal) = parse_f32(text) {
                    tour.add_lap_calories(kcal);
                }
                return;
            }
            LeafField::AverageWatts => {
                if let Some(watts) = parse_f32(text) {
                    tour.add_lap_average_watts(watts);
                }
                return;
            }
            LeafField::Notes => {
                tour.notes = Some(text.to_string());
                return;
            }
            LeafField::CreatorName => {
                tour.device.creator_name = Some(text.trim().to_string());
                return;
            }
            LeafField::VersionMajor => {
                tour.device.version_major = Some(text.trim().to_string());
                return;
            }
            LeafField::VersionMinor => {
                tour.device.version_minor = Some(text.trim().to_string());
                return;
            }
            LeafField::CourseName => {
                tour.set_title(text.trim().to_string());
                return;
            }
            LeafField::SensorState => {
                tour.distance_from_sensor = text.trim().eq_ignore_ascii_case(SENSOR_STATE_PRESENT);
                return;
            }
            LeafField::RunCadence => tour.stride_sensor = true,
            _ => {}
        }

        let Some(builder) = tour.builder_mut() else {
            return;
        };

        match field {
            LeafField::Latitude => builder.latitude = parse_f64(text),
            LeafField::Longitude => builder.longitude = parse_f64(text),
            LeafField::Altitude => builder.altitude = parse_f32(text),
            LeafField::Distance => builder.distance = parse_f32(text),
            LeafField::HeartRate | LeafField::HeartRateValue => builder.heart_rate = parse_f32(text),
            LeafField::Cadence | LeafField::RunCadence => builder.cadence = parse_f32(text),
            LeafField::Power(_) => builder.power = parse_f32(text),
            LeafField::Speed(extension) => {
                if ignore_device_speed {
                    trace!(?extension, "Device speed ignored");
                } else {
                    builder.speed = parse_f32(text);
                }
            }
            _ => {}
        }
    }
}

impl EventSink for TcxDecoder {
    fn start_element(&mut self, name: &str, attributes: &[Attribute]) {
        if self.context.state() == DocumentState::Prolog {
            let state =
                self.context.detect(name, attributes.iter().map(|attribute| attribute.value.as_str()));
            debug!(root = name, ?state, "Schema detected");
            return;
        }

        match self.context.classify_start(name) {
            StartAction::Open(region) => self.open_region(region, attributes),
            StartAction::Leaf(field) => self.leaf.open(field),
            StartAction::Ignore => {}
        }
    }

    fn end_element(&mut self, name: &str) {
        if let Some((field, text)) = self.leaf.close(name) {
            self.apply_leaf(field, &text);
            return;
        }

        if let Some(region) = self.context.close(name) {
            self.close_region(region);
        }
    }

    fn characters(&mut self, text: &str) {
        self.leaf.push(text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::tags::*;
    use crate::types::{TRAINING_CENTER_DATABASE_V1, TRAINING_CENTER_DATABASE_V2};
    use chrono::TimeZone;

    fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, h, m, s).unwrap()
    }

    fn root(decoder: &mut TcxDecoder, namespace: &str) {
        decoder.start_element(TAG_DATABASE, &[Attribute::new("xmlns", namespace)]);
    }

    fn leaf(decoder: &mut TcxDecoder, name: &str, text: &str) {
        decoder.start_element(name, &[]);
        decoder.characters(text);
        decoder.end_element(name);
    }

    fn trackpoint(decoder: &mut TcxDecoder, time: &str, leaves: &[(&str, &str)]) {
        decoder.start_element(TAG_TRACKPOINT, &[]);
        leaf(decoder, TAG_TIME, time);
        for (name, text) in leaves {
            leaf(decoder, name, text);
        }
        decoder.end_element(TAG_TRACKPOINT);
    }

    fn open_v2_activity(decoder: &mut TcxDecoder) {
        root(decoder, TRAINING_CENTER_DATABASE_V2);
        decoder.start_element(TAG_ACTIVITY, &[Attribute::new(ATTR_SPORT, "Running")]);
        decoder.start_element(TAG_LAP, &[]);
        decoder.start_element(TAG_TRACK, &[]);
    }

    fn close_v2_activity(decoder: &mut TcxDecoder) {
        decoder.end_element(TAG_TRACK);
        decoder.end_element(TAG_LAP);
        decoder.end_element(TAG_ACTIVITY);
    }

    #[test]
    fn v2_activity_produces_tour() {
        let mut decoder = TcxDecoder::new(ImportOptions::default()).with_source("run.tcx");
        open_v2_activity(&mut decoder);
        trackpoint(&mut decoder, "2024-06-01T08:00:00Z", &[(TAG_DISTANCE_METERS, "0")]);
        trackpoint(&mut decoder, "2024-06-01T08:00:01Z", &[(TAG_DISTANCE_METERS, "3.2")]);
        close_v2_activity(&mut decoder);

        let output = decoder.finish();
        assert_eq!(output.schema_version, Some(SchemaVersion::V2));
        assert_eq!(output.tours.len(), 1);

        let tour = &output.tours[0];
        assert_eq!(tour.samples.len(), 2);
        assert_eq!(tour.start_time, at(8, 0, 0));
        assert_eq!(tour.sport.as_deref(), Some("Running"));
        assert_eq!(tour.import_file.as_deref(), Some(Path::new("run.tcx")));
    }

    #[test]
    fn v1_heart_rate_and_history() {
        let mut decoder = TcxDecoder::new(ImportOptions::default());
        root(&mut decoder, TRAINING_CENTER_DATABASE_V1);
        decoder.start_element(TAG_HISTORY, &[]);
        decoder.start_element(TAG_LAP, &[]);
        trackpoint(&mut decoder, "2024-06-01T08:00:00Z", &[(TAG_HEART_RATE_BPM, "131")]);
        decoder.end_element(TAG_LAP);
        decoder.end_element(TAG_HISTORY);

        let output = decoder.finish();
        assert_eq!(output.tours[0].samples[0].heart_rate, Some(131.0));
        assert_eq!(output.tours[0].schema_version, SchemaVersion::V1);
    }

    #[test]
    fn v2_heart_rate_value_and_extensions() {
        let mut decoder = TcxDecoder::new(ImportOptions::default());
        open_v2_activity(&mut decoder);

        decoder.start_element(TAG_TRACKPOINT, &[]);
        leaf(&mut decoder, TAG_TIME, "2024-06-01T08:00:00Z");
        decoder.start_element(TAG_HEART_RATE_BPM, &[]);
        leaf(&mut decoder, TAG_VALUE, "142");
        decoder.end_element(TAG_HEART_RATE_BPM);
        decoder.start_element(TAG_TPX, &[]);
        leaf(&mut decoder, TAG_TPX_SPEED, "4.5");
        leaf(&mut decoder, TAG_TPX_WATTS, "230");
        decoder.end_element(TAG_TPX);
        leaf(&mut decoder, TAG_RUN_CADENCE, "88");
        leaf(&mut decoder, TAG_SENSOR_STATE, "present");
        decoder.end_element(TAG_TRACKPOINT);

        close_v2_activity(&mut decoder);
        let tour = &decoder.finish().tours[0];
        let sample = &tour.samples[0];
        assert_eq!(sample.heart_rate, Some(142.0));
        assert_eq!(sample.speed, Some(4.5));
        assert_eq!(sample.power, Some(230.0));
        assert_eq!(sample.cadence, Some(88.0));
        assert!(tour.stride_sensor_present);
        assert!(tour.distance_from_sensor);
        assert_eq!(tour.average_power, Some(230.0));
    }

    #[test]
    fn ignore_device_speed_option() {
        let options = ImportOptions::default().with_ignore_device_speed(true);
        let mut decoder = TcxDecoder::new(options);
        open_v2_activity(&mut decoder);
        trackpoint(&mut decoder, "2024-06-01T08:00:00Z", &[(TAG_NS3_SPEED, "3.1"), (TAG_NS3_WATTS, "99")]);
        close_v2_activity(&mut decoder);

        let sample = &decoder.finish().tours[0].samples[0];
        assert_eq!(sample.speed, None);
        assert_eq!(sample.power, Some(99.0));
    }

    #[test]
    fn unparsable_time_keeps_previous_and_logs_error() {
        let mut decoder = TcxDecoder::new(ImportOptions::default());
        open_v2_activity(&mut decoder);
        trackpoint(&mut decoder, "2024-06-01T08:00:00Z", &[(TAG_ALTITUDE_METERS, "400")]);
        trackpoint(&mut decoder, "not a time", &[(TAG_ALTITUDE_METERS, "401")]);
        trackpoint(&mut decoder, "2024-06-01T08:00:02Z", &[(TAG_ALTITUDE_METERS, "402")]);
        close_v2_activity(&mut decoder);

        let output = decoder.finish();
        let errors: Vec<_> = output.messages_at_least(MessageLevel::Error).collect();
        assert_eq!(errors.len(), 1);

        let tour = &output.tours[0];
        // The stale sample shares the previous time and is collapsed into it.
        assert_eq!(tour.samples.len(), 2);
        assert_eq!(tour.samples[0].altitude, Some(400.0));
    }

    #[test]
    fn creator_notes_and_course_title() {
        let options = ImportOptions::default().with_notes(true, true).with_title_truncation(5);
        let mut decoder = TcxDecoder::new(options);
        root(&mut decoder, TRAINING_CENTER_DATABASE_V2);
        decoder.start_element(TAG_COURSE, &[]);
        leaf(&mut decoder, TAG_NAME, "Lakeside");
        decoder.start_element(TAG_CREATOR, &[]);
        leaf(&mut decoder, TAG_NAME, "Edge 500");
        decoder.start_element("Version", &[]);
        leaf(&mut decoder, TAG_CREATOR_VERSION_MAJOR, "3");
        leaf(&mut decoder, TAG_CREATOR_VERSION_MINOR, "30");
        decoder.end_element("Version");
        decoder.end_element(TAG_CREATOR);
        trackpoint(&mut decoder, "2024-06-01T08:00:00Z", &[(TAG_LATITUDE_DEGREES, "47.1"), (TAG_LONGITUDE_DEGREES, "8.2")]);
        leaf(&mut decoder, TAG_NOTES, "Windy evening");
        decoder.end_element(TAG_COURSE);

        let tour = &decoder.finish().tours[0];
        assert_eq!(tour.device.creator_name.as_deref(), Some("Edge 500"));
        assert_eq!(tour.device.firmware_version(), "3.30");
        assert_eq!(tour.title, "Windy");
        assert_eq!(tour.description.as_deref(), Some("Windy evening"));
        assert_eq!(tour.samples[0].position(), Some((47.1, 8.2)));
    }

    #[test]
    fn course_name_becomes_title() {
        let mut decoder = TcxDecoder::new(ImportOptions::default());
        root(&mut decoder, TRAINING_CENTER_DATABASE_V2);
        decoder.start_element(TAG_COURSE, &[]);
        leaf(&mut decoder, TAG_NAME, "Lakeside");
        trackpoint(&mut decoder, "2024-06-01T08:00:00Z", &[(TAG_ALTITUDE_METERS, "1")]);
        decoder.end_element(TAG_COURSE);

        assert_eq!(decoder.finish().tours[0].title, "Lakeside");
    }

    #[test]
    fn later_course_name_replaces_title() {
        let mut decoder = TcxDecoder::new(ImportOptions::default());
        root(&mut decoder, TRAINING_CENTER_DATABASE_V2);
        decoder.start_element(TAG_COURSE, &[]);
        leaf(&mut decoder, TAG_NAME, "Lakeside");
        trackpoint(&mut decoder, "2024-06-01T08:00:00Z", &[(TAG_ALTITUDE_METERS, "1")]);
        decoder.start_element("CoursePoint", &[]);
        leaf(&mut decoder, TAG_NAME, "Summit");
        decoder.end_element("CoursePoint");
        decoder.end_element(TAG_COURSE);

        assert_eq!(decoder.finish().tours[0].title, "Summit");
    }

    #[test]
    fn unrecognized_namespace_yields_nothing() {
        let mut decoder = TcxDecoder::new(ImportOptions::default());
        root(&mut decoder, "http://www.topografix.com/GPX/1/1");
        decoder.start_element(TAG_ACTIVITY, &[]);
        trackpoint(&mut decoder, "2024-06-01T08:00:00Z", &[(TAG_ALTITUDE_METERS, "1")]);
        decoder.end_element(TAG_ACTIVITY);

        let output = decoder.finish();
        assert!(output.tours.is_empty());
        assert!(output.messages.is_empty());
        assert_eq!(output.schema_version, None);
    }

    #[test]
    fn unterminated_tour_is_reported() {
        let mut decoder = TcxDecoder::new(ImportOptions::default());
        open_v2_activity(&mut decoder);
        trackpoint(&mut decoder, "2024-06-01T08:00:00Z", &[(TAG_ALTITUDE_METERS, "1")]);

        let output = decoder.finish();
        assert!(output.tours.is_empty());
        assert_eq!(output.messages[0].level, MessageLevel::Warning);
    }

    #[test]
    fn run_accepts_event_sequence() {
        let attributes = [Attribute::new("xmlns", TRAINING_CENTER_DATABASE_V2)];
        let events = [
            XmlEvent::Start { name: TAG_DATABASE, attributes: &attributes },
            XmlEvent::Start { name: TAG_COURSE, attributes: &[] },
            XmlEvent::Start { name: TAG_TRACKPOINT, attributes: &[] },
            XmlEvent::Start { name: TAG_TIME, attributes: &[] },
            XmlEvent::Text("2024-06-01T08:00:00Z"),
            XmlEvent::End { name: TAG_TIME },
            XmlEvent::Start { name: TAG_DISTANCE_METERS, attributes: &[] },
            XmlEvent::Text("12"),
            XmlEvent::End { name: TAG_DISTANCE_METERS },
            XmlEvent::End { name: TAG_TRACKPOINT },
            XmlEvent::End { name: TAG_COURSE },
            XmlEvent::End { name: TAG_DATABASE },
        ];

        let output = TcxDecoder::new(ImportOptions::default()).run(events);
        assert_eq!(output.tours[0].total_distance(), Some(12.0));
    }
}
