//! Repair pipeline run once per closed tour.
//!
//! Order matters: distance resets are repaired on the raw samples, duplicates are
//! collapsed before the date pass so it sees strictly distinct times, and pause
//! trimming runs after the start date is final.

use chrono::{DateTime, TimeDelta, Utc};
use std::path::Path;
use tracing::{debug, info};

use super::accumulator::TourAccumulator;
use crate::config::ImportOptions;
use crate::types::{ImportMessage, Sample, Tour, is_device_default_date};

/// Distance drop that marks a per-lap counter reset, in meters
pub const DISTANCE_RESET_THRESHOLD_M: f32 = 5.0;

/// Gap in milliseconds assumed before the first valid sample when it cannot be
/// estimated
pub const FALLBACK_SLICE_MS: i64 = 8_000;

/// What [`repair_samples`] changed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepairReport {
    pub duplicates_removed: usize,
    /// Index (before duplicate removal) of the first sample whose distance reset
    pub distance_reset_at: Option<usize>,
    /// Number of leading samples moved off the device default date
    pub start_date_repaired: usize,
}

impl RepairReport {
    pub fn is_clean(&self) -> bool {
        *self == Self::default()
    }
}

/// Repair distance resets, collapse duplicate times and back-fill a default-dated
/// prefix, in that order.
///
/// Resets are found on the raw sequence so a lap that restarts its counter on a
/// repeated timestamp is still seen before that duplicate is dropped.
pub fn repair_samples(samples: &mut Vec<Sample>) -> RepairReport {
    let distance_reset_at = find_distance_reset(samples);
    if let Some(from) = distance_reset_at {
        repair_distance_resets(samples, from);
    }
    let duplicates_removed = collapse_duplicates(samples);
    let start_date_repaired = repair_default_start(samples);

    RepairReport { duplicates_removed, distance_reset_at, start_date_repaired }
}

/// First index whose distance drops to zero from a clearly higher predecessor.
fn find_distance_reset(samples: &[Sample]) -> Option<usize> {
    samples.windows(2).position(|pair| is_distance_reset(&pair[0], &pair[1])).map(|i| i + 1)
}

/// Drop every sample whose time equals the retained sample before it, moving its
/// marker onto the retained one when that has none.
fn collapse_duplicates(samples: &mut Vec<Sample>) -> usize {
    let mut kept: Vec<Sample> = Vec::with_capacity(samples.len());
    let mut removed = 0;

    for sample in samples.drain(..) {
        if let Some(last) = kept.last_mut() {
            if last.time == sample.time {
                if last.marker.is_none() && sample.marker.is_some() {
                    last.marker = sample.marker;
                }
                removed += 1;
                continue;
            }
        }
        kept.push(sample);
    }

    *samples = kept;
    removed
}

fn is_distance_reset(previous: &Sample, sample: &Sample) -> bool {
    match (previous.distance, sample.distance) {
        (Some(previous), Some(current)) => {
            current == 0.0 && previous - current > DISTANCE_RESET_THRESHOLD_M
        }
        _ => false,
    }
}

/// From `from` on, every raw zero starts a new segment carried on top of the last
/// repaired distance.
fn repair_distance_resets(samples: &mut [Sample], from: usize) {
    let mut last = samples[..from].iter().rev().find_map(|sample| sample.distance);
    let mut offset = 0.0;

    for sample in &mut samples[from..] {
        let Some(raw) = sample.distance else {
            continue;
        };
        if raw == 0.0 {
            offset = last.unwrap_or(0.0);
        }
        let repaired = raw + offset;
        sample.distance = Some(repaired);
        last = Some(repaired);
    }
}

/// Mean gap of the first run of valid-dated samples.
fn average_slice_duration(valid: &[Sample]) -> TimeDelta {
    let run = valid.iter().take_while(|sample| !is_device_default_date(&sample.time)).count();
    if run < 2 {
        return TimeDelta::milliseconds(FALLBACK_SLICE_MS);
    }

    let span = valid[run - 1].time - valid[0].time;
    let mean_ms = span.num_milliseconds() / (run as i64 - 1);
    if mean_ms <= 0 {
        return TimeDelta::milliseconds(FALLBACK_SLICE_MS);
    }
    TimeDelta::milliseconds(mean_ms)
}

/// Back-fill a leading run of device-default-dated samples from the first valid one.
///
/// The sample right before the first valid time is placed one average slice earlier;
/// each one before it keeps its original spacing to its successor.
fn repair_default_start(samples: &mut [Sample]) -> usize {
    let prefix = samples.iter().take_while(|sample| is_device_default_date(&sample.time)).count();
    if prefix == 0 || prefix == samples.len() {
        return 0;
    }

    let average = average_slice_duration(&samples[prefix..]);
    let original: Vec<DateTime<Utc>> = samples[..prefix].iter().map(|sample| sample.time).collect();
    let mut next = samples[prefix].time;

    for index in (0..prefix).rev() {
        let gap = if index == prefix - 1 { average } else { original[index + 1] - original[index] };
        next -= gap;
        samples[index].time = next;
    }

    prefix
}

/// Tour-wide average power: mean of the lap figures when any lap reported one,
/// otherwise the mean of the recorded sample powers.
fn average_power(acc: &TourAccumulator, samples: &[Sample]) -> Option<f32> {
    if acc.compute_average_power {
        let (sum, count) = samples
            .iter()
            .filter_map(|sample| sample.power)
            .fold((0.0f64, 0usize), |(sum, count), power| (sum + power as f64, count + 1));
        return (count > 0).then(|| (sum / count as f64) as f32);
    }

    (acc.lap_watts_sum > 0.0 && acc.lap_count > 0).then(|| acc.lap_watts_sum / acc.lap_count as f32)
}

/// Route notes into description and/or title.
fn apply_notes(
    notes: Option<String>,
    options: &ImportOptions,
    title: &mut String,
    description: &mut Option<String>,
) {
    let Some(notes) = notes.filter(|notes| !notes.is_empty()) else {
        return;
    };

    if options.import_notes_into_title {
        *title = if options.import_all_notes_into_title {
            notes.clone()
        } else {
            notes.chars().take(options.title_truncation_length).collect()
        };
    }
    if options.import_notes_into_description {
        *description = Some(notes);
    }
}

/// Turn a closed tour into its immutable record, or `None` when it has no samples.
pub fn finalize_tour(
    mut acc: TourAccumulator,
    options: &ImportOptions,
    source: Option<&Path>,
    messages: &mut Vec<ImportMessage>,
) -> Option<Tour> {
    let label = source.map_or_else(|| "<memory>".to_string(), |path| path.display().to_string());

    if acc.samples.is_empty() {
        let text = format!("{}: file contains no valid data", label);
        info!(source = %label, "No samples in tour");
        messages.push(ImportMessage::info(text));
        return None;
    }

    let mut samples = std::mem::take(&mut acc.samples);
    let report = repair_samples(&mut samples);
    debug!(source = %label, ?report, samples = samples.len(), "Repaired samples");

    let start_time = samples[0].time;
    if report.start_date_repaired > 0 {
        let text = format!(
            "{}: {} samples dated 2007-04-01 were re-dated, tour starts at {}",
            label, report.start_date_repaired, start_time
        );
        info!(source = %label, repaired = report.start_date_repaired, %start_time, "Repaired start date");
        messages.push(ImportMessage::info(text));
    }

    let average_power = average_power(&acc, &samples);
    let calories = (acc.calories_kcal * 1000.0).round().max(0.0) as u32;

    let pauses = acc
        .pauses
        .into_intervals()
        .into_iter()
        .filter(|pause| pause.start >= start_time)
        .collect();

    let mut title = acc.title.unwrap_or_default();
    let mut description = None;
    apply_notes(acc.notes, options, &mut title, &mut description);

    Some(Tour {
        start_time,
        samples,
        pauses,
        lap_start_times: acc.lap_start_times,
        calories,
        average_power,
        sport: acc.sport,
        title,
        description,
        device: acc.device,
        distance_from_sensor: acc.distance_from_sensor,
        stride_sensor_present: acc.stride_sensor,
        schema_version: acc.version,
        import_file: source.map(Path::to_path_buf),
    })
}
