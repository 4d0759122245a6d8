//! Inferred device-idle intervals

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Half-open `[start, end)` range during which the device was idle.
///
/// `end` stays `None` when the tour closed while the pause was still open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PauseInterval {
    pub start: DateTime<Utc>,
    pub end: Option<DateTime<Utc>>,
}

impl PauseInterval {
    /// A pause that has not been closed yet
    pub fn open(start: DateTime<Utc>) -> Self {
        Self { start, end: None }
    }

    /// A pause with both bounds known
    pub fn closed(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end: Some(end) }
    }

    pub fn is_open(&self) -> bool {
        self.end.is_none()
    }

    /// Length of a closed pause
    pub fn duration(&self) -> Option<Duration> {
        self.end.map(|end| end - self.start)
    }

    /// Whether `time` lies in `[start, end)`; an open pause extends indefinitely.
    pub fn contains(&self, time: DateTime<Utc>) -> bool {
        time >= self.start && self.end.is_none_or(|end| time < end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn intervals_are_half_open() {
        let start = Utc.with_ymd_and_hms(2024, 6, 1, 8, 5, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 6, 1, 8, 5, 10).unwrap();
        let pause = PauseInterval::closed(start, end);

        assert!(pause.contains(start));
        assert!(!pause.contains(end));
        assert_eq!(pause.duration(), Some(Duration::seconds(10)));
    }

    #[test]
    fn open_interval_has_no_duration() {
        let start = Utc.with_ymd_and_hms(2024, 6, 1, 8, 5, 0).unwrap();
        let pause = PauseInterval::open(start);
        assert!(pause.is_open());
        assert_eq!(pause.duration(), None);
        assert!(pause.contains(start + Duration::hours(3)));
    }
}
