//! Trackpoint time parsing.

use chrono::{DateTime, NaiveDateTime, Utc};

const FORMAT_ZULU: &str = "%Y-%m-%dT%H:%M:%SZ";
const FORMAT_ZULU_MILLIS: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";
const FORMAT_OFFSET: &str = "%Y-%m-%dT%H:%M:%S%z";

/// Parse a `Time` leaf.
///
/// Tries a generic ISO-8601 (RFC 3339) parse first, then three fixed layouts:
/// seconds with a literal `Z`, milliseconds with a literal `Z`, and seconds with a
/// numeric offset such as `+0200`. Returns `None` when all four fail.
pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();

    if let Ok(time) = DateTime::parse_from_rfc3339(text) {
        return Some(time.with_timezone(&Utc));
    }

    [FORMAT_ZULU, FORMAT_ZULU_MILLIS]
        .into_iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .map(|naive| naive.and_utc())
        .or_else(|| {
            DateTime::parse_from_str(text, FORMAT_OFFSET).ok().map(|time| time.with_timezone(&Utc))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};
    use proptest::prelude::*;

    #[test]
    fn parses_zulu_time() {
        let expected = Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap();
        assert_eq!(parse_timestamp("2024-06-01T08:00:00Z"), Some(expected));
        assert_eq!(parse_timestamp("  2024-06-01T08:00:00Z\n"), Some(expected));
    }

    #[test]
    fn parses_milliseconds() {
        let time = parse_timestamp("2024-06-01T08:00:00.250Z").unwrap();
        assert_eq!(time.nanosecond(), 250_000_000);
    }

    #[test]
    fn parses_offsets_with_and_without_colon() {
        let expected = Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap();
        assert_eq!(parse_timestamp("2024-06-01T10:00:00+02:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-06-01T10:00:00+0200"), Some(expected));
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_timestamp("yesterday"), None);
        assert_eq!(parse_timestamp("2024-13-01T08:00:00Z"), None);
    }

    proptest! {
        #[test]
        fn prop_zulu_layout_round_trips(secs in 0i64..4_102_444_800) {
            let time = DateTime::from_timestamp(secs, 0).unwrap();
            let text = time.format(FORMAT_ZULU).to_string();
            prop_assert_eq!(parse_timestamp(&text), Some(time));
        }
    }
}
