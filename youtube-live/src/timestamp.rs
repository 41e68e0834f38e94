//! Wall-clock timestamps as the live broadcast endpoints want them.
//!
//! Request bodies carry times as `yyyy-MM-ddTHH:mm:ss±HH:MM`: local wall-clock time with an
//! explicit signed UTC offset and no sub-second component. Responses come back in RFC 3339
//! (usually `Z`, sometimes with milliseconds), which [`parse`] accepts as well.

use crate::error::YtError;
use jiff::Timestamp;
use jiff::tz::TimeZone;

const WIRE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%:z";

/// Formats `ts` as wall-clock time in `tz`, e.g. `2024-03-09T18:30:00-05:00`.
pub fn format_in(ts: Timestamp, tz: TimeZone) -> String {
    ts.to_zoned(tz).strftime(WIRE_FORMAT).to_string()
}

/// Formats `ts` in the system's local time zone.
pub fn format_local(ts: Timestamp) -> String {
    format_in(ts, TimeZone::system())
}

/// Parses an ISO 8601 timestamp with an explicit offset back into an instant.
pub fn parse(s: &str) -> Result<Timestamp, YtError> {
    s.parse::<Timestamp>()
        .map_err(|e| YtError::message(format!("Parsing data error: invalid timestamp {s:?}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiff::tz::Offset;
    use proptest::prelude::*;

    #[test]
    fn formats_with_signed_offset() {
        let ts: Timestamp = "2024-03-09T23:30:00Z".parse().unwrap();

        let east = TimeZone::fixed(Offset::from_seconds(5 * 3600 + 30 * 60).unwrap());
        assert_eq!(format_in(ts, east), "2024-03-10T05:00:00+05:30");

        let west = TimeZone::fixed(Offset::from_seconds(-(3 * 3600 + 30 * 60)).unwrap());
        assert_eq!(format_in(ts, west), "2024-03-09T20:00:00-03:30");

        assert_eq!(format_in(ts, TimeZone::UTC), "2024-03-09T23:30:00+00:00");
    }

    #[test]
    fn drops_subsecond_precision() {
        let ts: Timestamp = "2024-03-09T23:30:00.987Z".parse().unwrap();
        assert_eq!(format_in(ts, TimeZone::UTC), "2024-03-09T23:30:00+00:00");
    }

    #[test]
    fn parses_api_responses() {
        let ts = parse("2024-03-09T23:30:00.000Z").unwrap();
        assert_eq!(ts, "2024-03-09T23:30:00Z".parse::<Timestamp>().unwrap());
    }

    #[test]
    fn rejects_garbage() {
        let err = parse("next tuesday").unwrap_err();
        assert!(err.to_string().starts_with("Parsing data error"), "{err}");
    }

    proptest! {
        #[test]
        fn round_trips_through_any_offset(
            minute in 0i64..(4_102_444_800 / 60),
            offset_minutes in -(12 * 60)..=(14 * 60i32),
        ) {
            let ts = Timestamp::from_second(minute * 60).unwrap();
            let tz = TimeZone::fixed(Offset::from_seconds(offset_minutes * 60).unwrap());

            let wire = format_in(ts, tz);
            prop_assert_eq!(wire.len(), "yyyy-MM-ddTHH:mm:ss+HH:MM".len());
            prop_assert_eq!(parse(&wire).unwrap(), ts);
        }
    }
}
