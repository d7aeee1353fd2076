//! Indian Standard Time timestamps.
//!
//! HCX protocol headers (`x-hcx-timestamp`) and the FHIR resources built by the stubs carry
//! timestamps at a fixed `+05:30` offset regardless of the host's local zone.

use chrono::{DateTime, FixedOffset, Utc};

/// Offset of Indian Standard Time from UTC, in seconds.
const IST_OFFSET_SECS: i32 = 5 * 3600 + 30 * 60;

/// Returns the fixed `+05:30` offset.
pub fn ist_offset() -> FixedOffset {
    FixedOffset::east_opt(IST_OFFSET_SECS).expect("IST offset is within +/- 24h")
}

/// Current time rendered as `YYYY-MM-DDTHH:MM:SS.mmm+05:30`.
pub fn ist_timestamp() -> String {
    ist_timestamp_at(Utc::now())
}

/// Renders `instant` in IST with millisecond precision.
pub fn ist_timestamp_at(instant: DateTime<Utc>) -> String {
    instant
        .with_timezone(&ist_offset())
        .format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn current_timestamp_ends_with_ist_offset() {
        for _ in 0..10 {
            assert!(ist_timestamp().ends_with("+05:30"));
        }
    }

    #[test]
    fn converts_utc_instant_to_ist_wall_clock() {
        let instant = Utc.with_ymd_and_hms(2024, 3, 31, 20, 45, 0).unwrap();
        assert_eq!(ist_timestamp_at(instant), "2024-04-01T02:15:00.000+05:30");
    }

    #[test]
    fn keeps_millisecond_precision() {
        let instant = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        let rendered = ist_timestamp_at(instant);
        assert!(rendered.contains(".123+05:30"), "{rendered}");
    }

    #[test]
    fn rendered_value_parses_back_to_same_instant() {
        let instant = Utc.with_ymd_and_hms(2025, 1, 15, 9, 0, 0).unwrap();
        let parsed = DateTime::parse_from_rfc3339(&ist_timestamp_at(instant)).unwrap();
        assert_eq!(parsed.with_timezone(&Utc), instant);
    }
}
