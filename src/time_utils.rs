// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time parsing and formatting.

use chrono::{DateTime, NaiveDateTime};

/// Timestamp layout used by the workout export (`2022-11-13 10:48:33`).
pub const EXPORT_DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Layout of Strava's `start_date_local` (`2022-11-13T10:48:33Z`).
pub const ACTIVITY_DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Parse an export timestamp.
pub fn parse_export_date_time(raw: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(raw.trim(), EXPORT_DATE_TIME_FORMAT)
}

/// Format a local wall-clock time the way Strava reports `start_date_local`,
/// always with a `Z` suffix and whole seconds.
pub fn format_activity_date_time(date: NaiveDateTime) -> String {
    date.format(ACTIVITY_DATE_TIME_FORMAT).to_string()
}

/// Re-render a remote start time in the canonical activity layout.
///
/// Accepts RFC 3339 (any offset, optional fraction) and naive ISO-8601
/// values; the wall-clock fields are kept and the offset dropped, since
/// `start_date_local` is already local time. Unparseable input is returned
/// unchanged.
pub fn canonical_activity_date_time(raw: &str) -> String {
    if let Ok(date) = DateTime::parse_from_rfc3339(raw) {
        return format_activity_date_time(date.naive_local());
    }

    for layout in ["%Y-%m-%dT%H:%M:%S%.f", EXPORT_DATE_TIME_FORMAT] {
        if let Ok(date) = NaiveDateTime::parse_from_str(raw, layout) {
            return format_activity_date_time(date);
        }
    }

    raw.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_to_activity_format() {
        let date = parse_export_date_time("2022-11-13 10:48:33").unwrap();
        assert_eq!(format_activity_date_time(date), "2022-11-13T10:48:33Z");
    }

    #[test]
    fn test_parse_export_rejects_other_layouts() {
        assert!(parse_export_date_time("Nov 13 2022").is_err());
        assert!(parse_export_date_time("").is_err());
    }

    #[test]
    fn test_canonical_keeps_canonical_values() {
        assert_eq!(
            canonical_activity_date_time("2022-11-14T07:15:24Z"),
            "2022-11-14T07:15:24Z"
        );
    }

    #[test]
    fn test_canonical_normalizes_offsets_and_fractions() {
        assert_eq!(
            canonical_activity_date_time("2022-11-14T07:15:24.000+00:00"),
            "2022-11-14T07:15:24Z"
        );
        assert_eq!(
            canonical_activity_date_time("2022-11-14T07:15:24-05:00"),
            "2022-11-14T07:15:24Z"
        );
        assert_eq!(
            canonical_activity_date_time("2022-11-14T07:15:24"),
            "2022-11-14T07:15:24Z"
        );
    }

    #[test]
    fn test_canonical_passes_through_garbage() {
        assert_eq!(canonical_activity_date_time("yesterday"), "yesterday");
    }
}
