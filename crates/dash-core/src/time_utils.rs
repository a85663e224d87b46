use chrono::{DateTime, Months, NaiveDate, NaiveDateTime, NaiveTime};
use chrono_tz::Tz;
use tracing::warn;

// ── System timezone detection ─────────────────────────────────────────────────

/// Detect the IANA timezone name of the running system.
///
/// Falls back to `"UTC"` if detection fails.
pub fn get_system_timezone() -> String {
    iana_time_zone::get_timezone().unwrap_or_else(|_| "UTC".to_string())
}

// ── TimezoneHandler ───────────────────────────────────────────────────────────

/// Naive date-time layouts seen in YouTube Studio exports.
const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// Date-only layouts; interpreted as local midnight.
const NAIVE_DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%m/%d/%Y",
    "%b %d, %Y",
    "%d %b %Y",
    "%d-%b-%y",
];

/// Parses export timestamps into wall-clock values of a fixed timezone.
///
/// Naive values are already wall-clock and are kept as written. Values that
/// carry an offset are converted into the configured zone first. Every
/// downstream comparison and day count runs on these naive values, so a DST
/// transition never shortens a day.
pub struct TimezoneHandler {
    default_tz: Tz,
}

impl TimezoneHandler {
    /// Create a handler with the given IANA timezone name as the default.
    ///
    /// If `tz_name` is not a recognised IANA timezone, falls back to UTC
    /// and logs a warning.
    pub fn new(tz_name: &str) -> Self {
        let tz = tz_name.parse::<Tz>().unwrap_or_else(|_| {
            warn!(
                "TimezoneHandler: unrecognised timezone \"{}\", falling back to UTC",
                tz_name
            );
            Tz::UTC
        });
        Self { default_tz: tz }
    }

    /// Parse an RFC 3339 timestamp or one of the naive export layouts into a
    /// wall-clock [`NaiveDateTime`] of the configured timezone.
    ///
    /// Returns `None` for empty strings or unrecognised formats.
    pub fn parse_timestamp(&self, s: &str) -> Option<NaiveDateTime> {
        let s = s.trim();
        if s.is_empty() {
            return None;
        }

        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Some(dt.with_timezone(&self.default_tz).naive_local());
        }

        for fmt in NAIVE_DATETIME_FORMATS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
                return Some(naive);
            }
        }
        for fmt in NAIVE_DATE_FORMATS {
            if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
                return date.and_hms_opt(0, 0, 0);
            }
        }

        None
    }

    /// Validate that `tz_name` is a recognised IANA timezone identifier.
    pub fn validate_timezone(tz_name: &str) -> bool {
        tz_name.parse::<Tz>().is_ok()
    }

    /// Expose the configured default timezone.
    pub fn default_tz(&self) -> Tz {
        self.default_tz
    }
}

impl Default for TimezoneHandler {
    fn default() -> Self {
        Self { default_tz: Tz::UTC }
    }
}

// ── Calendar arithmetic ───────────────────────────────────────────────────────

/// `dt` minus `months` calendar months, clamping the day to the end of the
/// target month (31 March − 1 month = 28/29 February).
pub fn months_before(dt: NaiveDateTime, months: u32) -> NaiveDateTime {
    dt.checked_sub_months(Months::new(months))
        .unwrap_or(NaiveDateTime::MIN)
}

const MILLIS_PER_DAY: i64 = 86_400_000;

/// Whole days from `earlier` to `later`, floored toward negative infinity.
pub fn days_between(later: NaiveDateTime, earlier: NaiveDateTime) -> i64 {
    (later - earlier).num_milliseconds().div_euclid(MILLIS_PER_DAY)
}

// ── Durations ─────────────────────────────────────────────────────────────────

/// Parse an `HH:MM:SS` average-view-duration cell.
pub fn parse_view_duration(s: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(s.trim(), "%H:%M:%S").ok()
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Timelike};

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap()
    }

    // ── TimezoneHandler ──────────────────────────────────────────────────────

    #[test]
    fn test_validate_timezone() {
        assert!(TimezoneHandler::validate_timezone("Europe/Berlin"));
        assert!(!TimezoneHandler::validate_timezone("Mars/Olympus"));
    }

    #[test]
    fn test_new_invalid_timezone_falls_back_to_utc() {
        let handler = TimezoneHandler::new("Not/AZone");
        assert_eq!(handler.default_tz(), Tz::UTC);
    }

    #[test]
    fn test_parse_timestamp_rfc3339() {
        let handler = TimezoneHandler::default();
        assert_eq!(
            handler.parse_timestamp("2022-04-09T15:18:13Z"),
            Some(utc(2022, 4, 9, 15, 18, 13))
        );
        assert_eq!(
            handler.parse_timestamp("2022-04-09T17:18:13+02:00"),
            Some(utc(2022, 4, 9, 15, 18, 13))
        );
    }

    #[test]
    fn test_parse_timestamp_offset_converts_to_wall_clock() {
        let handler = TimezoneHandler::new("America/New_York");
        // EDT is UTC-4 in April.
        assert_eq!(
            handler.parse_timestamp("2022-04-09T15:00:00Z"),
            Some(utc(2022, 4, 9, 11, 0, 0))
        );
    }

    #[test]
    fn test_parse_timestamp_naive_is_kept_as_written() {
        let handler = TimezoneHandler::new("Asia/Kolkata");
        assert_eq!(
            handler.parse_timestamp("2022-04-09 11:00:00"),
            Some(utc(2022, 4, 9, 11, 0, 0))
        );
        assert_eq!(
            handler.parse_timestamp("Mar 1, 2022").map(|t| t.date()),
            NaiveDate::from_ymd_opt(2022, 3, 1)
        );
    }

    #[test]
    fn test_parse_timestamp_date_only_layouts() {
        let handler = TimezoneHandler::default();
        let expected = Some(utc(2021, 3, 5, 0, 0, 0));
        assert_eq!(handler.parse_timestamp("2021-03-05"), expected);
        assert_eq!(handler.parse_timestamp("03/05/2021"), expected);
        assert_eq!(handler.parse_timestamp("Mar 5, 2021"), expected);
        assert_eq!(handler.parse_timestamp("5 Mar 2021"), expected);
    }

    #[test]
    fn test_parse_timestamp_rejects_garbage() {
        let handler = TimezoneHandler::default();
        assert!(handler.parse_timestamp("").is_none());
        assert!(handler.parse_timestamp("yesterday").is_none());
    }

    // ── months_before ────────────────────────────────────────────────────────

    #[test]
    fn test_months_before_simple() {
        assert_eq!(
            months_before(utc(2022, 4, 9, 12, 0, 0), 12),
            utc(2021, 4, 9, 12, 0, 0)
        );
        assert_eq!(
            months_before(utc(2022, 4, 9, 12, 0, 0), 6),
            utc(2021, 10, 9, 12, 0, 0)
        );
    }

    #[test]
    fn test_months_before_clamps_to_month_end() {
        assert_eq!(
            months_before(utc(2022, 3, 31, 0, 0, 0), 1),
            utc(2022, 2, 28, 0, 0, 0)
        );
        assert_eq!(
            months_before(utc(2025, 2, 28, 0, 0, 0), 12),
            utc(2024, 2, 28, 0, 0, 0)
        );
    }

    // ── days_between ─────────────────────────────────────────────────────────

    #[test]
    fn test_days_between_floors_partial_days() {
        let publish = utc(2022, 1, 1, 15, 0, 0);
        assert_eq!(days_between(utc(2022, 1, 2, 0, 0, 0), publish), 0);
        assert_eq!(days_between(utc(2022, 1, 3, 0, 0, 0), publish), 1);
        assert_eq!(days_between(publish + Duration::days(30), publish), 30);
    }

    #[test]
    fn test_days_between_negative_floors_down() {
        let publish = utc(2022, 1, 1, 15, 0, 0);
        // Midnight of the publish day is nine hours before publishing.
        assert_eq!(days_between(utc(2022, 1, 1, 0, 0, 0), publish), -1);
    }

    #[test]
    fn test_days_between_sub_second_negative_gap() {
        let publish = utc(2022, 1, 1, 15, 0, 0);
        assert_eq!(days_between(publish - Duration::milliseconds(300), publish), -1);
    }

    #[test]
    fn test_days_between_across_dst_change() {
        // New York springs forward on 13 March 2022.
        let handler = TimezoneHandler::new("America/New_York");
        let publish = handler.parse_timestamp("Mar 1, 2022").unwrap();
        let later = handler.parse_timestamp("15 Mar 2022").unwrap();
        assert_eq!(days_between(later, publish), 14);
    }

    // ── parse_view_duration ──────────────────────────────────────────────────

    #[test]
    fn test_parse_view_duration() {
        let t = parse_view_duration("01:02:03").unwrap();
        assert_eq!((t.hour(), t.minute(), t.second()), (1, 2, 3));
        assert!(parse_view_duration("0:07:41").is_some());
    }

    #[test]
    fn test_parse_view_duration_rejects_malformed() {
        assert!(parse_view_duration("7:41").is_none());
        assert!(parse_view_duration("abc").is_none());
        assert!(parse_view_duration("00:61:00").is_none());
    }

    #[test]
    fn test_get_system_timezone_returns_nonempty_string() {
        assert!(!get_system_timezone().is_empty());
    }
}
