//! Wall-clock helpers for query boundaries and timestamp (de)serialization.
//!
//! # Design
//! Query boundaries are computed from the local wall clock and rendered with
//! the local UTC offset (`2025-03-04T08:00:00-05:00`). They are never
//! normalized to UTC: the backend buckets records by local calendar day, so a
//! UTC rendering shifts late-evening queries into the next day.
//!
//! Every helper takes `now` explicitly; `local_now()` is the only place that
//! reads the system clock.

use chrono::{DateTime, Days, FixedOffset, Local, NaiveDate, NaiveDateTime, TimeDelta};

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const INSTANT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%:z";
pub const LOCAL_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

pub fn local_now() -> DateTime<FixedOffset> {
    Local::now().fixed_offset()
}

pub fn local_today() -> NaiveDate {
    local_now().date_naive()
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn format_instant(instant: DateTime<FixedOffset>) -> String {
    instant.format(INSTANT_FORMAT).to_string()
}

pub fn format_local_datetime(value: NaiveDateTime) -> String {
    value.format(LOCAL_DATETIME_FORMAT).to_string()
}

/// Parse an entity timestamp. Accepts naive ISO-8601 (with or without
/// seconds and fractions) and RFC 3339 with an offset, in which case the
/// wall-clock part is kept as-is.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(value) = raw.parse::<NaiveDateTime>() {
        return Some(value);
    }
    if let Ok(value) = DateTime::parse_from_rfc3339(raw) {
        return Some(value.naive_local());
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M").ok()
}

/// Instant window sent as `startTime`/`endTime`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
}

impl TimeRange {
    pub fn new(start: DateTime<FixedOffset>, end: DateTime<FixedOffset>) -> Self {
        Self { start, end }
    }

    /// `None` when the start falls outside the representable range.
    pub fn trailing_hours(now: DateTime<FixedOffset>, hours: i64) -> Option<Self> {
        let start = now.checked_sub_signed(TimeDelta::try_hours(hours)?)?;
        Some(Self::new(start, now))
    }

    pub fn trailing_days(now: DateTime<FixedOffset>, days: i64) -> Option<Self> {
        let start = now.checked_sub_signed(TimeDelta::try_days(days)?)?;
        Some(Self::new(start, now))
    }

    pub fn start_param(&self) -> String {
        format_instant(self.start)
    }

    pub fn end_param(&self) -> String {
        format_instant(self.end)
    }
}

/// Inclusive calendar-date window sent as `startDate`/`endDate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn single(day: NaiveDate) -> Self {
        Self::new(day, day)
    }

    /// The last `days` calendar days ending with `today`. `None` when the
    /// first day precedes the earliest representable date.
    pub fn trailing_days(today: NaiveDate, days: i64) -> Option<Self> {
        let back = u64::try_from(days.saturating_sub(1)).unwrap_or(0);
        let start = today.checked_sub_days(Days::new(back))?;
        Some(Self::new(start, today))
    }

    pub fn start_param(&self) -> String {
        format_date(self.start)
    }

    pub fn end_param(&self) -> String {
        format_date(self.end)
    }
}

/// `#[serde(with = "...")]` adapter for required entity timestamps.
pub mod timestamp {
    use chrono::NaiveDateTime;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&super::format_local_datetime(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(d)?;
        super::parse_timestamp(&raw)
            .ok_or_else(|| de::Error::custom(format!("invalid timestamp: {raw}")))
    }
}

/// `#[serde(with = "...")]` adapter for optional entity timestamps.
pub mod timestamp_opt {
    use chrono::NaiveDateTime;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<NaiveDateTime>,
        s: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(v) => s.serialize_str(&super::format_local_datetime(*v)),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        d: D,
    ) -> Result<Option<NaiveDateTime>, D::Error> {
        match Option::<String>::deserialize(d)? {
            None => Ok(None),
            Some(raw) if raw.trim().is_empty() => Ok(None),
            Some(raw) => super::parse_timestamp(&raw)
                .map(Some)
                .ok_or_else(|| de::Error::custom(format!("invalid timestamp: {raw}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn lima(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<FixedOffset> {
        FixedOffset::west_opt(5 * 3600)
            .unwrap()
            .with_ymd_and_hms(y, m, d, h, min, 0)
            .unwrap()
    }

    #[test]
    fn instants_keep_local_offset() {
        let now = lima(2025, 3, 4, 22, 30);
        assert_eq!(format_instant(now), "2025-03-04T22:30:00-05:00");
    }

    #[test]
    fn late_evening_date_is_not_shifted_to_utc() {
        let now = lima(2025, 3, 4, 23, 59);
        assert_eq!(format_date(now.date_naive()), "2025-03-04");
    }

    #[test]
    fn trailing_days_window() {
        let now = lima(2025, 3, 8, 10, 0);
        let range = TimeRange::trailing_days(now, 7).unwrap();
        assert_eq!(range.start_param(), "2025-03-01T10:00:00-05:00");
        assert_eq!(range.end_param(), "2025-03-08T10:00:00-05:00");
    }

    #[test]
    fn trailing_hours_window_crosses_midnight() {
        let now = lima(2025, 3, 8, 1, 0);
        let range = TimeRange::trailing_hours(now, 24).unwrap();
        assert_eq!(range.start_param(), "2025-03-07T01:00:00-05:00");
    }

    #[test]
    fn trailing_calendar_days_are_inclusive() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 8).unwrap();
        let range = DateRange::trailing_days(today, 7).unwrap();
        assert_eq!(range.start_param(), "2025-03-02");
        assert_eq!(range.end_param(), "2025-03-08");
        assert_eq!(DateRange::trailing_days(today, 1), Some(DateRange::single(today)));
        assert_eq!(DateRange::trailing_days(today, 0), Some(DateRange::single(today)));
    }

    #[test]
    fn oversized_windows_are_rejected() {
        let now = lima(2025, 3, 8, 10, 0);
        assert_eq!(TimeRange::trailing_days(now, i64::MAX), None);
        assert_eq!(TimeRange::trailing_hours(now, i64::MAX), None);
        assert_eq!(TimeRange::trailing_days(now, 400_000_000), None);
        let today = NaiveDate::from_ymd_opt(2025, 3, 8).unwrap();
        assert_eq!(DateRange::trailing_days(today, i64::MAX), None);
        assert_eq!(DateRange::trailing_days(NaiveDate::MIN, 2), None);
    }

    #[test]
    fn parses_naive_and_offset_timestamps() {
        let expected = NaiveDate::from_ymd_opt(2025, 1, 10)
            .unwrap()
            .and_hms_opt(8, 5, 0)
            .unwrap();
        assert_eq!(parse_timestamp("2025-01-10T08:05:00"), Some(expected));
        assert_eq!(parse_timestamp("2025-01-10T08:05"), Some(expected));
        assert_eq!(parse_timestamp("2025-01-10T08:05:00-05:00"), Some(expected));
        assert!(parse_timestamp("2025-01-10T08:05:00.250").is_some());
        assert_eq!(parse_timestamp("yesterday"), None);
    }
}
