//! Time handling for routing-provider data.
//!
//! The provider reports durations as `"<seconds>s"` strings and instants as
//! RFC 3339 timestamps. This module turns both into chrono values and holds
//! the minute arithmetic shared by the normalizer, scorer and scheduler.
//!
//! Every function takes "now" explicitly so callers control the clock.

use chrono::{DateTime, Duration, Timelike, Utc};

const MILLIS_PER_MINUTE: i64 = 60_000;

/// Parse a provider duration string (e.g. `"1234s"`) into whole minutes.
///
/// Seconds are rounded to the nearest minute, halves rounding up. Missing,
/// malformed or negative durations yield 0.
///
/// # Examples
///
/// ```
/// use departure_gauge::domain::parse_duration_minutes;
///
/// assert_eq!(parse_duration_minutes(Some("1234s")), 21);
/// assert_eq!(parse_duration_minutes(Some("90s")), 2);
/// assert_eq!(parse_duration_minutes(Some("89s")), 1);
/// assert_eq!(parse_duration_minutes(None), 0);
/// ```
pub fn parse_duration_minutes(duration: Option<&str>) -> u32 {
    let Some(seconds) = duration.and_then(parse_duration_seconds) else {
        return 0;
    };
    if seconds <= 0 {
        return 0;
    }
    u32::try_from((seconds + 30).div_euclid(60)).unwrap_or(u32::MAX)
}

/// Parse the leading integer of a `"<seconds>s"` string.
///
/// Fractional parts (`"12.5s"`) are ignored, matching how the provider's
/// integer seconds are usually read.
fn parse_duration_seconds(duration: &str) -> Option<i64> {
    let trimmed = duration.trim().trim_end_matches('s');
    let end = trimmed
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || (i == 0 && c == '-')))
        .map_or(trimmed.len(), |(i, _)| i);
    trimmed[..end].parse().ok()
}

/// Parse an RFC 3339 timestamp, falling back to `now`.
///
/// Empty or unparseable input degrades to `now` rather than failing.
pub fn parse_timestamp(timestamp: &str, now: DateTime<Utc>) -> DateTime<Utc> {
    if timestamp.is_empty() {
        return now;
    }
    parse_timestamp_opt(Some(timestamp)).unwrap_or(now)
}

/// Parse an optional RFC 3339 timestamp.
///
/// Returns `None` for missing, empty or unparseable input.
pub fn parse_timestamp_opt(timestamp: Option<&str>) -> Option<DateTime<Utc>> {
    let timestamp = timestamp.filter(|t| !t.is_empty())?;
    match DateTime::parse_from_rfc3339(timestamp) {
        Ok(parsed) => Some(parsed.with_timezone(&Utc)),
        Err(e) => {
            tracing::warn!(%timestamp, error = %e, "invalid timestamp from provider");
            None
        }
    }
}

/// Drop the seconds and sub-second part of an instant.
pub fn truncate_to_minute(now: DateTime<Utc>) -> DateTime<Utc> {
    now.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(now)
}

/// Minutes to wait from `now` until `departure`, rounded, never negative.
///
/// # Examples
///
/// ```
/// use chrono::{Duration, TimeZone, Utc};
/// use departure_gauge::domain::wait_minutes;
///
/// let now = Utc.with_ymd_and_hms(2024, 3, 15, 10, 0, 0).unwrap();
/// assert_eq!(wait_minutes(now + Duration::seconds(90), now), 2);
/// assert_eq!(wait_minutes(now + Duration::seconds(89), now), 1);
/// assert_eq!(wait_minutes(now - Duration::minutes(5), now), 0);
/// ```
pub fn wait_minutes(departure: DateTime<Utc>, now: DateTime<Utc>) -> u32 {
    let diff_ms = departure.signed_duration_since(now).num_milliseconds();
    let minutes = (diff_ms + MILLIS_PER_MINUTE / 2).div_euclid(MILLIS_PER_MINUTE);
    u32::try_from(minutes.max(0)).unwrap_or(u32::MAX)
}

/// Whole minutes from `earlier` to `later`, truncated toward zero.
///
/// Negative when `later` is actually before `earlier`.
pub fn whole_minutes_between(later: DateTime<Utc>, earlier: DateTime<Utc>) -> i64 {
    later.signed_duration_since(earlier).num_minutes()
}

/// Convert whole minutes into a chrono duration.
pub fn minutes(mins: u32) -> Duration {
    Duration::minutes(i64::from(mins))
}
