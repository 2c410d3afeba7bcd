//! Service frequency analysis.
//!
//! Estimates the average headway between consecutive departures and flags
//! peak service.

use chrono::{DateTime, Utc};

use crate::domain::{FrequencyProfile, Itinerary, truncate_to_minute, whole_minutes_between};

/// Gaps at or above this many minutes are treated as outliers.
pub const MAX_HEADWAY_MINUTES: i64 = 120;

/// Headway reported when every gap was discarded.
pub const FALLBACK_HEADWAY_MINUTES: f64 = 60.0;

/// Average headways below this many minutes count as peak service.
pub const PEAK_HEADWAY_MINUTES: f64 = 15.0;

const NEXT_DEPARTURES: usize = 3;

/// Analyze departure frequency.
///
/// Gaps are whole minutes between consecutive departures in time order.
/// Zero, negative and outlier gaps are left out of the average.
pub fn analyze(itineraries: &[Itinerary], now: DateTime<Utc>) -> FrequencyProfile {
    if itineraries.len() < 2 {
        return FrequencyProfile {
            average_headway_minutes: 0.0,
            is_peak: false,
            next_departures: itineraries.iter().map(Itinerary::departure_time).collect(),
        };
    }

    let mut departures: Vec<DateTime<Utc>> =
        itineraries.iter().map(Itinerary::departure_time).collect();
    departures.sort();

    let gaps: Vec<i64> = departures
        .windows(2)
        .map(|pair| whole_minutes_between(pair[1], pair[0]))
        .filter(|&gap| gap > 0 && gap < MAX_HEADWAY_MINUTES)
        .collect();

    let average_headway_minutes = if gaps.is_empty() {
        FALLBACK_HEADWAY_MINUTES
    } else {
        gaps.iter().sum::<i64>() as f64 / gaps.len() as f64
    };

    let now = truncate_to_minute(now);
    let next_departures = departures
        .into_iter()
        .filter(|&dep| dep > now)
        .take(NEXT_DEPARTURES)
        .collect();

    FrequencyProfile {
        average_headway_minutes,
        is_peak: average_headway_minutes < PEAK_HEADWAY_MINUTES,
        next_departures,
    }
}
