//! Departure windows.
//!
//! Splits the time ahead into 15-minute slots and reports the slots in which
//! leaving keeps the average wait within budget.

use chrono::{DateTime, Duration, Utc};

use crate::domain::{DepartureWindow, Itinerary, truncate_to_minute, wait_minutes};

/// Length of one window in minutes.
pub const WINDOW_STEP_MINUTES: u32 = 15;

/// Find windows within the next `horizon_minutes` whose departures average a
/// wait of at most `max_wait` minutes from the window start.
///
/// Windows are half-open `[start, end)` and returned in time order; windows
/// without departures are skipped.
pub fn departure_windows(
    itineraries: &[Itinerary],
    max_wait: u32,
    horizon_minutes: u32,
    now: DateTime<Utc>,
) -> Vec<DepartureWindow> {
    let now = truncate_to_minute(now);
    let step = Duration::minutes(i64::from(WINDOW_STEP_MINUTES));

    (0..horizon_minutes)
        .step_by(WINDOW_STEP_MINUTES as usize)
        .filter_map(|offset| {
            let start = now + Duration::minutes(i64::from(offset));
            let end = start + step;

            let waits: Vec<u32> = itineraries
                .iter()
                .map(Itinerary::departure_time)
                .filter(|&dep| dep >= start && dep < end)
                .map(|dep| wait_minutes(dep, start))
                .collect();

            if waits.is_empty() {
                return None;
            }

            let average_wait_minutes =
                waits.iter().map(|&w| f64::from(w)).sum::<f64>() / waits.len() as f64;

            (average_wait_minutes <= f64::from(max_wait)).then_some(DepartureWindow {
                start,
                end,
                average_wait_minutes,
            })
        })
        .collect()
}
