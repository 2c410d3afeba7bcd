//! Departure scoring.
//!
//! Maps the wait for the next viable departure onto a 0-100 readiness value.
//! The value is computed in four regimes relative to the rider's wait budget
//! `M`; the reported status collapses the last two into `Poor`.
//!
//! | Regime    | Wait `w`          | Value    | Status   |
//! |-----------|-------------------|----------|----------|
//! | Good      | `w <= 0.3M`       | 85..=100 | Good     |
//! | Moderate  | `0.3M < w <= 0.7M`| 40..=85  | Moderate |
//! | Long      | `0.7M < w <= M`   | 20..=40  | Poor     |
//! | VeryLong  | `w > M`           | 0..=20   | Poor     |

use chrono::{DateTime, Utc};

use crate::domain::{Itinerary, ReadinessSignal, Status, truncate_to_minute, wait_minutes};

/// Message when there are no itineraries at all.
pub const NO_TRANSIT_MESSAGE: &str = "No transit available";

/// Message when every itinerary has already departed.
pub const NO_UPCOMING_MESSAGE: &str = "No upcoming departures";

/// Band limits as tenths of the wait budget.
const GOOD_TENTHS: u64 = 3;
const MODERATE_TENTHS: u64 = 7;

fn tenths(max_wait: u32, n: u64) -> f64 {
    f64::from(max_wait) * n as f64 / 10.0
}

/// The regime a wait falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitBand {
    Good,
    Moderate,
    Long,
    VeryLong,
}

impl WaitBand {
    /// Classify a wait against a budget of `max_wait` minutes.
    ///
    /// A non-positive budget makes every wait unacceptable.
    pub fn classify(wait: u32, max_wait: u32) -> Self {
        if max_wait == 0 {
            return WaitBand::VeryLong;
        }
        // Compare in tenths so the limits are exact.
        let w = u64::from(wait) * 10;
        let m = u64::from(max_wait);

        if w <= GOOD_TENTHS * m {
            WaitBand::Good
        } else if w <= MODERATE_TENTHS * m {
            WaitBand::Moderate
        } else if w <= 10 * m {
            WaitBand::Long
        } else {
            WaitBand::VeryLong
        }
    }

    /// Status reported for this regime.
    pub fn status(self) -> Status {
        match self {
            WaitBand::Good => Status::Good,
            WaitBand::Moderate => Status::Moderate,
            WaitBand::Long | WaitBand::VeryLong => Status::Poor,
        }
    }

    /// Range of readiness values this regime produces.
    pub fn value_range(self) -> (f64, f64) {
        match self {
            WaitBand::Good => (85.0, 100.0),
            WaitBand::Moderate => (40.0, 85.0),
            WaitBand::Long => (20.0, 40.0),
            WaitBand::VeryLong => (0.0, 20.0),
        }
    }

    /// Readiness value for `wait` within this regime.
    ///
    /// Only called with the regime `classify` returned, so the budget is
    /// positive for every regime except `VeryLong`.
    fn value(self, wait: u32, max_wait: u32) -> f64 {
        let w = f64::from(wait);
        let m = f64::from(max_wait);

        let good = tenths(max_wait, GOOD_TENTHS);
        let moderate = tenths(max_wait, MODERATE_TENTHS);

        let value = match self {
            WaitBand::Good => 85.0 + 15.0 * (1.0 - w / good),
            WaitBand::Moderate => {
                let progress = (w - good) / (moderate - good);
                40.0 + 45.0 * (1.0 - progress)
            }
            WaitBand::Long => {
                let progress = (w - moderate) / (m - moderate);
                20.0 + 20.0 * (1.0 - progress)
            }
            WaitBand::VeryLong => (20.0 - (w - m)).max(0.0),
        };

        let (lo, hi) = self.value_range();
        value.clamp(lo, hi)
    }

    fn message(self, wait: u32) -> String {
        match self {
            WaitBand::Good if wait == 0 => "Leave now!".to_string(),
            WaitBand::Good => format!("Good time to leave ({wait} min wait)"),
            WaitBand::Moderate => format!("Moderate wait ({wait} min)"),
            WaitBand::Long => format!("Long wait ({wait} min)"),
            WaitBand::VeryLong => format!("Very long wait ({wait} min)"),
        }
    }
}

/// Select the next viable itinerary.
///
/// Itineraries are ordered by departure (stable for ties) and the first one
/// departing strictly after the minute-truncated `now` wins.
pub fn next_departure(itineraries: &[Itinerary], now: DateTime<Utc>) -> Option<&Itinerary> {
    let now = truncate_to_minute(now);
    let mut sorted: Vec<&Itinerary> = itineraries.iter().collect();
    sorted.sort_by_key(|i| i.departure_time());
    sorted.into_iter().find(|i| i.departure_time() > now)
}

/// Score itineraries against a wait budget of `max_wait` minutes.
pub fn score(itineraries: &[Itinerary], max_wait: u32, now: DateTime<Utc>) -> ReadinessSignal {
    if itineraries.is_empty() {
        return ReadinessSignal::unavailable(NO_TRANSIT_MESSAGE);
    }

    let Some(selected) = next_departure(itineraries, now) else {
        return ReadinessSignal::unavailable(NO_UPCOMING_MESSAGE);
    };

    let wait = wait_minutes(selected.departure_time(), truncate_to_minute(now));
    let band = WaitBand::classify(wait, max_wait);

    ReadinessSignal {
        value: band.value(wait, max_wait),
        status: band.status(),
        message: band.message(wait),
        next_departure_time: Some(selected.departure_time()),
        selected_itinerary: Some(selected.clone()),
    }
}
