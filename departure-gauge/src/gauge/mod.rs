//! Departure readiness: scoring, frequency analysis and the service that
//! ties them to a route provider.
//!
//! The scoring functions are pure and take `now` explicitly; only
//! [`GaugeService::compute`] performs I/O.

mod config;
mod frequency;
mod score;
mod service;
mod windows;

pub use config::GaugeConfig;
pub use frequency::{FALLBACK_HEADWAY_MINUTES, MAX_HEADWAY_MINUTES, PEAK_HEADWAY_MINUTES, analyze};
pub use score::{NO_TRANSIT_MESSAGE, NO_UPCOMING_MESSAGE, WaitBand, next_departure, score};
pub use service::{
    FrequencyMeta, GaugeError, GaugeResponse, GaugeService, MAX_WAIT_LIMIT, NO_ROUTES_MESSAGE,
    RouteProvider, TransitRequest,
};
pub use windows::{WINDOW_STEP_MINUTES, departure_windows};
