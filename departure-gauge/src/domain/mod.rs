//! Domain types for the departure gauge.
//!
//! Itineraries and their steps are immutable value objects produced by the
//! route normalizer; the readiness signal and frequency profile are the
//! outputs the scorer and analyzer compute from them.

mod itinerary;
mod signal;
mod time;

pub use itinerary::{
    Itinerary, LatLng, Step, StepMode, Stop, TransitDetails, TransitStep, UNKNOWN_VEHICLE,
    WalkStep,
};
pub use signal::{DepartureWindow, FrequencyProfile, ReadinessSignal, Status};
pub use time::{
    minutes, parse_duration_minutes, parse_timestamp, parse_timestamp_opt, truncate_to_minute,
    wait_minutes, whole_minutes_between,
};
