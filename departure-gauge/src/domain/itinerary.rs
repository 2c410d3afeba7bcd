//! Normalized transit itineraries.
//!
//! An [`Itinerary`] is one point-to-point journey option, built once by the
//! route normalizer and never mutated afterwards. Its steps are a sum type so
//! that transit-only data cannot be reached on a walking step.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Vehicle type used when the provider omits one.
pub const UNKNOWN_VEHICLE: &str = "UNKNOWN";

/// One complete journey option.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Itinerary {
    departure_time: DateTime<Utc>,
    arrival_time: DateTime<Utc>,
    duration_minutes: u32,
    wait_minutes: u32,
    steps: Vec<Step>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    polyline: Option<String>,
}

impl Itinerary {
    /// Create a new itinerary.
    ///
    /// An arrival earlier than the departure is raised to the departure so
    /// that `arrival_time >= departure_time` always holds.
    pub fn new(
        departure_time: DateTime<Utc>,
        arrival_time: DateTime<Utc>,
        duration_minutes: u32,
        wait_minutes: u32,
        steps: Vec<Step>,
        polyline: Option<String>,
    ) -> Self {
        Self {
            departure_time,
            arrival_time: arrival_time.max(departure_time),
            duration_minutes,
            wait_minutes,
            steps,
            polyline,
        }
    }

    pub fn departure_time(&self) -> DateTime<Utc> {
        self.departure_time
    }

    pub fn arrival_time(&self) -> DateTime<Utc> {
        self.arrival_time
    }

    /// Total leg duration as reported by the provider, in minutes.
    pub fn duration_minutes(&self) -> u32 {
        self.duration_minutes
    }

    /// Wait before departure, measured when the itinerary was normalized.
    pub fn wait_minutes(&self) -> u32 {
        self.wait_minutes
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Encoded polyline for the whole itinerary, if the provider sent one.
    pub fn polyline(&self) -> Option<&str> {
        self.polyline.as_deref()
    }

    /// Time spent between departure and arrival.
    pub fn travel_time(&self) -> Duration {
        self.arrival_time.signed_duration_since(self.departure_time)
    }

    /// Number of transit rides in this itinerary.
    pub fn transit_count(&self) -> usize {
        self.steps.iter().filter(|s| s.is_transit()).count()
    }
}

/// Travel mode of a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StepMode {
    Walk,
    Transit,
}

/// One walking or riding segment of an itinerary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "UPPERCASE")]
pub enum Step {
    Walk(WalkStep),
    Transit(TransitStep),
}

impl Step {
    pub fn mode(&self) -> StepMode {
        match self {
            Step::Walk(_) => StepMode::Walk,
            Step::Transit(_) => StepMode::Transit,
        }
    }

    pub fn is_transit(&self) -> bool {
        matches!(self, Step::Transit(_))
    }

    pub fn duration_seconds(&self) -> u32 {
        match self {
            Step::Walk(w) => w.duration_seconds,
            Step::Transit(t) => t.duration_seconds,
        }
    }

    pub fn distance_meters(&self) -> Option<u32> {
        match self {
            Step::Walk(w) => w.distance_meters,
            Step::Transit(t) => t.distance_meters,
        }
    }

    pub fn polyline(&self) -> Option<&str> {
        match self {
            Step::Walk(w) => w.polyline.as_deref(),
            Step::Transit(t) => t.polyline.as_deref(),
        }
    }

    /// Transit details, present only on riding steps.
    pub fn transit_details(&self) -> Option<&TransitDetails> {
        match self {
            Step::Walk(_) => None,
            Step::Transit(t) => Some(&t.details),
        }
    }
}

/// A walking segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalkStep {
    pub duration_seconds: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_meters: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub polyline: Option<String>,
}

/// A segment spent riding a transit vehicle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitStep {
    pub duration_seconds: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_meters: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub polyline: Option<String>,
    #[serde(rename = "transitDetails")]
    pub details: TransitDetails,
}

/// Line, stop and timing data for a transit ride.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitDetails {
    /// Name of the boarding stop.
    pub stop_name: String,
    pub departure_stop: Stop,
    pub arrival_stop: Stop,
    pub line_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_short_name: Option<String>,
    /// Provider vehicle type, e.g. `BUS` or `SUBWAY`.
    pub vehicle_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub departure_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arrival_time: Option<DateTime<Utc>>,
    pub num_stops: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agency_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_color: Option<String>,
}

impl TransitDetails {
    /// Display name for the line, preferring the short name.
    pub fn display_line(&self) -> &str {
        match self.line_short_name.as_deref() {
            Some(short) if !short.is_empty() => short,
            _ => &self.line_name,
        }
    }
}

/// A named stop with coordinates.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Stop {
    pub name: String,
    pub location: LatLng,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}
