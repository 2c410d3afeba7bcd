//! Readiness signal and frequency summary types.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Itinerary;

/// Three-way readiness classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Good,
    Moderate,
    Poor,
}

impl Status {
    /// Traffic-light colour used by gauge widgets.
    pub fn color(self) -> &'static str {
        match self {
            Status::Good => "green",
            Status::Moderate => "orange",
            Status::Poor => "red",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Status::Good => "good",
            Status::Moderate => "moderate",
            Status::Poor => "poor",
        };
        f.write_str(s)
    }
}

/// Whether now is a good time to leave, as a 0-100 value plus status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadinessSignal {
    pub value: f64,
    pub status: Status,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_departure_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_itinerary: Option<Itinerary>,
}

impl ReadinessSignal {
    /// A zero-valued poor signal with no selected itinerary.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            value: 0.0,
            status: Status::Poor,
            message: message.into(),
            next_departure_time: None,
            selected_itinerary: None,
        }
    }
}

/// Service frequency derived from departure headways.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrequencyProfile {
    pub average_headway_minutes: f64,
    pub is_peak: bool,
    pub next_departures: Vec<DateTime<Utc>>,
}

/// A 15-minute slot whose departures keep the average wait within budget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartureWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub average_wait_minutes: f64,
}
