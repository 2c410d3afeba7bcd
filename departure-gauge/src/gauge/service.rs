//! Gauge service: fetch routes, then score and analyze them.

use std::future::Future;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{DepartureWindow, Itinerary, ReadinessSignal};
use crate::routes::{MockRoutesClient, RoutesClient, RoutesError, RoutesRequest, RoutesResponse, normalize};

use super::config::GaugeConfig;
use super::frequency::analyze;
use super::score::score;
use super::windows::departure_windows;

/// Message reported when the provider returned no usable routes.
pub const NO_ROUTES_MESSAGE: &str = "No transit routes available";

/// Largest accepted wait budget in minutes.
pub const MAX_WAIT_LIMIT: u32 = 120;

/// Error from computing a gauge response.
#[derive(Debug, thiserror::Error)]
pub enum GaugeError {
    /// The request failed validation
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The routing provider could not be reached or refused the request
    #[error("routing provider unavailable: {0}")]
    ProviderUnavailable(#[source] RoutesError),
}

/// Trait for providing transit routes.
///
/// This abstraction allows the service to be tested with mock data.
pub trait RouteProvider {
    /// Compute routes for a request.
    fn compute_routes(
        &self,
        request: &RoutesRequest,
    ) -> impl Future<Output = Result<RoutesResponse, RoutesError>> + Send;
}

impl RouteProvider for RoutesClient {
    fn compute_routes(
        &self,
        request: &RoutesRequest,
    ) -> impl Future<Output = Result<RoutesResponse, RoutesError>> + Send {
        RoutesClient::compute_routes(self, request)
    }
}

impl RouteProvider for MockRoutesClient {
    fn compute_routes(
        &self,
        request: &RoutesRequest,
    ) -> impl Future<Output = Result<RoutesResponse, RoutesError>> + Send {
        MockRoutesClient::compute_routes(self, request)
    }
}

/// Inbound request: where to, and how long the user is willing to wait.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitRequest {
    pub origin: String,
    pub destination: String,
    /// Wait budget in minutes; the configured default applies when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_wait_time: Option<u32>,
}

impl TransitRequest {
    /// Create a new request.
    pub fn new(
        origin: impl Into<String>,
        destination: impl Into<String>,
        max_wait_time: Option<u32>,
    ) -> Self {
        Self {
            origin: origin.into(),
            destination: destination.into(),
            max_wait_time,
        }
    }

    /// Validate the request.
    pub fn validate(&self) -> Result<(), GaugeError> {
        if self.origin.trim().is_empty() {
            return Err(GaugeError::InvalidRequest("origin is required".to_string()));
        }

        if self.destination.trim().is_empty() {
            return Err(GaugeError::InvalidRequest(
                "destination is required".to_string(),
            ));
        }

        if self
            .max_wait_time
            .is_some_and(|max_wait| !(1..=MAX_WAIT_LIMIT).contains(&max_wait))
        {
            return Err(GaugeError::InvalidRequest(format!(
                "maxWaitTime must be between 1 and {MAX_WAIT_LIMIT} minutes"
            )));
        }

        Ok(())
    }
}

/// Frequency summary attached to a response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrequencyMeta {
    pub average_frequency_minutes: f64,
    pub is_peak: bool,
}

/// Outbound signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GaugeResponse {
    pub status: ReadinessSignal,
    /// Leading itineraries in provider order.
    pub routes: Vec<Itinerary>,
    pub frequency_meta: FrequencyMeta,
    /// Upcoming slots that keep the average wait within budget.
    #[serde(default)]
    pub departure_windows: Vec<DepartureWindow>,
}

impl GaugeResponse {
    /// The departure the signal was computed for, if any.
    pub fn next_departure_time(&self) -> Option<DateTime<Utc>> {
        self.status.next_departure_time
    }
}

/// Computes gauge responses using an injected route provider.
#[derive(Debug, Clone)]
pub struct GaugeService<P> {
    provider: P,
    config: GaugeConfig,
}

impl<P> GaugeService<P> {
    /// Create a new service.
    pub fn new(provider: P, config: GaugeConfig) -> Self {
        Self { provider, config }
    }

    pub fn config(&self) -> &GaugeConfig {
        &self.config
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }
}

impl<P: RouteProvider> GaugeService<P> {
    /// Fetch routes for `request` and compute the readiness signal at `now`.
    ///
    /// Only provider failures are errors; an empty or stale route list still
    /// yields a (poor) signal.
    pub async fn compute(
        &self,
        request: &TransitRequest,
        now: DateTime<Utc>,
    ) -> Result<GaugeResponse, GaugeError> {
        request.validate()?;

        let max_wait = request.max_wait_time.unwrap_or(self.config.default_max_wait);
        let routes_request =
            RoutesRequest::transit(request.origin.trim(), request.destination.trim());

        let response = self
            .provider
            .compute_routes(&routes_request)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "failed to fetch transit routes");
                GaugeError::ProviderUnavailable(e)
            })?;

        let itineraries = normalize(&response, now);
        tracing::debug!(
            origin = %request.origin,
            destination = %request.destination,
            count = itineraries.len(),
            "normalized itineraries"
        );

        let status = if itineraries.is_empty() {
            ReadinessSignal::unavailable(NO_ROUTES_MESSAGE)
        } else {
            score(&itineraries, max_wait, now)
        };

        let frequency = analyze(&itineraries, now);
        let windows = departure_windows(&itineraries, max_wait, self.config.window_minutes, now);

        let mut routes = itineraries;
        routes.truncate(self.config.max_routes);

        Ok(GaugeResponse {
            status,
            routes,
            frequency_meta: FrequencyMeta {
                average_frequency_minutes: frequency.average_headway_minutes,
                is_peak: frequency.is_peak,
            },
            departure_windows: windows,
        })
    }
}
