//! Routes API (transit routing provider) client.
//!
//! This module provides an HTTP client for the provider's `computeRoutes`
//! endpoint and the normalizer that turns its responses into itineraries.
//!
//! Key characteristics of the provider:
//! - Each route carries one leg per waypoint pair; we only request one pair
//! - Durations are `"<seconds>s"` strings, instants are RFC 3339
//! - Walking and riding steps share one shape; only riding steps carry
//!   `transitDetails`

mod client;
mod convert;
mod error;
mod mock;
mod types;

pub use client::{RoutesClient, RoutesConfig};
pub use convert::normalize;
pub use error::RoutesError;
pub use mock::{MockFixture, MockRoutesClient};
pub use types::{
    ApiErrorBody, Location, Polyline, ProviderLatLng, Route, RouteLeg, RouteStep,
    RouteTransitDetails, RoutesRequest, RoutesResponse, StopDetails, TransitAgency, TransitLine,
    TransitStop, TransitVehicle, Waypoint,
};
