//! Routes API request and response DTOs.
//!
//! These types map directly to the provider's `computeRoutes` JSON. They use
//! `Option` and `#[serde(default)]` liberally because the provider omits
//! fields instead of sending nulls, and a field mask may strip whole objects.

use serde::{Deserialize, Serialize};

/// Request body for `computeRoutes`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutesRequest {
    pub origin: Waypoint,
    pub destination: Waypoint,
    /// Always `TRANSIT` for this application.
    pub travel_mode: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub departure_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compute_alternative_routes: Option<bool>,
}

impl RoutesRequest {
    /// A transit request between two free-form addresses.
    pub fn transit(origin: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            origin: Waypoint::address(origin),
            destination: Waypoint::address(destination),
            travel_mode: "TRANSIT".to_string(),
            departure_time: None,
            compute_alternative_routes: Some(true),
        }
    }
}

/// Origin or destination of a request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Waypoint {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub place_id: Option<String>,
}

impl Waypoint {
    pub fn address(address: impl Into<String>) -> Self {
        Self {
            address: Some(address.into()),
            place_id: None,
        }
    }
}

/// Response from `computeRoutes`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutesResponse {
    /// Route candidates. Absent when the provider found nothing.
    #[serde(default)]
    pub routes: Vec<Route>,

    /// Error payload sent alongside non-success statuses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiErrorBody>,
}

/// Provider error payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub code: i32,
    #[serde(default)]
    pub message: String,
}

/// A route candidate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    /// Legs between waypoints. Only the first is used.
    #[serde(default)]
    pub legs: Vec<RouteLeg>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub polyline: Option<Polyline>,
}

/// The origin-to-destination segment of a route.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteLeg {
    #[serde(default)]
    pub steps: Vec<RouteStep>,
    /// Duration string, e.g. `"1834s"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub polyline: Option<Polyline>,
}

/// One step within a leg.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteStep {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_meters: Option<u32>,
    /// Traffic-aware duration string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    /// Duration ignoring traffic, preferred when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub static_duration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub polyline: Option<Polyline>,
    /// Present only on steps that ride a transit vehicle.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transit_details: Option<RouteTransitDetails>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Polyline {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoded_polyline: Option<String>,
}

/// Transit data attached to a riding step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteTransitDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_details: Option<StopDetails>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transit_line: Option<TransitLine>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_count: Option<u32>,
}

/// Boarding and alighting stops with their times.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StopDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arrival_stop: Option<TransitStop>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub departure_stop: Option<TransitStop>,
    /// RFC 3339 arrival time at `arrival_stop`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arrival_time: Option<String>,
    /// RFC 3339 departure time from `departure_stop`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub departure_time: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitStop {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat_lng: Option<ProviderLatLng>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderLatLng {
    #[serde(default)]
    pub latitude: f64,
    #[serde(default)]
    pub longitude: f64,
}

/// Line operating a transit step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitLine {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_short: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default)]
    pub agencies: Vec<TransitAgency>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vehicle: Option<TransitVehicle>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransitAgency {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransitVehicle {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub vehicle_type: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_sparse_response() {
        let json = r#"{
            "routes": [{
                "legs": [{
                    "duration": "1500s",
                    "steps": [
                        { "staticDuration": "300s", "distanceMeters": 400 },
                        { "transitDetails": { "stopCount": 4 }, "polyline": {} }
                    ],
                    "polyline": {}
                }],
                "polyline": {}
            }]
        }"#;

        let response: RoutesResponse = serde_json::from_str(json).unwrap();
        let leg = &response.routes[0].legs[0];

        assert_eq!(leg.duration.as_deref(), Some("1500s"));
        assert_eq!(leg.steps.len(), 2);
        assert!(leg.steps[0].transit_details.is_none());
        assert_eq!(leg.steps[1].transit_details.as_ref().unwrap().stop_count, Some(4));
        assert_eq!(leg.steps[1].polyline, Some(Polyline::default()));
        assert_eq!(response.routes[0].polyline, Some(Polyline::default()));
    }

    #[test]
    fn deserialize_empty_object() {
        let response: RoutesResponse = serde_json::from_str("{}").unwrap();
        assert!(response.routes.is_empty());
        assert!(response.error.is_none());
    }

    #[test]
    fn transit_request_shape() {
        let request = RoutesRequest::transit("Pike Place Market", "Space Needle");
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["travelMode"], "TRANSIT");
        assert_eq!(json["origin"]["address"], "Pike Place Market");
        assert_eq!(json["computeAlternativeRoutes"], true);
        assert!(json.get("departureTime").is_none());
    }
}
