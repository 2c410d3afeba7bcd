//! Conversion from Routes API DTOs to domain itineraries.
//!
//! The provider response is heterogeneous: walking and riding steps share one
//! shape, and most nested objects are optional. Conversion never fails;
//! anything missing degrades to a default.

use chrono::{DateTime, Utc};

use crate::domain::{
    Itinerary, LatLng, Step, Stop, TransitDetails, TransitStep, UNKNOWN_VEHICLE, WalkStep,
    minutes, parse_duration_minutes, parse_timestamp, parse_timestamp_opt, wait_minutes,
};

use super::types::{
    Polyline, RouteLeg, RouteStep, RouteTransitDetails, RoutesResponse, TransitStop,
};

/// Convert a `computeRoutes` response into itineraries.
///
/// One itinerary is produced per route, from its first leg; routes without
/// legs are skipped. Order follows the provider's route order.
pub fn normalize(response: &RoutesResponse, now: DateTime<Utc>) -> Vec<Itinerary> {
    response
        .routes
        .iter()
        .enumerate()
        .filter_map(|(idx, route)| {
            let Some(leg) = route.legs.first() else {
                tracing::debug!(route = idx, "skipping route without legs");
                return None;
            };
            let polyline =
                encoded(route.polyline.as_ref()).or_else(|| encoded(leg.polyline.as_ref()));
            Some(convert_leg(leg, polyline, now))
        })
        .collect()
}

/// Convert a single leg into an itinerary.
fn convert_leg(leg: &RouteLeg, polyline: Option<String>, now: DateTime<Utc>) -> Itinerary {
    let first_transit = leg.steps.iter().find_map(|s| s.transit_details.as_ref());
    let last_transit = leg.steps.iter().rev().find_map(|s| s.transit_details.as_ref());

    let duration_minutes = parse_duration_minutes(leg.duration.as_deref());

    // Without a boarding time the itinerary is anchored at `now`, which reads
    // as a zero-minute wait downstream.
    let departure_time = match first_transit.and_then(departure_time_str) {
        Some(ts) => parse_timestamp(ts, now),
        None => now,
    };

    let arrival_time = match last_transit.and_then(arrival_time_str) {
        Some(ts) => parse_timestamp(ts, now),
        None => departure_time + minutes(duration_minutes),
    };

    let steps = leg.steps.iter().map(convert_step).collect();

    Itinerary::new(
        departure_time,
        arrival_time,
        duration_minutes,
        wait_minutes(departure_time, now),
        steps,
        polyline,
    )
}

/// Encoded polyline text, if the provider sent a non-empty one.
fn encoded(polyline: Option<&Polyline>) -> Option<String> {
    polyline?
        .encoded_polyline
        .as_deref()
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn departure_time_str(details: &RouteTransitDetails) -> Option<&str> {
    details.stop_details.as_ref()?.departure_time.as_deref()
}

fn arrival_time_str(details: &RouteTransitDetails) -> Option<&str> {
    details.stop_details.as_ref()?.arrival_time.as_deref()
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.filter(|s| !s.is_empty())
}

/// Convert a provider step into a walking or transit step.
///
/// Durations go through whole minutes before being expressed in seconds, so
/// sub-minute precision is lost.
fn convert_step(step: &RouteStep) -> Step {
    let duration =
        non_empty(step.static_duration.as_deref()).or(non_empty(step.duration.as_deref()));
    let duration_seconds = parse_duration_minutes(duration).saturating_mul(60);
    let polyline = encoded(step.polyline.as_ref());

    match &step.transit_details {
        None => Step::Walk(WalkStep {
            duration_seconds,
            distance_meters: step.distance_meters,
            polyline,
        }),
        Some(details) => Step::Transit(TransitStep {
            duration_seconds,
            distance_meters: step.distance_meters,
            polyline,
            details: convert_transit_details(details),
        }),
    }
}

fn convert_transit_details(details: &RouteTransitDetails) -> TransitDetails {
    let stops = details.stop_details.as_ref();
    let line = details.transit_line.as_ref();

    let departure_stop = convert_stop(stops.and_then(|s| s.departure_stop.as_ref()));
    let arrival_stop = convert_stop(stops.and_then(|s| s.arrival_stop.as_ref()));

    let departure_time = parse_timestamp_opt(stops.and_then(|s| s.departure_time.as_deref()));
    let arrival_time = parse_timestamp_opt(stops.and_then(|s| s.arrival_time.as_deref()));
    // Keep arrival >= departure when both are known.
    let arrival_time = match (departure_time, arrival_time) {
        (Some(dep), Some(arr)) => Some(arr.max(dep)),
        (_, arr) => arr,
    };

    TransitDetails {
        stop_name: departure_stop.name.clone(),
        departure_stop,
        arrival_stop,
        line_name: line.map(|l| l.name.clone()).unwrap_or_default(),
        line_short_name: line.and_then(|l| l.name_short.clone()),
        vehicle_type: line
            .and_then(|l| l.vehicle.as_ref())
            .and_then(|v| v.vehicle_type.clone())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| UNKNOWN_VEHICLE.to_string()),
        departure_time,
        arrival_time,
        num_stops: details.stop_count.unwrap_or(0),
        agency_name: line
            .and_then(|l| l.agencies.first())
            .map(|a| a.name.clone()),
        line_color: line.and_then(|l| l.color.clone()),
    }
}

fn convert_stop(stop: Option<&TransitStop>) -> Stop {
    let Some(stop) = stop else {
        return Stop::default();
    };
    let location = stop
        .location
        .as_ref()
        .and_then(|l| l.lat_lng)
        .map(|ll| LatLng {
            lat: ll.latitude,
            lng: ll.longitude,
        })
        .unwrap_or_default();

    Stop {
        name: stop.name.clone(),
        location,
    }
}
