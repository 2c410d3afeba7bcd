//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::{Method, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::Utc;
use tower_http::cors::{Any, CorsLayer};

use crate::gauge::{GaugeError, RouteProvider, TransitRequest};

use super::dto::{EXTERNAL_API_ERROR, ErrorResponse};
use super::state::AppState;

/// Response header carrying the average headway in minutes.
pub const FREQUENCY_HEADER: &str = "x-transit-frequency";

/// Response header carrying whether service is at peak frequency.
pub const PEAK_HOURS_HEADER: &str = "x-transit-peak-hours";

/// Create the application router.
pub fn create_router<P>(state: AppState<P>) -> Router
where
    P: RouteProvider + Send + Sync + 'static,
{
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/health", get(health))
        .route(
            "/api/routes/transit",
            post(transit_routes::<P>).options(preflight),
        )
        .layer(cors)
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Bare OPTIONS requests; real preflights are answered by the CORS layer.
async fn preflight() -> StatusCode {
    StatusCode::OK
}

/// Compute the readiness signal for a transit search.
///
/// Frequency metadata is also exposed as response headers.
async fn transit_routes<P>(
    State(state): State<AppState<P>>,
    body: Result<Json<TransitRequest>, JsonRejection>,
) -> Result<Response, AppError>
where
    P: RouteProvider + Send + Sync + 'static,
{
    let Json(request) = body.map_err(|e| AppError::BadRequest {
        message: format!("Invalid request: {}", e.body_text()),
    })?;

    let response = state.gauge.compute(&request, Utc::now()).await?;

    let headers = [
        (
            FREQUENCY_HEADER,
            response.frequency_meta.average_frequency_minutes.to_string(),
        ),
        (PEAK_HOURS_HEADER, response.frequency_meta.is_peak.to_string()),
    ];

    Ok((headers, Json(response)).into_response())
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    BadGateway { message: String },
}

impl From<GaugeError> for AppError {
    fn from(e: GaugeError) -> Self {
        match e {
            GaugeError::InvalidRequest(message) => AppError::BadRequest { message },
            GaugeError::ProviderUnavailable(_) => AppError::BadGateway {
                message: e.to_string(),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::BadRequest { message } => {
                tracing::debug!(%message, "rejected request");
                (StatusCode::BAD_REQUEST, ErrorResponse::new(message))
            }
            AppError::BadGateway { message } => {
                tracing::error!(%message, "upstream failure");
                (
                    StatusCode::BAD_GATEWAY,
                    ErrorResponse::new(message).with_code(EXTERNAL_API_ERROR),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
