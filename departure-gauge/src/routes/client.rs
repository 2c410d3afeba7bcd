//! Routes API HTTP client.
//!
//! Issues `computeRoutes` requests with API-key authentication and a field
//! mask limiting the response to what the normalizer reads.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use super::error::RoutesError;
use super::types::{RoutesRequest, RoutesResponse};

/// Default endpoint for `computeRoutes`.
const DEFAULT_BASE_URL: &str = "https://routes.googleapis.com/directions/v2:computeRoutes";

/// Fields requested from the provider.
const DEFAULT_FIELD_MASK: &str = concat!(
    "routes.legs.steps.transitDetails,",
    "routes.legs.steps.staticDuration,",
    "routes.legs.steps.duration,",
    "routes.legs.steps.distanceMeters,",
    "routes.legs.steps.polyline,",
    "routes.legs.duration,",
    "routes.legs.polyline,",
    "routes.polyline"
);

/// Configuration for the routes client.
#[derive(Debug, Clone)]
pub struct RoutesConfig {
    /// API key sent as `X-Goog-Api-Key`
    pub api_key: String,
    /// Endpoint URL (defaults to production)
    pub base_url: String,
    /// Value of the `X-Goog-FieldMask` header
    pub field_mask: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl RoutesConfig {
    /// Create a new config with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            field_mask: DEFAULT_FIELD_MASK.to_string(),
            timeout_secs: 30,
        }
    }

    /// Set a custom endpoint URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the response field mask.
    pub fn with_field_mask(mut self, mask: impl Into<String>) -> Self {
        self.field_mask = mask.into();
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// Routes API client.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct RoutesClient {
    http: reqwest::Client,
    base_url: String,
}

impl RoutesClient {
    /// Create a new client with the given configuration.
    pub fn new(config: RoutesConfig) -> Result<Self, RoutesError> {
        let mut headers = HeaderMap::new();

        let api_key =
            HeaderValue::from_str(&config.api_key).map_err(|_| RoutesError::ApiError {
                status: 0,
                message: "Invalid API key format".to_string(),
            })?;
        headers.insert(HeaderName::from_static("x-goog-api-key"), api_key);

        let field_mask =
            HeaderValue::from_str(&config.field_mask).map_err(|_| RoutesError::ApiError {
                status: 0,
                message: "Invalid field mask".to_string(),
            })?;
        headers.insert(HeaderName::from_static("x-goog-fieldmask"), field_mask);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url,
        })
    }

    /// Compute transit routes for a request.
    ///
    /// Non-success statuses and error payloads become [`RoutesError`]s; an
    /// empty route list is a successful response.
    pub async fn compute_routes(
        &self,
        request: &RoutesRequest,
    ) -> Result<RoutesResponse, RoutesError> {
        tracing::debug!(
            origin = ?request.origin.address,
            destination = ?request.destination.address,
            "requesting routes"
        );

        let response = self.http.post(&self.base_url).json(request).send().await?;

        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(RoutesError::Unauthorized);
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(RoutesError::RateLimited);
        }

        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<RoutesResponse>(&body)
                .ok()
                .and_then(|r| r.error)
                .map(|e| e.message)
                .filter(|m| !m.is_empty())
                .unwrap_or(body);
            tracing::error!(status = status.as_u16(), %message, "routes API error");
            return Err(RoutesError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: RoutesResponse =
            serde_json::from_str(&body).map_err(|e| RoutesError::Json {
                message: e.to_string(),
                body: Some(body.chars().take(500).collect()),
            })?;

        if let Some(error) = parsed.error {
            return Err(RoutesError::ApiError {
                status: status.as_u16(),
                message: error.message,
            });
        }

        Ok(parsed)
    }
}
