//! Data transfer objects for the web API.
//!
//! Requests and successful responses reuse [`TransitRequest`] and
//! [`GaugeResponse`] directly; only errors have a web-specific shape.
//!
//! [`TransitRequest`]: crate::gauge::TransitRequest
//! [`GaugeResponse`]: crate::gauge::GaugeResponse

use serde::{Deserialize, Serialize};

/// Code attached to errors caused by the routing provider.
pub const EXTERNAL_API_ERROR: &str = "EXTERNAL_API_ERROR";

/// Error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,

    /// Machine-readable error code
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: None,
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }
}
