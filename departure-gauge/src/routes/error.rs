//! Routes client error types.

use std::fmt;

/// Errors from the routes provider.
///
/// Every variant means the provider could not be used; callers surface them
/// as "provider unavailable" rather than retrying.
#[derive(Debug)]
pub enum RoutesError {
    /// HTTP request failed (network error, timeout, etc.)
    Http(reqwest::Error),

    /// JSON deserialization failed
    Json {
        message: String,
        body: Option<String>,
    },

    /// API returned an error status code or error payload
    ApiError { status: u16, message: String },

    /// Rate limited by the API
    RateLimited,

    /// Invalid API key or unauthorized
    Unauthorized,

    /// Mock data missing or unreadable
    Mock(String),
}

impl fmt::Display for RoutesError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoutesError::Http(e) => write!(f, "HTTP error: {e}"),
            RoutesError::Json { message, body } => {
                write!(f, "JSON parse error: {message}")?;
                if let Some(body) = body {
                    write!(f, " (body: {body})")?;
                }
                Ok(())
            }
            RoutesError::ApiError { status, message } => {
                write!(f, "API error {status}: {message}")
            }
            RoutesError::RateLimited => write!(f, "rate limited by routes API"),
            RoutesError::Unauthorized => write!(f, "unauthorized (invalid API key)"),
            RoutesError::Mock(msg) => write!(f, "mock provider: {msg}"),
        }
    }
}

impl std::error::Error for RoutesError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RoutesError::Http(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for RoutesError {
    fn from(err: reqwest::Error) -> Self {
        RoutesError::Http(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = RoutesError::RateLimited;
        assert_eq!(err.to_string(), "rate limited by routes API");

        let err = RoutesError::ApiError {
            status: 403,
            message: "API key not valid".into(),
        };
        assert_eq!(err.to_string(), "API error 403: API key not valid");

        let err = RoutesError::Json {
            message: "expected value".into(),
            body: Some("<html>".into()),
        };
        assert!(err.to_string().contains("JSON parse error"));
        assert!(err.to_string().contains("<html>"));

        let err = RoutesError::Mock("no fixture".into());
        assert_eq!(err.to_string(), "mock provider: no fixture");
    }
}
