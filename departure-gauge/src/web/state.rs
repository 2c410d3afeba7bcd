//! Application state for the web layer.

use std::sync::Arc;

use crate::gauge::{GaugeConfig, GaugeService};

/// Shared application state.
///
/// Generic over the route provider so the server can run against the live
/// API or mock fixtures.
pub struct AppState<P> {
    /// Gauge service shared by all requests
    pub gauge: Arc<GaugeService<P>>,
}

impl<P> AppState<P> {
    /// Create a new app state.
    pub fn new(provider: P, config: GaugeConfig) -> Self {
        Self {
            gauge: Arc::new(GaugeService::new(provider, config)),
        }
    }
}

impl<P> Clone for AppState<P> {
    fn clone(&self) -> Self {
        Self {
            gauge: Arc::clone(&self.gauge),
        }
    }
}
