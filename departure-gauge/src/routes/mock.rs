//! Mock routes provider for running without API access.
//!
//! Serves canned `computeRoutes` responses loaded from JSON fixture files or
//! supplied in memory, keyed by origin and destination.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use super::error::RoutesError;
use super::types::{RoutesRequest, RoutesResponse};

/// One canned response, as stored in a fixture file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MockFixture {
    pub origin: String,
    pub destination: String,
    pub response: RoutesResponse,
}

type FixtureKey = (String, String);

fn fixture_key(origin: &str, destination: &str) -> FixtureKey {
    (
        origin.trim().to_lowercase(),
        destination.trim().to_lowercase(),
    )
}

/// Mock routes client that serves fixtures.
#[derive(Clone, Default)]
pub struct MockRoutesClient {
    fixtures: Arc<RwLock<HashMap<FixtureKey, RoutesResponse>>>,
    /// When set, every request fails with this message.
    failure: Option<String>,
    calls: Arc<AtomicUsize>,
}

impl MockRoutesClient {
    /// Create a mock client by loading every `.json` fixture in a directory.
    pub fn new(data_dir: impl AsRef<Path>) -> Result<Self, RoutesError> {
        let fixtures = load_fixtures(data_dir.as_ref())?;
        Ok(Self::from_fixtures(fixtures))
    }

    /// Create a mock client from in-memory fixtures.
    pub fn from_fixtures(fixtures: impl IntoIterator<Item = MockFixture>) -> Self {
        let map = fixtures
            .into_iter()
            .map(|f| (fixture_key(&f.origin, &f.destination), f.response))
            .collect();

        Self {
            fixtures: Arc::new(RwLock::new(map)),
            failure: None,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Create a mock client whose every request fails.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::default()
        }
    }

    /// Serve `response` for `origin` → `destination`, replacing any fixture.
    pub async fn insert(
        &self,
        origin: &str,
        destination: &str,
        response: RoutesResponse,
    ) {
        let mut fixtures = self.fixtures.write().await;
        fixtures.insert(fixture_key(origin, destination), response);
    }

    /// Mimics [`RoutesClient::compute_routes`](super::RoutesClient::compute_routes).
    pub async fn compute_routes(
        &self,
        request: &RoutesRequest,
    ) -> Result<RoutesResponse, RoutesError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(message) = &self.failure {
            return Err(RoutesError::ApiError {
                status: 503,
                message: message.clone(),
            });
        }

        let origin = request.origin.address.as_deref().unwrap_or_default();
        let destination = request.destination.address.as_deref().unwrap_or_default();

        let fixtures = self.fixtures.read().await;
        fixtures
            .get(&fixture_key(origin, destination))
            .cloned()
            .ok_or_else(|| {
                RoutesError::Mock(format!("no fixture for {origin:?} -> {destination:?}"))
            })
    }

    /// Number of requests served so far, failed ones included.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Number of loaded fixtures.
    pub async fn fixture_count(&self) -> usize {
        self.fixtures.read().await.len()
    }

    /// Reload fixtures from disk (useful for development).
    pub async fn reload(&self, data_dir: impl AsRef<Path>) -> Result<(), RoutesError> {
        let loaded = load_fixtures(data_dir.as_ref())?;
        let mut fixtures = self.fixtures.write().await;
        *fixtures = loaded
            .into_iter()
            .map(|f| (fixture_key(&f.origin, &f.destination), f.response))
            .collect();
        Ok(())
    }
}

fn load_fixtures(data_dir: &Path) -> Result<Vec<MockFixture>, RoutesError> {
    let entries = std::fs::read_dir(data_dir).map_err(|e| {
        RoutesError::Mock(format!("failed to read mock data directory: {e}"))
    })?;

    let mut fixtures = Vec::new();

    for entry in entries {
        let entry =
            entry.map_err(|e| RoutesError::Mock(format!("failed to read directory entry: {e}")))?;

        let path = entry.path();
        if !path.is_file() || path.extension().and_then(|s| s.to_str()) != Some("json") {
            continue;
        }

        let json = std::fs::read_to_string(&path)
            .map_err(|e| RoutesError::Mock(format!("failed to read {path:?}: {e}")))?;

        let fixture: MockFixture = serde_json::from_str(&json)
            .map_err(|e| RoutesError::Mock(format!("failed to parse {path:?}: {e}")))?;

        fixtures.push(fixture);
    }

    if fixtures.is_empty() {
        return Err(RoutesError::Mock(format!(
            "no fixture files found in {data_dir:?}"
        )));
    }

    Ok(fixtures)
}
