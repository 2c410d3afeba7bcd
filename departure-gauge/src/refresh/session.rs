//! Polling session for one origin/destination search.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, mpsc, watch};

use crate::gauge::{GaugeError, GaugeResponse, GaugeService, RouteProvider, TransitRequest};

use super::scheduler::{RefreshConfig, RefreshError, RefreshScheduler};

/// Error from a session refresh.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// A refresh is already in flight for this session
    #[error("a refresh is already in progress")]
    Busy,

    /// The session was stopped
    #[error("session stopped")]
    Stopped,

    #[error(transparent)]
    Gauge(#[from] GaugeError),
}

/// Latest outcome of a session.
#[derive(Debug, Default)]
struct Snapshot {
    response: Option<GaugeResponse>,
    error: Option<String>,
}

/// Clears the loading flag when dropped, so a cancelled refresh does not
/// leave the session busy.
struct LoadingGuard<'a>(&'a AtomicBool);

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// One search (origin, destination, wait budget) with its own refresh
/// scheduler and last result.
///
/// At most one fetch is in flight at a time; the scheduler is re-armed from
/// each result's next departure.
pub struct GaugeSession<P> {
    service: Arc<GaugeService<P>>,
    request: TransitRequest,
    scheduler: Mutex<RefreshScheduler>,
    ticks: Mutex<mpsc::Receiver<()>>,
    snapshot: Mutex<Snapshot>,
    loading: AtomicBool,
    stopped: watch::Sender<bool>,
}

impl<P: RouteProvider + Send + Sync> GaugeSession<P> {
    /// Create a session. Polling starts with the first [`refresh`](Self::refresh).
    pub fn new(service: Arc<GaugeService<P>>, request: TransitRequest, config: RefreshConfig) -> Self {
        // A single pending tick is enough; extra firings coalesce
        let (tx, rx) = mpsc::channel(1);
        let scheduler = RefreshScheduler::new(config, move || {
            let result = match tx.try_send(()) {
                Ok(()) | Err(mpsc::error::TrySendError::Full(())) => Ok(()),
                Err(mpsc::error::TrySendError::Closed(())) => Err(RefreshError::ChannelClosed),
            };
            std::future::ready(result)
        });

        Self {
            service,
            request,
            scheduler: Mutex::new(scheduler),
            ticks: Mutex::new(rx),
            snapshot: Mutex::new(Snapshot::default()),
            loading: AtomicBool::new(false),
            stopped: watch::Sender::new(false),
        }
    }

    pub fn request(&self) -> &TransitRequest {
        &self.request
    }

    /// Whether a fetch is currently in flight.
    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    pub fn is_stopped(&self) -> bool {
        *self.stopped.borrow()
    }

    /// Most recent successful response.
    pub async fn last_response(&self) -> Option<GaugeResponse> {
        self.snapshot.lock().await.response.clone()
    }

    /// Message of the most recent failed refresh, cleared on success.
    pub async fn last_error(&self) -> Option<String> {
        self.snapshot.lock().await.error.clone()
    }

    /// Whether polling is enabled and the refresh timer is armed.
    pub async fn is_polling(&self) -> bool {
        let scheduler = self.scheduler.lock().await;
        scheduler.is_enabled() && scheduler.is_running()
    }

    /// Fetch and score once, then re-arm the scheduler.
    ///
    /// On failure the previous response is kept and the scheduler is
    /// re-armed from its next departure so polling continues.
    pub async fn refresh(&self, now: DateTime<Utc>) -> Result<GaugeResponse, SessionError> {
        if self.is_stopped() {
            return Err(SessionError::Stopped);
        }
        if self.loading.swap(true, Ordering::SeqCst) {
            return Err(SessionError::Busy);
        }
        let _loading = LoadingGuard(&self.loading);

        let result = self.service.compute(&self.request, now).await;

        let next = {
            let mut snapshot = self.snapshot.lock().await;
            match &result {
                Ok(response) => {
                    tracing::info!(
                        origin = %self.request.origin,
                        destination = %self.request.destination,
                        status = %response.status.status,
                        value = response.status.value,
                        "gauge refreshed"
                    );
                    snapshot.response = Some(response.clone());
                    snapshot.error = None;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "gauge refresh failed");
                    snapshot.error = Some(e.to_string());
                }
            }
            snapshot
                .response
                .as_ref()
                .and_then(GaugeResponse::next_departure_time)
        };

        if !self.is_stopped() {
            let mut scheduler = self.scheduler.lock().await;
            if !scheduler.set_next_departure(next, now) {
                scheduler.start(now);
            }
        }

        result.map_err(SessionError::from)
    }

    /// Wait for the scheduler to fire.
    pub async fn next_tick(&self) -> Result<(), SessionError> {
        let mut stopped = self.stopped.subscribe();
        let mut ticks = self.ticks.lock().await;

        tokio::select! {
            tick = ticks.recv() => tick.ok_or(SessionError::Stopped),
            _ = async {
                let _ = stopped.wait_for(|s| *s).await;
            } => Err(SessionError::Stopped),
        }
    }

    /// Stop polling. Pending [`next_tick`](Self::next_tick) calls return
    /// [`SessionError::Stopped`].
    pub async fn stop(&self) {
        self.stopped.send_replace(true);
        self.scheduler.lock().await.set_enabled(false, Utc::now());
        tracing::debug!(origin = %self.request.origin, "session stopped");
    }

    /// Refresh, report, wait for the next tick, repeat until stopped.
    ///
    /// Provider failures are reported and polling continues; an invalid
    /// request ends the loop with its error.
    pub async fn run<F>(&self, mut on_update: F) -> Result<(), SessionError>
    where
        F: FnMut(&Result<GaugeResponse, SessionError>),
    {
        loop {
            let result = self.refresh(Utc::now()).await;
            if matches!(result, Err(SessionError::Stopped)) {
                return Ok(());
            }

            on_update(&result);

            if let Err(SessionError::Gauge(GaugeError::InvalidRequest(_))) = result {
                self.stop().await;
                return result.map(|_| ());
            }

            match self.next_tick().await {
                Ok(()) => {}
                Err(SessionError::Stopped) => return Ok(()),
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Status;
    use crate::gauge::GaugeConfig;
    use crate::routes::{
        MockFixture, MockRoutesClient, Route, RouteLeg, RouteStep, RouteTransitDetails, RoutesError,
        RoutesRequest, RoutesResponse, StopDetails,
    };
    use chrono::{Duration as ChronoDuration, TimeZone};
    use std::future::Future;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 10, 0, 0).unwrap()
    }

    fn response_departing_in(mins: i64) -> RoutesResponse {
        let dep = now() + ChronoDuration::minutes(mins);
        RoutesResponse {
            routes: vec![Route {
                legs: vec![RouteLeg {
                    steps: vec![RouteStep {
                        transit_details: Some(RouteTransitDetails {
                            stop_details: Some(StopDetails {
                                departure_time: Some(dep.to_rfc3339()),
                                ..Default::default()
                            }),
                            ..Default::default()
                        }),
                        ..Default::default()
                    }],
                    duration: Some("900s".to_string()),
                    polyline: None,
                }],
                polyline: None,
            }],
            error: None,
        }
    }

    fn mock_with(response: RoutesResponse) -> MockRoutesClient {
        MockRoutesClient::from_fixtures(vec![MockFixture {
            origin: "Home".to_string(),
            destination: "Work".to_string(),
            response,
        }])
    }

    fn session<P: RouteProvider + Send + Sync>(provider: P, base_secs: u64) -> GaugeSession<P> {
        GaugeSession::new(
            Arc::new(GaugeService::new(provider, GaugeConfig::default())),
            TransitRequest::new("Home", "Work", Some(20)),
            RefreshConfig::new(base_secs),
        )
    }

    /// Provider that takes a while to answer.
    struct SlowProvider {
        calls: AtomicUsize,
    }

    impl RouteProvider for SlowProvider {
        fn compute_routes(
            &self,
            _request: &RoutesRequest,
        ) -> impl Future<Output = Result<RoutesResponse, RoutesError>> + Send {
            self.calls.fetch_add(1, Ordering::SeqCst);
            async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(RoutesResponse::default())
            }
        }
    }

    /// Provider that fails on demand.
    struct FlakyProvider {
        inner: MockRoutesClient,
        fail: AtomicBool,
    }

    impl RouteProvider for FlakyProvider {
        fn compute_routes(
            &self,
            request: &RoutesRequest,
        ) -> impl Future<Output = Result<RoutesResponse, RoutesError>> + Send {
            let fail = self.fail.load(Ordering::SeqCst);
            let inner = self.inner.clone();
            let request = request.clone();
            async move {
                if fail {
                    return Err(RoutesError::ApiError {
                        status: 503,
                        message: "unavailable".to_string(),
                    });
                }
                inner.compute_routes(&request).await
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn refresh_records_response_and_arms_timer() {
        let session = session(mock_with(response_departing_in(5)), 60);
        let response = session.refresh(now()).await.unwrap();

        assert_eq!(response.status.status, Status::Good);
        assert_eq!(session.last_response().await, Some(response));
        assert!(session.last_error().await.is_none());
        assert!(session.is_polling().await);
        assert!(!session.is_loading());
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_refresh_is_busy() {
        let provider = SlowProvider {
            calls: AtomicUsize::new(0),
        };
        let session = session(provider, 60);

        let (first, second) = tokio::join!(session.refresh(now()), session.refresh(now()));

        assert!(first.is_ok());
        assert!(matches!(second, Err(SessionError::Busy)));
        assert_eq!(session.service.provider().calls.load(Ordering::SeqCst), 1);
        assert!(!session.is_loading());
    }

    #[tokio::test(start_paused = true)]
    async fn failure_keeps_last_response_and_keeps_polling() {
        let provider = FlakyProvider {
            inner: mock_with(response_departing_in(10)),
            fail: AtomicBool::new(false),
        };
        let session = session(provider, 60);
        let first = session.refresh(now()).await.unwrap();

        session.service.provider().fail.store(true, Ordering::SeqCst);
        assert!(matches!(
            session.refresh(now()).await,
            Err(SessionError::Gauge(GaugeError::ProviderUnavailable(_)))
        ));
        assert_eq!(session.last_response().await, Some(first));
        assert!(session.last_error().await.is_some());

        // Re-armed from the previous departure, 10 minutes out
        let started = tokio::time::Instant::now();
        session.next_tick().await.unwrap();
        assert_eq!(started.elapsed().as_secs(), 45);

        session.service.provider().fail.store(false, Ordering::SeqCst);
        session.refresh(now()).await.unwrap();
        assert!(session.last_error().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn new_routes_rearm_with_shorter_delay() {
        let session = session(mock_with(RoutesResponse::default()), 60);
        let first = session.refresh(now()).await.unwrap();
        assert!(first.routes.is_empty());

        session
            .service
            .provider()
            .insert("Home", "Work", response_departing_in(5))
            .await;
        let second = session.refresh(now()).await.unwrap();
        assert_eq!(second.routes.len(), 1);

        // Five minutes out: the 60 s timer is replaced by a 30 s one
        let started = tokio::time::Instant::now();
        session.next_tick().await.unwrap();
        assert_eq!(started.elapsed().as_secs(), 30);
    }

    #[tokio::test(start_paused = true)]
    async fn next_tick_follows_scheduler() {
        // No departures: base interval applies
        let session = session(mock_with(RoutesResponse::default()), 60);
        session.refresh(now()).await.unwrap();

        let started = tokio::time::Instant::now();
        session.next_tick().await.unwrap();
        assert_eq!(started.elapsed().as_secs(), 60);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_ends_pending_tick() {
        let session = Arc::new(session(mock_with(RoutesResponse::default()), 60));
        session.refresh(now()).await.unwrap();

        let waiter = {
            let session = Arc::clone(&session);
            tokio::spawn(async move { session.next_tick().await })
        };
        tokio::time::sleep(Duration::from_secs(10)).await;
        session.stop().await;

        assert!(matches!(waiter.await.unwrap(), Err(SessionError::Stopped)));
        assert!(!session.is_polling().await);
        assert!(matches!(
            session.refresh(now()).await,
            Err(SessionError::Stopped)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn run_polls_until_stopped() {
        let session = Arc::new(session(mock_with(RoutesResponse::default()), 60));
        let updates = Arc::new(AtomicUsize::new(0));

        let runner = {
            let session = Arc::clone(&session);
            let updates = Arc::clone(&updates);
            tokio::spawn(async move {
                session
                    .run(|result| {
                        assert!(result.is_ok());
                        updates.fetch_add(1, Ordering::SeqCst);
                    })
                    .await
            })
        };

        // Refreshes at 0 s, 60 s and 120 s
        tokio::time::sleep(Duration::from_secs(150)).await;
        session.stop().await;

        assert!(runner.await.unwrap().is_ok());
        assert_eq!(updates.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn run_ends_on_invalid_request() {
        let session = GaugeSession::new(
            Arc::new(GaugeService::new(
                MockRoutesClient::default(),
                GaugeConfig::default(),
            )),
            TransitRequest::new("", "Work", None),
            RefreshConfig::default(),
        );

        let mut seen = 0;
        let result = session.run(|_| seen += 1).await;

        assert!(matches!(
            result,
            Err(SessionError::Gauge(GaugeError::InvalidRequest(_)))
        ));
        assert_eq!(seen, 1);
        assert!(session.is_stopped());
    }
}
