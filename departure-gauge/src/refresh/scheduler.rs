//! Adaptive refresh scheduler.
//!
//! Owns at most one one-shot timer. The delay before the next refresh
//! shortens as the next departure approaches.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::FutureExt;
use futures::future::BoxFuture;
use tokio::task::JoinHandle;

use crate::domain::whole_minutes_between;

/// Error raised by a refresh callback.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RefreshError {
    /// The refresh itself failed
    #[error("refresh failed: {0}")]
    Callback(String),

    /// Nobody is listening for refresh ticks any more
    #[error("refresh channel closed")]
    ChannelClosed,
}

/// Configuration for the refresh scheduler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshConfig {
    /// Delay used when no departure is known (seconds).
    pub base_interval_secs: u64,
}

impl RefreshConfig {
    pub fn new(base_interval_secs: u64) -> Self {
        Self { base_interval_secs }
    }

    /// Returns the base interval as a Duration.
    pub fn base_interval(&self) -> Duration {
        Duration::from_secs(self.base_interval_secs)
    }
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            base_interval_secs: 60,
        }
    }
}

/// Delay before the next refresh.
///
/// Without a known departure the base interval applies. Otherwise the delay
/// depends on the whole minutes left until `next` (negative when it has
/// already left):
///
/// | minutes left | delay |
/// |--------------|-------|
/// | ≤ 5          | 30 s  |
/// | ≤ 15         | 45 s  |
/// | ≤ 30         | 60 s  |
/// | otherwise    | 120 s |
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use chrono::{TimeZone, Utc};
/// use departure_gauge::refresh::refresh_delay;
///
/// let now = Utc.with_ymd_and_hms(2024, 3, 15, 10, 0, 0).unwrap();
/// let next = Utc.with_ymd_and_hms(2024, 3, 15, 10, 10, 0).unwrap();
///
/// assert_eq!(refresh_delay(Some(next), 60, now), Duration::from_secs(45));
/// assert_eq!(refresh_delay(None, 90, now), Duration::from_secs(90));
/// ```
pub fn refresh_delay(
    next: Option<DateTime<Utc>>,
    base_interval_secs: u64,
    now: DateTime<Utc>,
) -> Duration {
    let Some(next) = next else {
        return Duration::from_millis(base_interval_secs.saturating_mul(1000));
    };

    let secs = match whole_minutes_between(next, now) {
        ..=5 => 30,
        6..=15 => 45,
        16..=30 => 60,
        _ => 120,
    };
    Duration::from_secs(secs)
}

type Callback = Arc<dyn Fn() -> BoxFuture<'static, Result<(), RefreshError>> + Send + Sync>;

/// A spawned timer task, aborted when dropped.
#[derive(Debug)]
struct TimerHandle(JoinHandle<()>);

impl TimerHandle {
    fn is_pending(&self) -> bool {
        !self.0.is_finished()
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.0.abort();
    }
}

#[derive(Debug)]
enum State {
    Stopped,
    Running(TimerHandle),
}

/// One-shot refresh timer with an adaptive delay.
///
/// Each firing invokes the callback once and does not re-arm; callers react
/// to new data by calling [`start`](Self::start) or
/// [`set_next_departure`](Self::set_next_departure) again. Arming must happen
/// inside a Tokio runtime.
pub struct RefreshScheduler {
    config: RefreshConfig,
    enabled: bool,
    next_departure: Option<DateTime<Utc>>,
    state: State,
    callback: Callback,
}

impl std::fmt::Debug for RefreshScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshScheduler")
            .field("config", &self.config)
            .field("enabled", &self.enabled)
            .field("next_departure", &self.next_departure)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl RefreshScheduler {
    /// Create a stopped, enabled scheduler that runs `callback` when it fires.
    pub fn new<F, Fut>(config: RefreshConfig, callback: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), RefreshError>> + Send + 'static,
    {
        Self {
            config,
            enabled: true,
            next_departure: None,
            state: State::Stopped,
            callback: Arc::new(move || callback().boxed()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn next_departure(&self) -> Option<DateTime<Utc>> {
        self.next_departure
    }

    /// Whether a timer is armed and has not fired yet.
    pub fn is_running(&self) -> bool {
        matches!(&self.state, State::Running(handle) if handle.is_pending())
    }

    /// Delay the next arming would use.
    pub fn current_delay(&self, now: DateTime<Utc>) -> Duration {
        refresh_delay(self.next_departure, self.config.base_interval_secs, now)
    }

    /// Arm the timer, replacing any pending one. No-op while disabled.
    pub fn start(&mut self, now: DateTime<Utc>) {
        if !self.enabled {
            return;
        }

        let delay = self.current_delay(now);
        // Cancel before arming so two timers are never alive
        self.state = State::Stopped;

        let callback = Arc::clone(&self.callback);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Err(e) = callback().await {
                tracing::error!(error = %e, "scheduled refresh failed");
            }
        });

        tracing::debug!(delay_ms = delay.as_millis() as u64, "refresh armed");
        self.state = State::Running(TimerHandle(handle));
    }

    /// Cancel any pending timer. Idempotent.
    pub fn stop(&mut self) {
        if let State::Running(_) = std::mem::replace(&mut self.state, State::Stopped) {
            tracing::debug!("refresh cancelled");
        }
    }

    /// Enable or disable polling.
    ///
    /// Enabling arms a timer unless one is already pending; disabling cancels
    /// it.
    pub fn set_enabled(&mut self, enabled: bool, now: DateTime<Utc>) {
        let was_enabled = std::mem::replace(&mut self.enabled, enabled);

        if !enabled {
            self.stop();
        } else if !was_enabled || !self.is_running() {
            self.start(now);
        }
    }

    /// Record the next departure, re-arming with a fresh delay if it changed.
    ///
    /// Returns whether the timer was re-armed.
    pub fn set_next_departure(&mut self, next: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
        if next == self.next_departure {
            return false;
        }

        self.next_departure = next;
        if self.enabled {
            self.start(now);
        }
        self.enabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 10, 0, 0).unwrap()
    }

    fn in_minutes(mins: i64) -> Option<DateTime<Utc>> {
        Some(now() + chrono::Duration::minutes(mins))
    }

    fn counting_scheduler(base_secs: u64) -> (RefreshScheduler, Arc<AtomicUsize>) {
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fired);
        let scheduler = RefreshScheduler::new(RefreshConfig::new(base_secs), move || {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Ok(()) }
        });
        (scheduler, fired)
    }

    async fn wait_secs(secs: u64) {
        tokio::time::sleep(Duration::from_secs(secs)).await;
    }

    #[test]
    fn delay_without_departure_uses_base_interval() {
        assert_eq!(refresh_delay(None, 60, now()), Duration::from_millis(60_000));
        assert_eq!(refresh_delay(None, 5, now()), Duration::from_millis(5_000));
    }

    #[test]
    fn delay_shortens_as_departure_approaches() {
        assert_eq!(refresh_delay(in_minutes(4), 60, now()), Duration::from_millis(30_000));
        assert_eq!(refresh_delay(in_minutes(10), 60, now()), Duration::from_millis(45_000));
        assert_eq!(refresh_delay(in_minutes(25), 60, now()), Duration::from_millis(60_000));
        assert_eq!(refresh_delay(in_minutes(40), 60, now()), Duration::from_millis(120_000));
    }

    #[test]
    fn delay_band_edges() {
        assert_eq!(refresh_delay(in_minutes(5), 60, now()), Duration::from_secs(30));
        assert_eq!(refresh_delay(in_minutes(6), 60, now()), Duration::from_secs(45));
        assert_eq!(refresh_delay(in_minutes(15), 60, now()), Duration::from_secs(45));
        assert_eq!(refresh_delay(in_minutes(30), 60, now()), Duration::from_secs(60));
        assert_eq!(refresh_delay(in_minutes(31), 60, now()), Duration::from_secs(120));
    }

    #[test]
    fn past_departure_polls_fastest() {
        assert_eq!(refresh_delay(in_minutes(-20), 60, now()), Duration::from_secs(30));
    }

    #[test]
    fn minutes_left_are_truncated() {
        // 5 min 59 s counts as 5 minutes
        let next = now() + chrono::Duration::seconds(5 * 60 + 59);
        assert_eq!(refresh_delay(Some(next), 60, now()), Duration::from_secs(30));
    }

    #[test]
    fn config_defaults() {
        let config = RefreshConfig::default();
        assert_eq!(config.base_interval_secs, 60);
        assert_eq!(config.base_interval(), Duration::from_secs(60));
    }

    #[tokio::test(start_paused = true)]
    async fn fires_once_after_delay() {
        let (mut scheduler, fired) = counting_scheduler(60);
        scheduler.start(now());
        assert!(scheduler.is_running());

        wait_secs(59).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        wait_secs(2).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert!(!scheduler.is_running());

        // One-shot: nothing more without re-arming
        wait_secs(600).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn double_start_keeps_one_timer() {
        let (mut scheduler, fired) = counting_scheduler(60);
        scheduler.start(now());
        scheduler.start(now());

        wait_secs(300).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_cancels_and_is_idempotent() {
        let (mut scheduler, fired) = counting_scheduler(60);
        scheduler.stop();
        scheduler.start(now());
        scheduler.stop();
        scheduler.stop();
        assert!(!scheduler.is_running());

        wait_secs(300).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn disabled_scheduler_does_not_arm() {
        let (mut scheduler, fired) = counting_scheduler(60);
        scheduler.set_enabled(false, now());
        scheduler.start(now());
        assert!(!scheduler.is_enabled());
        assert!(!scheduler.is_running());

        // Departures are still recorded while disabled
        assert!(!scheduler.set_next_departure(in_minutes(10), now()));
        assert_eq!(scheduler.next_departure(), in_minutes(10));
        assert!(!scheduler.is_running());

        scheduler.set_enabled(true, now());
        assert!(scheduler.is_enabled());
        assert!(scheduler.is_running());
        // Already running: enabling again must not add a timer
        scheduler.set_enabled(true, now());

        wait_secs(300).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn disabling_cancels_pending_timer() {
        let (mut scheduler, fired) = counting_scheduler(60);
        scheduler.start(now());
        scheduler.set_enabled(false, now());

        wait_secs(300).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn new_departure_rearms_with_fresh_delay() {
        let (mut scheduler, fired) = counting_scheduler(60);
        assert!(scheduler.set_next_departure(in_minutes(40), now()));
        assert_eq!(scheduler.next_departure(), in_minutes(40));
        assert_eq!(scheduler.current_delay(now()), Duration::from_secs(120));

        wait_secs(50).await;
        assert!(scheduler.set_next_departure(in_minutes(4), now()));

        // Fires 30 s after re-arming, not at the first 120 s mark
        wait_secs(31).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);

        wait_secs(300).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn unchanged_departure_does_not_rearm() {
        let (mut scheduler, fired) = counting_scheduler(60);
        scheduler.set_next_departure(in_minutes(10), now());

        wait_secs(30).await;
        assert!(!scheduler.set_next_departure(in_minutes(10), now()));

        // The first 45 s timer still fires on time
        wait_secs(16).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn callback_error_is_contained() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&attempts);
        let mut scheduler = RefreshScheduler::new(RefreshConfig::new(10), move || {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Err(RefreshError::Callback("provider down".to_string())) }
        });

        scheduler.start(now());
        wait_secs(11).await;
        assert_eq!(attempts.load(Ordering::SeqCst), 1);

        // The scheduler is still usable after a failed refresh
        scheduler.start(now());
        wait_secs(11).await;
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_scheduler_cancels_timer() {
        let (mut scheduler, fired) = counting_scheduler(60);
        scheduler.start(now());
        drop(scheduler);

        wait_secs(300).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }
}
