//! Adaptive polling.
//!
//! [`RefreshScheduler`] decides when to fetch again; [`GaugeSession`] ties it
//! to a [`GaugeService`](crate::gauge::GaugeService) for one search.

mod scheduler;
mod session;

pub use scheduler::{RefreshConfig, RefreshError, RefreshScheduler, refresh_delay};
pub use session::{GaugeSession, SessionError};
