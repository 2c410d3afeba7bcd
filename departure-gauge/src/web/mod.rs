//! Web layer for the departure gauge.
//!
//! Provides the HTTP endpoint that computes a readiness signal for a
//! transit search.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, FREQUENCY_HEADER, PEAK_HOURS_HEADER, create_router};
pub use state::AppState;
