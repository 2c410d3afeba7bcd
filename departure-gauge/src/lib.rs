//! Transit departure readiness gauge.
//!
//! Answers "is now a good time to leave for the stop?" by fetching transit
//! routes, scoring the next departure against a wait budget, and polling
//! again sooner as that departure approaches.

pub mod domain;
pub mod gauge;
pub mod refresh;
pub mod routes;
pub mod web;
