//! Clear-sky energy loss of a fixed solar panel against a reference plane.
//!
//! The [`sim::pipeline::run`] entry point takes a site, a time series and a
//! candidate orientation, and returns the relative plane-of-array loss
//! together with every intermediate series.

/// REST API (feature `api`).
#[cfg(feature = "api")]
pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod io;
/// Timestamps, domain values, loss aggregation and the pipeline.
pub mod sim;
/// Sun position, clear-sky and transposition models.
pub mod solar;
