//! Data layer for Channel Dash.
//!
//! Reads the three YouTube Studio CSV exports, compares every video against
//! the trailing-12-month baseline, models first-month view trajectories and
//! shapes the results into view models for the UI and JSON output.

pub mod analysis;
pub mod baseline;
pub mod presentation;
pub mod reader;
pub mod trajectory;

#[cfg(test)]
mod test_support;

pub use dash_core as core;
