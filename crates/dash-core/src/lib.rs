//! Core domain layer for Channel Dash.
//!
//! Holds the error type, video/metric models, percentile math, time helpers,
//! display formatting and CLI settings shared by every other crate.

pub mod error;
pub mod formatting;
pub mod metrics;
pub mod models;
pub mod percentile;
pub mod settings;
pub mod time_utils;

pub use error::{DashError, Result};
