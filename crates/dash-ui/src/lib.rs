//! Terminal dashboard for channel analytics.
//!
//! Two modes share one header: the aggregate view of baseline deviations
//! and the per-video view of audience and view trajectory.

pub mod aggregate_view;
pub mod app;
pub mod components;
pub mod themes;
pub mod video_view;

pub use dash_core as core;
