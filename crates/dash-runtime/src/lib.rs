//! Runtime layer for Channel Dash.
//!
//! Owns the analysed dataset for the lifetime of the process and hands it to
//! the UI and JSON output.

pub mod data_manager;

pub use dash_core as core;
pub use dash_data as data;
