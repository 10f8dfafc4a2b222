//! F1Insight TUI library: API client, session/auth, chart adapters, models
//! and the terminal UI. The binary in `main.rs` is a thin shell around this.

pub mod api;
pub mod app;
pub mod auth;
pub mod charts;
pub mod config;
pub mod models;
pub mod ui;
pub mod utils;
