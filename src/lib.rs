//! GitHub repository health dashboard.
//!
//! A small proxy in front of the GitHub REST API, a heuristic health score,
//! chart series, and a generated summary that falls back to a template when
//! the text-generation service is slow or unavailable.

pub mod charts;
pub mod commands;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod github;
pub mod health;
pub mod server;
pub mod summary;
pub mod types;
