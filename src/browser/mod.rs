//! High-level browser API.
//!
//! This module ties configuration, the git-backed store and the browsing
//! core together for a presentation layer or the command line.

mod api;

pub use api::{BrowserConfig, BrowserError, BrowserResult, RepoBrowser};
