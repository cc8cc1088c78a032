//! # Party Tracker
//!
//! Party and match statistics for a player, built from a public, rate-limited
//! statistics API.
//!
//! ## Architecture
//!
//! - **gateway**: Serialized, throttle-aware access to the upstream API
//! - **heroes**: Hero id lookups, loaded once per directory
//! - **analysis**: Match aggregation engine (team context, party cohorts)
//! - **dashboard**: Fetch-then-aggregate flows for the views
//! - **models**: Upstream data shapes and derived records
//! - **config**: Configuration loading and validation

pub mod analysis;
pub mod config;
pub mod dashboard;
pub mod gateway;
pub mod heroes;
pub mod models;

pub use models::*;

use std::time::Duration;

/// Parse a human-friendly duration string (e.g., "250ms", "5s", "1m", "1h").
pub fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Some(n) = s.strip_suffix("ms") {
        return n.trim().parse().ok().map(Duration::from_millis);
    }

    let (num_str, multiplier) = if let Some(n) = s.strip_suffix('h') {
        (n, 3600)
    } else if let Some(n) = s.strip_suffix('m') {
        (n, 60)
    } else if let Some(n) = s.strip_suffix('s') {
        (n, 1)
    } else {
        // Default to seconds
        (s, 1)
    };

    let num: u64 = num_str.trim().parse().ok()?;
    Some(Duration::from_secs(num * multiplier))
}
