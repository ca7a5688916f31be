//! Status taxonomy and live detection.
//!
//! Feeds have no authoritative live flag, so liveness is inferred from
//! free-text conventions. All status vocabulary lives in this file.

use regex::Regex;
use std::sync::LazyLock;

use crate::types::{Match, StatusClass};

/// Statuses meaning the match will not be played (further) today.
pub const FINISHED_STATUSES: &[&str] = &[
    "ft",
    "aet",
    "pen",
    "post",
    "finished",
    "cancelled",
    "postponed",
    "abandoned",
];

/// Exact statuses that mean the match is in play.
pub const LIVE_STATUSES: &[&str] = &["live", "in", "ht"];

pub const NOT_STARTED_STATUS: &str = "ns";

/// Digits followed by a straight or typographic prime: `45'`, `90+2′`.
static MINUTE_MARKER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+['′]").unwrap());

/// Canonical comparison form of a status code.
pub fn status_key(status: &str) -> String {
    status.trim().to_lowercase()
}

pub fn has_minute_marker(text: &str) -> bool {
    MINUTE_MARKER.is_match(text)
}

/// Classify a free-text status code.
pub fn classify_status(status: &str) -> StatusClass {
    let key = status_key(status);

    if FINISHED_STATUSES.contains(&key.as_str()) {
        return StatusClass::Finished;
    }
    if LIVE_STATUSES.contains(&key.as_str()) || key.contains('+') || has_minute_marker(&key) {
        return StatusClass::Live;
    }
    if key == NOT_STARTED_STATUS {
        return StatusClass::NotStarted;
    }
    StatusClass::Unknown
}

/// Whether a (relevant) match is in play: its status says so, or its
/// in-play clock carries a minute marker.
pub fn is_live(m: &Match) -> bool {
    classify_status(&m.status) == StatusClass::Live
        || m.current_minute.as_deref().is_some_and(has_minute_marker)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
