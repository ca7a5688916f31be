//! Temporal relevance filter.
//!
//! Conservative "still worth a viewer's attention" predicate: today or
//! later, not finished, and not a not-started entry whose start is long past.

use chrono::Duration;
use serde::Serialize;
use std::fmt;

use super::status::{classify_status, status_key, NOT_STARTED_STATUS};
use crate::time::ViewContext;
use crate::types::{Match, StatusClass};

/// Default grace period after which a still-`NS` match is suppressed.
pub const DEFAULT_STALE_NOT_STARTED_MINS: i64 = 150;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelevanceRules {
    pub stale_not_started_after: Duration,
}

impl Default for RelevanceRules {
    fn default() -> Self {
        Self {
            stale_not_started_after: Duration::minutes(DEFAULT_STALE_NOT_STARTED_MINS),
        }
    }
}

/// Why a match was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Exclusion {
    /// Neither timestamp nor date could be interpreted.
    Undated,
    BeforeToday,
    Finished,
    StaleNotStarted,
}

impl fmt::Display for Exclusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Exclusion::Undated => write!(f, "undated"),
            Exclusion::BeforeToday => write!(f, "before today"),
            Exclusion::Finished => write!(f, "finished"),
            Exclusion::StaleNotStarted => write!(f, "stale not-started"),
        }
    }
}

/// First rule that drops the match, or `None` if it is relevant.
pub fn exclusion(m: &Match, ctx: &ViewContext, rules: &RelevanceRules) -> Option<Exclusion> {
    let Some(start) = m.effective_start() else {
        return Some(Exclusion::Undated);
    };

    if start < ctx.day_start {
        return Some(Exclusion::BeforeToday);
    }

    if classify_status(&m.status) == StatusClass::Finished {
        return Some(Exclusion::Finished);
    }

    if status_key(&m.status) == NOT_STARTED_STATUS && ctx.now - start > rules.stale_not_started_after {
        return Some(Exclusion::StaleNotStarted);
    }

    None
}

pub fn is_relevant(m: &Match, ctx: &ViewContext, rules: &RelevanceRules) -> bool {
    exclusion(m, ctx, rules).is_none()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
