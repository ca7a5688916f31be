//! Match classification pipeline.
//!
//! Normalizer → Sport Inferencer → Relevance Filter → Live Classifier →
//! Grouping. Everything below `normalize` is a pure function of the
//! snapshot, the rules and an explicit `ViewContext`; no clock is read here.

pub mod countdown;
pub mod grouping;
pub mod normalize;
pub mod relevance;
pub mod sport;
pub mod status;

use std::collections::HashSet;

use crate::time::ViewContext;
use crate::types::{Board, Match};
use grouping::{
    group_upcoming, rank_live, PopularityTable, DEFAULT_FALLBACK_SPORT, DEFAULT_SPORT_PRIORITY,
};
use relevance::{exclusion, Exclusion, RelevanceRules};
use status::is_live;

/// Tunables for one classification pass.
#[derive(Debug, Clone, PartialEq)]
pub struct BoardRules {
    pub relevance: RelevanceRules,
    pub sport_priority: Vec<String>,
    pub fallback_sport: String,
    pub popularity: PopularityTable,
}

impl Default for BoardRules {
    fn default() -> Self {
        Self {
            relevance: RelevanceRules::default(),
            sport_priority: DEFAULT_SPORT_PRIORITY.iter().map(|s| s.to_string()).collect(),
            fallback_sport: DEFAULT_FALLBACK_SPORT.to_string(),
            popularity: PopularityTable::default(),
        }
    }
}

/// Every input match lands in exactly one of the three lists.
#[derive(Debug, Clone, Default)]
pub struct Partition {
    pub live: Vec<Match>,
    pub upcoming: Vec<Match>,
    pub excluded: Vec<(String, Exclusion)>,
}

/// Split a snapshot into live, upcoming and excluded, preserving input order.
pub fn partition(matches: &[Match], ctx: &ViewContext, rules: &BoardRules) -> Partition {
    let mut out = Partition::default();

    for m in matches {
        match exclusion(m, ctx, &rules.relevance) {
            Some(reason) => out.excluded.push((m.match_id.clone(), reason)),
            None if is_live(m) => out.live.push(m.clone()),
            None => out.upcoming.push(m.clone()),
        }
    }

    // A match id seen live never shows as upcoming, even if the feed repeated it.
    let live_ids: HashSet<&str> = out.live.iter().map(|m| m.match_id.as_str()).collect();
    out.upcoming.retain(|m| !live_ids.contains(m.match_id.as_str()));

    out
}

/// Order a partition for display. Excluded entries are dropped.
pub fn assemble(partition: Partition, ctx: &ViewContext, rules: &BoardRules) -> Board {
    let Partition { live, upcoming, .. } = partition;
    Board {
        generated_at: ctx.now,
        live_matches: rank_live(live, &rules.popularity),
        matches_by_sport: group_upcoming(upcoming, &rules.sport_priority, &rules.fallback_sport),
    }
}

/// Classify a snapshot into the board the rendering layer consumes.
pub fn build_board(matches: &[Match], ctx: &ViewContext, rules: &BoardRules) -> Board {
    assemble(partition(matches, ctx, rules), ctx, rules)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
